//! Per-face scoring over one detector batch.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::assemble::{assemble_face, BoundingBox, FaceResult, ImageDimensions};
use crate::error::{PolicyError, ScoringError};
use crate::expression::ExpressionVector;
use crate::landmarks::{LandmarkSet, RawLandmarks};
use crate::metrics::FormulaSet;
use crate::policy::WeightPolicy;

/// One face as reported by the external detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedFace {
    /// Validated per face in [`Engine::assess`].
    pub landmarks: RawLandmarks,
    pub bounding_box: BoundingBox,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expressions: Option<ExpressionVector>,
}

/// Everything the detector found in one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionBatch {
    pub image: ImageDimensions,
    #[serde(default)]
    pub faces: Vec<DetectedFace>,
}

/// A face that could not be scored, by detector order.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedFace {
    pub index: usize,
    pub error: ScoringError,
}

impl Serialize for RejectedFace {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("RejectedFace", 3)?;
        s.serialize_field("index", &self.index)?;
        s.serialize_field("kind", self.error.kind())?;
        s.serialize_field("reason", &self.error.to_string())?;
        s.end()
    }
}

/// Scored faces plus per-face rejections for one image.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchOutcome {
    pub faces: Vec<FaceResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<RejectedFace>,
}

/// Stateless scoring engine: a validated policy and formula set.
///
/// Cheap to clone and safe to share across threads; every call is a pure
/// function of its inputs.
#[derive(Debug, Clone)]
pub struct Engine {
    policy: WeightPolicy,
    formulas: FormulaSet,
}

impl Engine {
    /// Validate the configuration once. Fails fast on a bad policy.
    pub fn new(policy: WeightPolicy, formulas: FormulaSet) -> Result<Self, PolicyError> {
        policy.validate()?;
        formulas.validate()?;
        tracing::debug!(
            mode = ?policy.mode,
            metrics = policy.metrics_in_use().len(),
            mouth_curve = ?formulas.mouth_curve,
            symmetry = ?formulas.symmetry,
            "scoring engine configured"
        );
        Ok(Self { policy, formulas })
    }

    pub fn policy(&self) -> &WeightPolicy {
        &self.policy
    }

    pub fn formulas(&self) -> &FormulaSet {
        &self.formulas
    }

    pub fn assess(
        &self,
        face: &DetectedFace,
        image: ImageDimensions,
    ) -> Result<FaceResult, ScoringError> {
        let landmarks = LandmarkSet::try_from(face.landmarks.clone())?;
        assemble_face(
            &landmarks,
            &face.bounding_box,
            image,
            face.expressions.as_ref(),
            &self.policy,
            &self.formulas,
        )
    }

    /// One result per detected face, in detector order. Zero faces yields an
    /// empty list.
    pub fn assess_all(&self, batch: &DetectionBatch) -> Vec<Result<FaceResult, ScoringError>> {
        batch
            .faces
            .iter()
            .map(|face| self.assess(face, batch.image))
            .collect()
    }

    /// Like [`Engine::assess_all`], split into scored and rejected faces.
    pub fn assess_batch(&self, batch: &DetectionBatch) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for (index, result) in self.assess_all(batch).into_iter().enumerate() {
            match result {
                Ok(face) => {
                    tracing::debug!(
                        index,
                        score = face.score,
                        genuine = face.is_genuine,
                        "face scored"
                    );
                    outcome.faces.push(face);
                }
                Err(error) => {
                    tracing::warn!(index, error = %error, "face rejected");
                    outcome.rejected.push(RejectedFace { index, error });
                }
            }
        }
        outcome
    }
}
