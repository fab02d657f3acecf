//! Packaging one face's measurements into a serializable result.

use serde::{Deserialize, Serialize};

use crate::error::ScoringError;
use crate::expression::ExpressionVector;
use crate::landmarks::LandmarkSet;
use crate::metrics::{FormulaSet, MetricSet};
use crate::policy::WeightPolicy;

/// Face box in source image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Express the box as fractions of the image size.
    pub fn normalize(&self, image: ImageDimensions) -> Result<NormalizedBox, ScoringError> {
        let (w, h) = (image.width, image.height);
        if !(w.is_finite() && w > 0.0 && h.is_finite() && h > 0.0) {
            return Err(ScoringError::InvalidDimensions {
                width: w,
                height: h,
            });
        }
        Ok(NormalizedBox {
            x: self.x / w,
            y: self.y / h,
            width: self.width / w,
            height: self.height / h,
        })
    }
}

/// Source image size in pixels.
///
/// Kept as floats so a detector reporting a negative or fractional size
/// reaches [`BoundingBox::normalize`] and is rejected per face.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub width: f64,
    pub height: f64,
}

impl ImageDimensions {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Face box as fractions of the image size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Scored face, ready for the response serializer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceResult {
    pub score: u8,
    pub is_genuine: bool,
    pub verdict: String,
    pub metrics: MetricSet,
    pub bounding_box: NormalizedBox,
}

/// Score one face.
///
/// Dimensions are checked first so a bad image rejects the face before any
/// geometry is measured.
pub fn assemble_face(
    landmarks: &LandmarkSet,
    bounding_box: &BoundingBox,
    image: ImageDimensions,
    expression: Option<&ExpressionVector>,
    policy: &WeightPolicy,
    formulas: &FormulaSet,
) -> Result<FaceResult, ScoringError> {
    let bounding_box = bounding_box.normalize(image)?;
    let metrics = formulas.measure_all(policy.metrics_in_use(), landmarks)?;
    let scored = policy.score(&metrics, expression)?;

    Ok(FaceResult {
        score: scored.score,
        is_genuine: scored.is_genuine,
        verdict: scored.verdict,
        metrics,
        bounding_box,
    })
}
