//! Weighting, genuineness and verdict policy.
//!
//! Everything that changed between tuning iterations (weights, blend ratio,
//! predicate, verdict table) is data in [`WeightPolicy`]. The arithmetic that
//! consumes it is fixed.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{PolicyError, ScoringError};
use crate::expression::ExpressionVector;
use crate::metrics::{Metric, MetricSet};

/// Allowed drift of a weight sum from 1.0.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositionMode {
    /// Weighted sum of metric scores.
    #[default]
    Geometry,
    /// Geometric sub-score blended with the expression classifier's "happy".
    Blend,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlendWeights {
    pub geometric: f64,
    pub expression: f64,
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            geometric: 0.4,
            expression: 0.6,
        }
    }
}

/// One row of the verdict table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictTier {
    pub min_score: u8,
    pub label: String,
}

impl VerdictTier {
    pub fn new(min_score: u8, label: impl Into<String>) -> Self {
        Self {
            min_score,
            label: label.into(),
        }
    }
}

/// `metric > above`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricThreshold {
    pub metric: Metric,
    pub above: u8,
}

/// Predicate deciding whether a smile counts as genuine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenuinenessRule {
    /// `score >= min_score OR happy > min_happy`.
    ScoreOrHappy { min_score: u8, min_happy: f64 },
    /// Every listed metric strictly above its threshold.
    AllAbove { thresholds: Vec<MetricThreshold> },
    ScoreAtLeast { min_score: u8 },
}

impl GenuinenessRule {
    pub fn is_genuine(
        &self,
        score: u8,
        metrics: &MetricSet,
        happy: Option<f64>,
    ) -> Result<bool, ScoringError> {
        match self {
            Self::ScoreOrHappy {
                min_score,
                min_happy,
            } => Ok(score >= *min_score || happy.is_some_and(|h| h > *min_happy)),
            Self::AllAbove { thresholds } => {
                for t in thresholds {
                    let value = metrics
                        .get(t.metric)
                        .ok_or(ScoringError::MissingMetric(t.metric))?;
                    if value <= t.above {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Self::ScoreAtLeast { min_score } => Ok(score >= *min_score),
        }
    }

    fn metrics(&self) -> impl Iterator<Item = Metric> + '_ {
        let thresholds: &[MetricThreshold] = match self {
            Self::AllAbove { thresholds } => thresholds,
            _ => &[],
        };
        thresholds.iter().map(|t| t.metric)
    }

    fn validate(&self) -> Result<(), PolicyError> {
        match self {
            Self::ScoreOrHappy {
                min_score,
                min_happy,
            } => {
                check_threshold(*min_score)?;
                if !(0.0..=1.0).contains(min_happy) {
                    return Err(PolicyError::HappyThreshold(*min_happy));
                }
            }
            Self::AllAbove { thresholds } => {
                if thresholds.is_empty() {
                    return Err(PolicyError::EmptyPredicate);
                }
                for t in thresholds {
                    check_threshold(t.above)?;
                }
            }
            Self::ScoreAtLeast { min_score } => check_threshold(*min_score)?,
        }
        Ok(())
    }
}

/// Immutable scoring configuration.
///
/// The metrics in use are the keys of `weights` plus any metric the
/// genuineness predicate reads. Call [`WeightPolicy::validate`] once at load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightPolicy {
    #[serde(default)]
    pub mode: CompositionMode,
    pub weights: BTreeMap<Metric, f64>,
    #[serde(default)]
    pub blend: BlendWeights,
    /// Strictly descending by `min_score`, last tier at 0.
    pub verdicts: Vec<VerdictTier>,
    pub genuine: GenuinenessRule,
}

impl Default for WeightPolicy {
    fn default() -> Self {
        Self::geometry_only()
    }
}

/// Final output of the scoring policy for one face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalScore {
    pub score: u8,
    pub is_genuine: bool,
    pub verdict: String,
    /// Weighted metric sub-score before any expression blend.
    pub geometric: u8,
    /// `happy × 100`, when an expression vector was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<u8>,
}

impl WeightPolicy {
    /// All six metrics weighted; genuine when both Duchenne markers fire.
    pub fn geometry_only() -> Self {
        Self {
            mode: CompositionMode::Geometry,
            weights: BTreeMap::from([
                (Metric::EyeConstriction, 0.25),
                (Metric::CheekRaise, 0.20),
                (Metric::MouthCurve, 0.20),
                (Metric::Symmetry, 0.10),
                (Metric::LipCornerElevation, 0.15),
                (Metric::NoseLipCompression, 0.10),
            ]),
            blend: BlendWeights::default(),
            verdicts: default_verdicts(),
            genuine: GenuinenessRule::AllAbove {
                thresholds: vec![
                    MetricThreshold {
                        metric: Metric::EyeConstriction,
                        above: 60,
                    },
                    MetricThreshold {
                        metric: Metric::CheekRaise,
                        above: 50,
                    },
                ],
            },
        }
    }

    /// Four-metric geometric sub-score blended 40/60 with "happy".
    pub fn expression_blend() -> Self {
        Self {
            mode: CompositionMode::Blend,
            weights: BTreeMap::from([
                (Metric::EyeConstriction, 0.25),
                (Metric::CheekRaise, 0.25),
                (Metric::MouthCurve, 0.35),
                (Metric::Symmetry, 0.15),
            ]),
            blend: BlendWeights::default(),
            verdicts: default_verdicts(),
            genuine: GenuinenessRule::ScoreOrHappy {
                min_score: 60,
                min_happy: 0.5,
            },
        }
    }

    pub fn preset(mode: CompositionMode) -> Self {
        match mode {
            CompositionMode::Geometry => Self::geometry_only(),
            CompositionMode::Blend => Self::expression_blend(),
        }
    }

    /// Metrics that must be measured for every face.
    pub fn metrics_in_use(&self) -> BTreeSet<Metric> {
        self.weights
            .keys()
            .copied()
            .chain(self.genuine.metrics())
            .collect()
    }

    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.weights.is_empty() {
            return Err(PolicyError::NoActiveMetrics);
        }
        for (metric, weight) in &self.weights {
            if !(0.0..=1.0).contains(weight) {
                return Err(PolicyError::InvalidWeight {
                    metric: *metric,
                    weight: *weight,
                });
            }
        }
        let sum: f64 = self.weights.values().sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(PolicyError::WeightSum { sum });
        }

        let BlendWeights {
            geometric,
            expression,
        } = self.blend;
        if !(0.0..=1.0).contains(&geometric)
            || !(0.0..=1.0).contains(&expression)
            || (geometric + expression - 1.0).abs() > WEIGHT_TOLERANCE
        {
            return Err(PolicyError::BlendWeights {
                geometric,
                expression,
            });
        }

        let lowest = self.verdicts.last().ok_or(PolicyError::NoVerdicts)?;
        for tier in &self.verdicts {
            check_threshold(tier.min_score)?;
        }
        for pair in self.verdicts.windows(2) {
            if pair[1].min_score >= pair[0].min_score {
                return Err(PolicyError::UnorderedVerdicts {
                    previous: pair[0].min_score,
                    next: pair[1].min_score,
                });
            }
        }
        if lowest.min_score != 0 {
            return Err(PolicyError::LowestVerdictNotZero(lowest.min_score));
        }

        self.genuine.validate()
    }

    /// Weighted sum of the active metrics, unrounded.
    pub fn weighted_sum(&self, metrics: &MetricSet) -> Result<f64, ScoringError> {
        self.weights.iter().try_fold(0.0, |acc, (metric, weight)| {
            let value = metrics
                .get(*metric)
                .ok_or(ScoringError::MissingMetric(*metric))?;
            Ok(acc + weight * f64::from(value))
        })
    }

    /// Label of the highest tier whose threshold is at or below `score`.
    pub fn verdict(&self, score: u8) -> &str {
        self.verdicts
            .iter()
            .find(|tier| score >= tier.min_score)
            .or(self.verdicts.last())
            .map_or("", |tier| tier.label.as_str())
    }

    /// Combine measured metrics (and the optional expression vector) into a
    /// final score, genuineness flag and verdict.
    ///
    /// In blend mode without an expression vector the geometric sub-score
    /// stands alone.
    pub fn score(
        &self,
        metrics: &MetricSet,
        expression: Option<&ExpressionVector>,
    ) -> Result<FinalScore, ScoringError> {
        let geometric = self.weighted_sum(metrics)?;

        let happy = match expression {
            Some(vector) => {
                vector.validate()?;
                Some(vector.happy())
            }
            None => None,
        };

        let combined = match (self.mode, happy) {
            (CompositionMode::Blend, Some(h)) => {
                geometric * self.blend.geometric + h * 100.0 * self.blend.expression
            }
            _ => geometric,
        };

        let score = to_score(combined);
        let is_genuine = self.genuine.is_genuine(score, metrics, happy)?;

        Ok(FinalScore {
            score,
            is_genuine,
            verdict: self.verdict(score).to_string(),
            geometric: to_score(geometric),
            expression: happy.map(|h| to_score(h * 100.0)),
        })
    }
}

/// Free-function form of [`WeightPolicy::score`].
pub fn score(
    metrics: &MetricSet,
    expression: Option<&ExpressionVector>,
    policy: &WeightPolicy,
) -> Result<FinalScore, ScoringError> {
    policy.score(metrics, expression)
}

fn default_verdicts() -> Vec<VerdictTier> {
    vec![
        VerdictTier::new(80, "Genuine Duchenne smile"),
        VerdictTier::new(60, "Likely genuine smile"),
        VerdictTier::new(40, "Social smile"),
        VerdictTier::new(20, "Forced smile"),
        VerdictTier::new(0, "No smile detected"),
    ]
}

fn check_threshold(value: u8) -> Result<(), PolicyError> {
    if value > 100 {
        return Err(PolicyError::ThresholdOutOfRange(value));
    }
    Ok(())
}

fn to_score(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}
