use thiserror::Error;

use crate::landmarks::Region;
use crate::metrics::Metric;

/// Per-face failures. One face failing never aborts the rest of a batch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoringError {
    #[error("degenerate geometry: {metric} denominator stabilized to zero")]
    DegenerateGeometry { metric: Metric },
    #[error("non-finite geometry while measuring {metric}")]
    NonFiniteGeometry { metric: Metric },
    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: f64, height: f64 },
    #[error("invalid landmarks: {0}")]
    InvalidLandmarks(#[from] LandmarkError),
    #[error("metric {0} is required by the policy but was not measured")]
    MissingMetric(Metric),
    #[error("expression probability for '{label}' out of range: {value}")]
    InvalidExpression { label: String, value: f64 },
}

impl ScoringError {
    /// Stable machine-readable tag, used in serialized rejections.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DegenerateGeometry { .. } => "degenerate_geometry",
            Self::NonFiniteGeometry { .. } => "non_finite_geometry",
            Self::InvalidDimensions { .. } => "invalid_dimensions",
            Self::InvalidLandmarks(_) => "invalid_landmarks",
            Self::MissingMetric(_) => "missing_metric",
            Self::InvalidExpression { .. } => "invalid_expression",
        }
    }
}

/// Configuration failures, raised once at load time.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PolicyError {
    #[error("invalid weight policy: no active metrics")]
    NoActiveMetrics,
    #[error("invalid weight policy: weights sum to {sum}, expected 1.0")]
    WeightSum { sum: f64 },
    #[error("invalid weight policy: weight for {metric} is {weight}")]
    InvalidWeight { metric: Metric, weight: f64 },
    #[error("invalid weight policy: blend weights {geometric} + {expression} must be non-negative and sum to 1.0")]
    BlendWeights { geometric: f64, expression: f64 },
    #[error("invalid weight policy: verdict table is empty")]
    NoVerdicts,
    #[error("invalid weight policy: verdict threshold {next} does not descend from {previous}")]
    UnorderedVerdicts { previous: u8, next: u8 },
    #[error("invalid weight policy: threshold {0} exceeds 100")]
    ThresholdOutOfRange(u8),
    #[error("invalid weight policy: lowest verdict threshold is {0}, expected 0")]
    LowestVerdictNotZero(u8),
    #[error("invalid weight policy: genuineness predicate has no thresholds")]
    EmptyPredicate,
    #[error("invalid weight policy: happy threshold {0} outside 0.0..=1.0")]
    HappyThreshold(f64),
    #[error("invalid formula calibration for {name}: scale {scale}, offset {offset}")]
    InvalidCalibration {
        name: &'static str,
        offset: f64,
        scale: f64,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LandmarkError {
    #[error("{region} needs {expected} points, got {got}")]
    RegionCount {
        region: Region,
        expected: usize,
        got: usize,
    },
    #[error("flat landmark array needs {expected} points, got {got}")]
    PointCount { expected: usize, got: usize },
}
