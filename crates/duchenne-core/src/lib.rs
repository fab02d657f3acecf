//! Duchenne core: smile authenticity scoring from facial landmarks.
//!
//! The engine turns one face's 68-point landmarks (plus an optional
//! expression vector) into six normalized sub-metrics, then into a final
//! score, a genuineness flag and a verdict label:
//!
//! 1. [`LandmarkSet`] validates region counts and names the points formulas use
//! 2. [`stabilize()`] rounds every intermediate distance to suppress jitter
//! 3. [`metrics`] maps stabilized ratios to `0..=100` scores
//! 4. [`WeightPolicy`] weights them, optionally blends in "happy", and
//!    classifies the result
//! 5. [`Engine`] assembles a [`FaceResult`] per detected face
//!
//! Face detection, landmark extraction, transport, caching and counters are
//! external; [`ports`] holds the interfaces for the last two.
//!
//! ```
//! use duchenne_core::{DetectionBatch, Engine, FormulaSet, ImageDimensions, WeightPolicy};
//!
//! let engine = Engine::new(WeightPolicy::geometry_only(), FormulaSet::default()).unwrap();
//! let batch = DetectionBatch {
//!     image: ImageDimensions::new(640.0, 480.0),
//!     faces: vec![],
//! };
//! assert!(engine.assess_all(&batch).is_empty());
//! ```

pub mod assemble;
pub mod engine;
mod error;
pub mod expression;
pub mod landmarks;
pub mod metrics;
pub mod policy;
pub mod ports;
pub mod stabilize;

pub use assemble::{assemble_face, BoundingBox, FaceResult, ImageDimensions, NormalizedBox};
pub use engine::{BatchOutcome, DetectedFace, DetectionBatch, Engine, RejectedFace};
pub use error::{LandmarkError, PolicyError, ScoringError};
pub use expression::ExpressionVector;
pub use landmarks::{LandmarkRegions, LandmarkSet, Point2D, RawLandmarks};
pub use metrics::{
    Calibration, FormulaSet, LinearMap, Metric, MetricSet, MouthCurveMethod, SymmetryMethod,
};
pub use policy::{
    score, BlendWeights, CompositionMode, FinalScore, GenuinenessRule, MetricThreshold,
    VerdictTier, WeightPolicy,
};
pub use ports::{ContentKey, NoopTelemetry, ResultCache, ScoringService, Telemetry};
pub use stabilize::stabilize;
