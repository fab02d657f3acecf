//! Test support utilities for duchenne.
//!
//! Provides synthetic landmark fixtures and collaborator mocks.
//!
//! # Example
//!
//! ```
//! use duchenne_test_support::{batch, FaceBuilder};
//!
//! let neutral = FaceBuilder::neutral().detected();
//! let smiling = FaceBuilder::duchenne_smile().happy(0.9).detected();
//! let detections = batch(vec![neutral, smiling]);
//! assert_eq!(detections.faces.len(), 2);
//! ```

mod builders;
mod mocks;

pub use builders::{batch, batch_json, FaceBuilder, AXIS_X};
pub use mocks::{RecordingTelemetry, TelemetryCounts};
