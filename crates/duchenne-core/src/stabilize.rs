//! Sub-pixel jitter suppression.
//!
//! Detector coordinates wobble by fractions of a pixel between otherwise
//! identical frames. Rounding every raw distance to one decimal before it
//! enters a ratio bounds how far that wobble can move the ratio. Applied to
//! intermediate distances only, never to a final percentage.

use crate::landmarks::Point2D;

/// Round to one decimal place. NaN and infinities pass through unchanged.
pub fn stabilize(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Stabilized Euclidean distance between two landmarks.
pub fn distance(a: Point2D, b: Point2D) -> f64 {
    stabilize(a.distance(&b))
}

/// Stabilized absolute vertical distance between two landmarks.
pub fn vertical(a: Point2D, b: Point2D) -> f64 {
    stabilize((a.y - b.y).abs())
}

/// Stabilized absolute horizontal distance between two landmarks.
pub fn horizontal(a: Point2D, b: Point2D) -> f64 {
    stabilize((a.x - b.x).abs())
}
