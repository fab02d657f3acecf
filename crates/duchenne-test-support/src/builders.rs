//! Synthetic landmark builders for testing.

use duchenne_core::{
    BoundingBox, DetectedFace, DetectionBatch, ExpressionVector, ImageDimensions,
    LandmarkRegions, LandmarkSet, Point2D,
};

/// Vertical axis the synthetic face is mirrored around.
pub const AXIS_X: f64 = 200.0;

/// Builder for a frontal, left-right mirrored face in iBUG-68 layout.
///
/// Defaults describe a neutral, closed-mouth expression: eye opening 9 px on
/// a 26 px wide eye, mouth corners level with the inner lip line.
#[derive(Debug, Clone)]
pub struct FaceBuilder {
    eye_half_open: f64,
    corner_lift: f64,
    upper_lip_raise: f64,
    cheek_raise: f64,
    right_jaw_shift: f64,
    collapse_left_eye: bool,
    expressions: Option<ExpressionVector>,
}

impl Default for FaceBuilder {
    fn default() -> Self {
        Self::neutral()
    }
}

impl FaceBuilder {
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            eye_half_open: 4.5,
            corner_lift: 0.0,
            upper_lip_raise: 0.0,
            cheek_raise: 0.0,
            right_jaw_shift: 0.0,
            collapse_left_eye: false,
            expressions: None,
        }
    }

    /// Squinted eyes pushed down by the cheeks, lifted corners.
    #[must_use]
    pub fn duchenne_smile() -> Self {
        Self::neutral()
            .eye_half_open(1.5)
            .cheek_raise(6.0)
            .corner_lift(8.0)
    }

    /// Lifted corners only; eyes stay open.
    #[must_use]
    pub fn social_smile() -> Self {
        Self::neutral().corner_lift(8.0)
    }

    /// Half the lid gap of each eye, in pixels.
    #[must_use]
    pub fn eye_half_open(mut self, px: f64) -> Self {
        self.eye_half_open = px;
        self
    }

    /// Raise both mouth corners by `px`.
    #[must_use]
    pub fn corner_lift(mut self, px: f64) -> Self {
        self.corner_lift = px;
        self
    }

    /// Raise the outer upper lip by `px`.
    #[must_use]
    pub fn upper_lip_raise(mut self, px: f64) -> Self {
        self.upper_lip_raise = px;
        self
    }

    /// Move both eyes down by `px`, closing the gap to the nose tip.
    #[must_use]
    pub fn cheek_raise(mut self, px: f64) -> Self {
        self.cheek_raise = px;
        self
    }

    /// Push the image-right jaw outline outward by `px`.
    #[must_use]
    pub fn right_jaw_shift(mut self, px: f64) -> Self {
        self.right_jaw_shift = px;
        self
    }

    /// Collapse all six left-eye points onto one.
    #[must_use]
    pub fn collapse_left_eye(mut self) -> Self {
        self.collapse_left_eye = true;
        self
    }

    #[must_use]
    pub fn happy(mut self, probability: f64) -> Self {
        let vector = self.expressions.take().unwrap_or_default();
        self.expressions = Some(vector.with("happy", probability));
        self
    }

    pub fn regions(&self) -> LandmarkRegions {
        let h = self.eye_half_open;
        let ey = 150.0 + self.cheek_raise;
        let mut left_eye = vec![
            p(150.0, ey),
            p(158.0, ey - h),
            p(168.0, ey - h),
            p(176.0, ey),
            p(168.0, ey + h),
            p(158.0, ey + h),
        ];
        let right_eye = vec![
            mirror(left_eye[3]),
            mirror(left_eye[2]),
            mirror(left_eye[1]),
            mirror(left_eye[0]),
            mirror(left_eye[5]),
            mirror(left_eye[4]),
        ];
        if self.collapse_left_eye {
            left_eye = vec![p(163.0, ey); 6];
        }

        let nose = vec![
            p(200.0, 150.0),
            p(200.0, 163.0),
            p(200.0, 176.0),
            p(200.0, 190.0),
            p(188.0, 197.0),
            p(194.0, 199.0),
            p(200.0, 200.0),
            p(206.0, 199.0),
            p(212.0, 197.0),
        ];

        let cy = 222.0 - self.corner_lift;
        let r = self.upper_lip_raise;
        let mouth = vec![
            p(176.0, cy),
            p(184.0, 216.0 - r),
            p(192.0, 213.0 - r),
            p(200.0, 214.0 - r),
            p(208.0, 213.0 - r),
            p(216.0, 216.0 - r),
            p(224.0, cy),
            p(216.0, 228.0),
            p(208.0, 231.0),
            p(200.0, 232.0),
            p(192.0, 231.0),
            p(184.0, 228.0),
            p(180.0, cy),
            p(192.0, 219.0),
            p(200.0, 220.0),
            p(208.0, 219.0),
            p(220.0, cy),
            p(208.0, 225.0),
            p(200.0, 226.0),
            p(192.0, 225.0),
        ];

        let left_jaw = [
            p(120.0, 160.0),
            p(121.0, 180.0),
            p(124.0, 200.0),
            p(129.0, 219.0),
            p(137.0, 236.0),
            p(148.0, 250.0),
            p(161.0, 261.0),
            p(177.0, 269.0),
        ];
        let mut jaw = left_jaw.to_vec();
        jaw.push(p(AXIS_X, 272.0));
        jaw.extend(left_jaw.iter().rev().map(|q| {
            let m = mirror(*q);
            p(m.x + self.right_jaw_shift, m.y)
        }));

        LandmarkRegions {
            left_eye,
            right_eye,
            nose,
            mouth,
            jaw,
        }
    }

    /// The detector's flat 68-point array, eyebrows included.
    pub fn points(&self) -> Vec<Point2D> {
        let r = self.regions();
        let brows = (0..10).map(|i| {
            let x = if i < 5 {
                145.0 + 8.0 * i as f64
            } else {
                mirror(p(145.0 + 8.0 * (9 - i) as f64, 0.0)).x
            };
            p(x, 135.0)
        });
        let mut points = Vec::with_capacity(68);
        points.extend(r.jaw);
        points.extend(brows);
        points.extend(r.nose);
        points.extend(r.left_eye);
        points.extend(r.right_eye);
        points.extend(r.mouth);
        points
    }

    pub fn build(&self) -> LandmarkSet {
        LandmarkSet::from_regions(self.regions()).expect("synthetic face has valid region counts")
    }

    /// Wrap as a detector face with a box around the jaw outline.
    pub fn detected(&self) -> DetectedFace {
        DetectedFace {
            landmarks: self.build().into(),
            bounding_box: BoundingBox::new(120.0, 130.0, 160.0, 145.0),
            expressions: self.expressions.clone(),
        }
    }
}

/// Detector output for a 640×480 image.
pub fn batch(faces: Vec<DetectedFace>) -> DetectionBatch {
    DetectionBatch {
        image: ImageDimensions::new(640.0, 480.0),
        faces,
    }
}

/// Detector output as the JSON the CLI reads.
pub fn batch_json(faces: Vec<DetectedFace>) -> String {
    serde_json::to_string_pretty(&batch(faces)).expect("batch serializes")
}

fn p(x: f64, y: f64) -> Point2D {
    Point2D::new(x, y)
}

fn mirror(q: Point2D) -> Point2D {
    p(2.0 * AXIS_X - q.x, q.y)
}
