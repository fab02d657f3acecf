//! Typed access to the 68-point landmark layout produced by the external
//! detector.
//!
//! All scoring formulas are index-based. The indices live in [`scheme`] and
//! nowhere else, so a change of the detector's landmark layout is a one-place
//! update. Regions are stored as fixed-size arrays; a [`LandmarkSet`] can only
//! be built with the exact per-region point counts.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LandmarkError;

/// Versioned index table for the iBUG 68-point layout.
///
/// "Left" and "right" are image-left and image-right, i.e. the subject's
/// right eye is [`LandmarkSet::left_eye`].
pub mod scheme {
    use std::ops::Range;

    pub const SCHEME: &str = "ibug-68";
    pub const POINT_COUNT: usize = 68;

    pub const JAW: Range<usize> = 0..17;
    pub const NOSE: Range<usize> = 27..36;
    pub const LEFT_EYE: Range<usize> = 36..42;
    pub const RIGHT_EYE: Range<usize> = 42..48;
    pub const MOUTH: Range<usize> = 48..68;

    pub const JAW_POINTS: usize = 17;
    pub const NOSE_POINTS: usize = 9;
    pub const EYE_POINTS: usize = 6;
    pub const MOUTH_POINTS: usize = 20;

    /// Offsets inside a 6-point eye region.
    pub mod eye {
        /// Horizontal extent: image-leftmost and image-rightmost corners.
        pub const CORNERS: (usize, usize) = (0, 3);
        /// Upper/lower lid pairs measured for eye opening.
        pub const LID_PAIRS: [(usize, usize); 2] = [(1, 5), (2, 4)];
        pub const LOWER_LID: [usize; 2] = [4, 5];
    }

    /// Offsets inside the 9-point nose region.
    pub mod nose {
        pub const BRIDGE_TOP: usize = 0;
        pub const TIP: usize = 3;
        /// Subnasale, the base of the columella.
        pub const BASE: usize = 6;
    }

    /// Offsets inside the 20-point mouth region.
    pub mod mouth {
        pub const LEFT_CORNER: usize = 0;
        pub const UPPER_LIP_TOP: usize = 3;
        pub const RIGHT_CORNER: usize = 6;
        pub const LOWER_LIP_BOTTOM: usize = 9;
        pub const UPPER_LIP_CENTER: usize = 14;
        pub const LOWER_LIP_CENTER: usize = 18;
    }

    /// Offsets inside the 17-point jaw outline.
    pub mod jaw {
        use std::ops::Range;

        pub const LEFT_SIDE: Range<usize> = 0..8;
        pub const CHIN: usize = 8;
        pub const RIGHT_SIDE: Range<usize> = 9..17;
    }
}

/// A landmark position in image pixels. Not necessarily integral.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point2D) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn midpoint(&self, other: &Point2D) -> Point2D {
        Point2D::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Facial region a set of points belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    LeftEye,
    RightEye,
    Nose,
    Mouth,
    Jaw,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LeftEye => "left eye",
            Self::RightEye => "right eye",
            Self::Nose => "nose",
            Self::Mouth => "mouth",
            Self::Jaw => "jaw",
        })
    }
}

/// Borrowed view over one eye's six points.
#[derive(Debug, Clone, Copy)]
pub struct Eye<'a> {
    points: &'a [Point2D; scheme::EYE_POINTS],
}

impl<'a> Eye<'a> {
    pub fn corners(&self) -> (Point2D, Point2D) {
        let (a, b) = scheme::eye::CORNERS;
        (self.points[a], self.points[b])
    }

    pub fn lid_pairs(&self) -> [(Point2D, Point2D); 2] {
        scheme::eye::LID_PAIRS.map(|(upper, lower)| (self.points[upper], self.points[lower]))
    }

    pub fn lower_lid(&self) -> [Point2D; 2] {
        scheme::eye::LOWER_LID.map(|i| self.points[i])
    }

    /// Centroid of all six points.
    pub fn center(&self) -> Point2D {
        centroid(self.points)
    }

    pub fn points(&self) -> &'a [Point2D] {
        self.points
    }
}

/// Landmarks for a single detected face, grouped by region.
///
/// Owned by one detection result; the engine only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLandmarks", into = "RawLandmarks")]
pub struct LandmarkSet {
    left_eye: [Point2D; scheme::EYE_POINTS],
    right_eye: [Point2D; scheme::EYE_POINTS],
    nose: [Point2D; scheme::NOSE_POINTS],
    mouth: [Point2D; scheme::MOUTH_POINTS],
    jaw: [Point2D; scheme::JAW_POINTS],
}

impl LandmarkSet {
    /// Build from per-region point lists, validating each region's count.
    pub fn from_regions(regions: LandmarkRegions) -> Result<Self, LandmarkError> {
        Ok(Self {
            left_eye: region(Region::LeftEye, regions.left_eye)?,
            right_eye: region(Region::RightEye, regions.right_eye)?,
            nose: region(Region::Nose, regions.nose)?,
            mouth: region(Region::Mouth, regions.mouth)?,
            jaw: region(Region::Jaw, regions.jaw)?,
        })
    }

    /// Build from the detector's flat 68-point array. Eyebrow points are
    /// not used by any metric and are dropped.
    pub fn from_points(points: &[Point2D]) -> Result<Self, LandmarkError> {
        if points.len() != scheme::POINT_COUNT {
            return Err(LandmarkError::PointCount {
                expected: scheme::POINT_COUNT,
                got: points.len(),
            });
        }
        Self::from_regions(LandmarkRegions {
            left_eye: points[scheme::LEFT_EYE].to_vec(),
            right_eye: points[scheme::RIGHT_EYE].to_vec(),
            nose: points[scheme::NOSE].to_vec(),
            mouth: points[scheme::MOUTH].to_vec(),
            jaw: points[scheme::JAW].to_vec(),
        })
    }

    pub fn left_eye(&self) -> Eye<'_> {
        Eye {
            points: &self.left_eye,
        }
    }

    pub fn right_eye(&self) -> Eye<'_> {
        Eye {
            points: &self.right_eye,
        }
    }

    pub fn nose(&self) -> &[Point2D] {
        &self.nose
    }

    pub fn nose_bridge_top(&self) -> Point2D {
        self.nose[scheme::nose::BRIDGE_TOP]
    }

    pub fn nose_tip(&self) -> Point2D {
        self.nose[scheme::nose::TIP]
    }

    pub fn nose_base(&self) -> Point2D {
        self.nose[scheme::nose::BASE]
    }

    pub fn mouth(&self) -> &[Point2D] {
        &self.mouth
    }

    pub fn left_mouth_corner(&self) -> Point2D {
        self.mouth[scheme::mouth::LEFT_CORNER]
    }

    pub fn right_mouth_corner(&self) -> Point2D {
        self.mouth[scheme::mouth::RIGHT_CORNER]
    }

    /// Mean of both mouth corners.
    pub fn mouth_corners_mid(&self) -> Point2D {
        self.left_mouth_corner().midpoint(&self.right_mouth_corner())
    }

    /// Top of the outer upper lip (cupid's bow center).
    pub fn upper_lip_top(&self) -> Point2D {
        self.mouth[scheme::mouth::UPPER_LIP_TOP]
    }

    /// Bottom of the outer lower lip.
    pub fn lower_lip_bottom(&self) -> Point2D {
        self.mouth[scheme::mouth::LOWER_LIP_BOTTOM]
    }

    /// Center of the inner upper lip edge.
    pub fn upper_lip_center(&self) -> Point2D {
        self.mouth[scheme::mouth::UPPER_LIP_CENTER]
    }

    /// Center of the inner lower lip edge.
    pub fn lower_lip_center(&self) -> Point2D {
        self.mouth[scheme::mouth::LOWER_LIP_CENTER]
    }

    pub fn jaw(&self) -> &[Point2D] {
        &self.jaw
    }

    pub fn jaw_left_side(&self) -> &[Point2D] {
        &self.jaw[scheme::jaw::LEFT_SIDE]
    }

    pub fn jaw_right_side(&self) -> &[Point2D] {
        &self.jaw[scheme::jaw::RIGHT_SIDE]
    }

    pub fn chin(&self) -> Point2D {
        self.jaw[scheme::jaw::CHIN]
    }
}

/// Per-region point lists, the JSON shape most detectors emit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandmarkRegions {
    pub left_eye: Vec<Point2D>,
    pub right_eye: Vec<Point2D>,
    pub nose: Vec<Point2D>,
    pub mouth: Vec<Point2D>,
    pub jaw: Vec<Point2D>,
}

/// Accepted wire shapes: region object or flat 68-point array.
///
/// Point counts are not checked until conversion into a [`LandmarkSet`],
/// so one malformed face does not fail the whole detector document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawLandmarks {
    Regions(LandmarkRegions),
    Flat(Vec<Point2D>),
}

impl TryFrom<RawLandmarks> for LandmarkSet {
    type Error = LandmarkError;

    fn try_from(raw: RawLandmarks) -> Result<Self, Self::Error> {
        match raw {
            RawLandmarks::Regions(regions) => Self::from_regions(regions),
            RawLandmarks::Flat(points) => Self::from_points(&points),
        }
    }
}

impl From<LandmarkSet> for RawLandmarks {
    fn from(set: LandmarkSet) -> Self {
        RawLandmarks::Regions(LandmarkRegions {
            left_eye: set.left_eye.to_vec(),
            right_eye: set.right_eye.to_vec(),
            nose: set.nose.to_vec(),
            mouth: set.mouth.to_vec(),
            jaw: set.jaw.to_vec(),
        })
    }
}

fn region<const N: usize>(
    region: Region,
    points: Vec<Point2D>,
) -> Result<[Point2D; N], LandmarkError> {
    let got = points.len();
    points
        .try_into()
        .map_err(|_| LandmarkError::RegionCount {
            region,
            expected: N,
            got,
        })
}

fn centroid(points: &[Point2D]) -> Point2D {
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Point2D::new(sx / n, sy / n)
}
