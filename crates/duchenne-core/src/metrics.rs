//! Landmark geometry to normalized sub-metrics.
//!
//! Every metric follows the same path: stabilized distances form a ratio, the
//! ratio goes through a [`LinearMap`] into `0.0..=1.0`, and the result is
//! scaled to an integer percentage. Ratios are exposed separately from scores
//! so calibration can be tuned against raw measurements.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PolicyError, ScoringError};
use crate::landmarks::{Eye, LandmarkSet, Point2D};
use crate::stabilize::{distance, horizontal, stabilize, vertical};

/// The six smile sub-metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Metric {
    EyeConstriction,
    CheekRaise,
    MouthCurve,
    Symmetry,
    LipCornerElevation,
    NoseLipCompression,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::EyeConstriction,
        Metric::CheekRaise,
        Metric::MouthCurve,
        Metric::Symmetry,
        Metric::LipCornerElevation,
        Metric::NoseLipCompression,
    ];

    /// Wire name, as it appears in configuration and JSON output.
    pub fn name(self) -> &'static str {
        match self {
            Self::EyeConstriction => "eyeConstriction",
            Self::CheekRaise => "cheekRaise",
            Self::MouthCurve => "mouthCurve",
            Self::Symmetry => "symmetry",
            Self::LipCornerElevation => "lipCornerElevation",
            Self::NoseLipCompression => "noseLipCompression",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<String> for Metric {
    type Error = String;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Metric::ALL
            .into_iter()
            .find(|m| m.name() == name)
            .ok_or_else(|| format!("unknown metric '{name}'"))
    }
}

impl From<Metric> for String {
    fn from(metric: Metric) -> Self {
        metric.name().to_string()
    }
}

/// Metric name to integer score in `0..=100`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricSet(BTreeMap<Metric, u8>);

impl MetricSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert; values above 100 are clamped.
    #[must_use]
    pub fn with(mut self, metric: Metric, score: u8) -> Self {
        self.0.insert(metric, score.min(100));
        self
    }

    pub fn get(&self, metric: Metric) -> Option<u8> {
        self.0.get(&metric).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, u8)> + '_ {
        self.0.iter().map(|(m, s)| (*m, *s))
    }
}

impl FromIterator<(Metric, u8)> for MetricSet {
    fn from_iter<I: IntoIterator<Item = (Metric, u8)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |set, (metric, score)| set.with(metric, score))
    }
}

/// Affine map of a raw ratio into `0.0..=1.0`: `clamp((ratio - offset) / scale)`.
///
/// A negative scale means smaller ratios score higher.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinearMap {
    pub offset: f64,
    pub scale: f64,
}

impl LinearMap {
    pub const fn new(offset: f64, scale: f64) -> Self {
        Self { offset, scale }
    }

    pub fn apply(&self, ratio: f64) -> f64 {
        ((ratio - self.offset) / self.scale).clamp(0.0, 1.0)
    }

    fn validate(&self, name: &'static str) -> Result<(), PolicyError> {
        if self.scale == 0.0 || !self.scale.is_finite() || !self.offset.is_finite() {
            return Err(PolicyError::InvalidCalibration {
                name,
                offset: self.offset,
                scale: self.scale,
            });
        }
        Ok(())
    }
}

/// Which mouth curvature formula to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouthCurveMethod {
    /// Rise of the corners above the inner upper-lip center, over mouth width.
    #[default]
    CornerLift,
    /// Mouth width over outer mouth height.
    AspectRatio,
}

/// Which symmetry formula to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymmetryMethod {
    /// Left/right jaw outline spread around the nose-tip axis.
    #[default]
    JawOutline,
    /// Vertical tilt of eye centers and mouth corners over their span.
    FeatureOffsets,
}

/// Tunable constants for every formula.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Calibration {
    pub eye_constriction: LinearMap,
    pub cheek_raise: LinearMap,
    pub mouth_corner_lift: LinearMap,
    pub mouth_aspect_ratio: LinearMap,
    pub jaw_symmetry: LinearMap,
    pub feature_symmetry: LinearMap,
    pub lip_corner_elevation: LinearMap,
    pub nose_lip_compression: LinearMap,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            // Open eyes sit around 0.30-0.35, a Duchenne squint near 0.20.
            eye_constriction: LinearMap::new(0.35, -0.15),
            cheek_raise: LinearMap::new(1.8, -0.8),
            mouth_corner_lift: LinearMap::new(-0.05, 0.25),
            mouth_aspect_ratio: LinearMap::new(2.0, 2.0),
            jaw_symmetry: LinearMap::new(0.25, -0.25),
            feature_symmetry: LinearMap::new(0.2, -0.2),
            lip_corner_elevation: LinearMap::new(1.6, -0.6),
            nose_lip_compression: LinearMap::new(0.4, -0.25),
        }
    }
}

impl Calibration {
    fn validate(&self) -> Result<(), PolicyError> {
        self.eye_constriction.validate("eye_constriction")?;
        self.cheek_raise.validate("cheek_raise")?;
        self.mouth_corner_lift.validate("mouth_corner_lift")?;
        self.mouth_aspect_ratio.validate("mouth_aspect_ratio")?;
        self.jaw_symmetry.validate("jaw_symmetry")?;
        self.feature_symmetry.validate("feature_symmetry")?;
        self.lip_corner_elevation.validate("lip_corner_elevation")?;
        self.nose_lip_compression.validate("nose_lip_compression")
    }
}

/// Formula selection plus calibration; one canonical implementation per
/// metric, chosen by configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormulaSet {
    pub mouth_curve: MouthCurveMethod,
    pub symmetry: SymmetryMethod,
    pub calibration: Calibration,
}

impl FormulaSet {
    pub fn validate(&self) -> Result<(), PolicyError> {
        self.calibration.validate()
    }

    /// Score one metric with the configured formula.
    pub fn measure(&self, metric: Metric, landmarks: &LandmarkSet) -> Result<u8, ScoringError> {
        let cal = &self.calibration;
        match metric {
            Metric::EyeConstriction => eye_constriction(landmarks, &cal.eye_constriction),
            Metric::CheekRaise => cheek_raise(landmarks, &cal.cheek_raise),
            Metric::MouthCurve => match self.mouth_curve {
                MouthCurveMethod::CornerLift => {
                    mouth_curve_corner_lift(landmarks, &cal.mouth_corner_lift)
                }
                MouthCurveMethod::AspectRatio => {
                    mouth_curve_aspect(landmarks, &cal.mouth_aspect_ratio)
                }
            },
            Metric::Symmetry => match self.symmetry {
                SymmetryMethod::JawOutline => jaw_symmetry(landmarks, &cal.jaw_symmetry),
                SymmetryMethod::FeatureOffsets => {
                    feature_symmetry(landmarks, &cal.feature_symmetry)
                }
            },
            Metric::LipCornerElevation => {
                lip_corner_elevation(landmarks, &cal.lip_corner_elevation)
            }
            Metric::NoseLipCompression => {
                nose_lip_compression(landmarks, &cal.nose_lip_compression)
            }
        }
    }

    /// Score every metric in `metrics`. The first failure rejects the face.
    pub fn measure_all(
        &self,
        metrics: impl IntoIterator<Item = Metric>,
        landmarks: &LandmarkSet,
    ) -> Result<MetricSet, ScoringError> {
        metrics
            .into_iter()
            .map(|metric| {
                let score = self.measure(metric, landmarks)?;
                tracing::trace!(%metric, score, "metric measured");
                Ok((metric, score))
            })
            .collect()
    }
}

// === Ratios ===

/// Mean eye openness (lid gap over eye width) across both eyes.
pub fn eye_aspect_ratio(landmarks: &LandmarkSet) -> Result<f64, ScoringError> {
    let left = single_eye_aspect(landmarks.left_eye())?;
    let right = single_eye_aspect(landmarks.right_eye())?;
    Ok((left + right) / 2.0)
}

fn single_eye_aspect(eye: Eye<'_>) -> Result<f64, ScoringError> {
    let (a, b) = eye.corners();
    let width = distance(a, b);
    let [(u1, l1), (u2, l2)] = eye.lid_pairs();
    let height = (distance(u1, l1) + distance(u2, l2)) / 2.0;
    ratio(Metric::EyeConstriction, height, width)
}

/// Eye-bottom to nose-tip height over nose-tip to upper-lip height.
pub fn cheek_raise_ratio(landmarks: &LandmarkSet) -> Result<f64, ScoringError> {
    let lids = landmarks
        .left_eye()
        .lower_lid()
        .into_iter()
        .chain(landmarks.right_eye().lower_lid());
    let eye_bottom_y = lids.map(|p| p.y).sum::<f64>() / 4.0;
    let nose_tip = landmarks.nose_tip();

    let upper = stabilize((nose_tip.y - eye_bottom_y).abs());
    let lower = vertical(landmarks.upper_lip_top(), nose_tip);
    ratio(Metric::CheekRaise, upper, lower)
}

/// Signed rise of the mouth corners above the inner upper-lip center, over
/// mouth width. Positive when the corners sit higher (smaller y).
pub fn mouth_corner_lift_ratio(landmarks: &LandmarkSet) -> Result<f64, ScoringError> {
    let width = distance(landmarks.left_mouth_corner(), landmarks.right_mouth_corner());
    let lift = stabilize(landmarks.upper_lip_center().y - landmarks.mouth_corners_mid().y);
    ratio(Metric::MouthCurve, lift, width)
}

/// Mouth width over outer mouth height.
pub fn mouth_aspect_ratio(landmarks: &LandmarkSet) -> Result<f64, ScoringError> {
    let width = distance(landmarks.left_mouth_corner(), landmarks.right_mouth_corner());
    let height = distance(landmarks.upper_lip_top(), landmarks.lower_lip_bottom());
    ratio(Metric::MouthCurve, width, height)
}

/// `|L - R| / (L + R)` where L and R are the summed horizontal distances of
/// each jaw side from the vertical axis through the nose tip.
pub fn jaw_asymmetry_ratio(landmarks: &LandmarkSet) -> Result<f64, ScoringError> {
    let axis = landmarks.nose_tip().x;
    let spread = |side: &[Point2D]| {
        stabilize(side.iter().map(|p| (p.x - axis).abs()).sum::<f64>())
    };
    let left = spread(landmarks.jaw_left_side());
    let right = spread(landmarks.jaw_right_side());
    ratio(Metric::Symmetry, (left - right).abs(), left + right)
}

/// Mean of eye-center tilt and mouth-corner tilt, each as vertical offset
/// over horizontal span.
pub fn feature_asymmetry_ratio(landmarks: &LandmarkSet) -> Result<f64, ScoringError> {
    let left_eye = landmarks.left_eye().center();
    let right_eye = landmarks.right_eye().center();
    let eyes = ratio(
        Metric::Symmetry,
        vertical(left_eye, right_eye),
        horizontal(left_eye, right_eye),
    )?;

    let left_corner = landmarks.left_mouth_corner();
    let right_corner = landmarks.right_mouth_corner();
    let mouth = ratio(
        Metric::Symmetry,
        vertical(left_corner, right_corner),
        horizontal(left_corner, right_corner),
    )?;

    Ok((eyes + mouth) / 2.0)
}

/// Corner-to-nose-tip height over upper-lip-to-nose-tip height.
pub fn lip_corner_ratio(landmarks: &LandmarkSet) -> Result<f64, ScoringError> {
    let nose_tip = landmarks.nose_tip();
    let corners = vertical(landmarks.mouth_corners_mid(), nose_tip);
    let lip = vertical(landmarks.upper_lip_top(), nose_tip);
    ratio(Metric::LipCornerElevation, corners, lip)
}

/// Philtrum height (nose base to upper lip) over nose height.
pub fn nose_lip_ratio(landmarks: &LandmarkSet) -> Result<f64, ScoringError> {
    let base = landmarks.nose_base();
    let gap = vertical(landmarks.upper_lip_top(), base);
    let nose = vertical(base, landmarks.nose_bridge_top());
    ratio(Metric::NoseLipCompression, gap, nose)
}

// === Scores ===

/// Narrower eyes score higher.
pub fn eye_constriction(landmarks: &LandmarkSet, map: &LinearMap) -> Result<u8, ScoringError> {
    eye_aspect_ratio(landmarks).map(|r| percent(map.apply(r)))
}

pub fn cheek_raise(landmarks: &LandmarkSet, map: &LinearMap) -> Result<u8, ScoringError> {
    cheek_raise_ratio(landmarks).map(|r| percent(map.apply(r)))
}

pub fn mouth_curve_corner_lift(
    landmarks: &LandmarkSet,
    map: &LinearMap,
) -> Result<u8, ScoringError> {
    mouth_corner_lift_ratio(landmarks).map(|r| percent(map.apply(r)))
}

pub fn mouth_curve_aspect(landmarks: &LandmarkSet, map: &LinearMap) -> Result<u8, ScoringError> {
    mouth_aspect_ratio(landmarks).map(|r| percent(map.apply(r)))
}

/// 100 exactly when both jaw sides match; any measurable difference costs at
/// least one point.
pub fn jaw_symmetry(landmarks: &LandmarkSet, map: &LinearMap) -> Result<u8, ScoringError> {
    jaw_asymmetry_ratio(landmarks).map(|r| percent_floor(map.apply(r)))
}

pub fn feature_symmetry(landmarks: &LandmarkSet, map: &LinearMap) -> Result<u8, ScoringError> {
    feature_asymmetry_ratio(landmarks).map(|r| percent_floor(map.apply(r)))
}

pub fn lip_corner_elevation(
    landmarks: &LandmarkSet,
    map: &LinearMap,
) -> Result<u8, ScoringError> {
    lip_corner_ratio(landmarks).map(|r| percent(map.apply(r)))
}

pub fn nose_lip_compression(
    landmarks: &LandmarkSet,
    map: &LinearMap,
) -> Result<u8, ScoringError> {
    nose_lip_ratio(landmarks).map(|r| percent(map.apply(r)))
}

fn ratio(metric: Metric, numerator: f64, denominator: f64) -> Result<f64, ScoringError> {
    if denominator == 0.0 {
        return Err(ScoringError::DegenerateGeometry { metric });
    }
    let r = numerator / denominator;
    if !r.is_finite() {
        return Err(ScoringError::NonFiniteGeometry { metric });
    }
    Ok(r)
}

// `unit` is already clamped to 0..=1 and finite.
fn percent(unit: f64) -> u8 {
    (unit * 100.0).round() as u8
}

const FLOOR_EPSILON: f64 = 1e-9;

// Values within float noise of an integer floor to that integer, so 0.58
// scores 58 rather than 57. Only an exact 1.0 reaches 100.
fn percent_floor(unit: f64) -> u8 {
    if unit >= 1.0 {
        return 100;
    }
    ((unit * 100.0 + FLOOR_EPSILON).floor() as u8).min(99)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::LandmarkRegions;

    fn p(x: f64, y: f64) -> Point2D {
        Point2D::new(x, y)
    }

    /// Left-right symmetric neutral face around x = 200.
    fn regions(eye_half_open: f64, corner_lift: f64) -> LandmarkRegions {
        let left_eye = vec![
            p(150.0, 150.0),
            p(158.0, 150.0 - eye_half_open),
            p(168.0, 150.0 - eye_half_open),
            p(176.0, 150.0),
            p(168.0, 150.0 + eye_half_open),
            p(158.0, 150.0 + eye_half_open),
        ];
        let m = |q: Point2D| p(400.0 - q.x, q.y);
        let right_eye = vec![
            m(left_eye[3]),
            m(left_eye[2]),
            m(left_eye[1]),
            m(left_eye[0]),
            m(left_eye[5]),
            m(left_eye[4]),
        ];
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
        let cy = 222.0 - corner_lift;
        let mouth = vec![
            p(176.0, cy),
            p(184.0, 216.0),
            p(192.0, 213.0),
            p(200.0, 214.0),
            p(208.0, 213.0),
            p(216.0, 216.0),
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
        let mut jaw: Vec<_> = left_jaw.to_vec();
        jaw.push(p(200.0, 272.0));
        jaw.extend(left_jaw.iter().rev().map(|q| m(*q)));
        LandmarkRegions {
            left_eye,
            right_eye,
            nose,
            mouth,
            jaw,
        }
    }

    fn face(eye_half_open: f64, corner_lift: f64) -> LandmarkSet {
        LandmarkSet::from_regions(regions(eye_half_open, corner_lift)).unwrap()
    }

    #[test]
    fn metric_names_round_trip() {
        for metric in Metric::ALL {
            assert_eq!(Metric::try_from(metric.name().to_string()), Ok(metric));
        }
        assert!(Metric::try_from("smirk".to_string()).is_err());
    }

    #[test]
    fn neutral_face_ratios() {
        let f = face(4.5, 0.0);
        // lids 9.0 over width 26.0
        assert!((eye_aspect_ratio(&f).unwrap() - 9.0 / 26.0).abs() < 1e-9);
        // eye bottom 154.5 -> nose tip 190: 35.5; nose tip -> lip top 214: 24
        assert!((cheek_raise_ratio(&f).unwrap() - 35.5 / 24.0).abs() < 1e-9);
        // corners 32 below nose tip, lip top 24
        assert!((lip_corner_ratio(&f).unwrap() - 32.0 / 24.0).abs() < 1e-9);
        // philtrum 14 over nose height 50
        assert!((nose_lip_ratio(&f).unwrap() - 0.28).abs() < 1e-9);
        // width 48 over height 18
        assert!((mouth_aspect_ratio(&f).unwrap() - 48.0 / 18.0).abs() < 1e-9);
        // inner lip center 220 vs corners 222
        assert!((mouth_corner_lift_ratio(&f).unwrap() + 2.0 / 48.0).abs() < 1e-9);
    }

    #[test]
    fn every_metric_in_range() {
        let formulas = FormulaSet::default();
        let alt = FormulaSet {
            mouth_curve: MouthCurveMethod::AspectRatio,
            symmetry: SymmetryMethod::FeatureOffsets,
            ..FormulaSet::default()
        };
        for (open, lift) in [(0.5, 0.0), (4.5, 0.0), (8.0, 12.0), (2.0, -6.0), (12.0, 30.0)] {
            let f = face(open, lift);
            for set in [&formulas, &alt] {
                for metric in Metric::ALL {
                    let score = set.measure(metric, &f).unwrap();
                    assert!(score <= 100, "{metric} = {score}");
                }
            }
        }
    }

    #[test]
    fn measurement_is_idempotent() {
        let f = face(3.0, 5.0);
        let formulas = FormulaSet::default();
        let a = formulas.measure_all(Metric::ALL, &f).unwrap();
        let b = formulas.measure_all(Metric::ALL, &f).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 6);
    }

    #[test]
    fn wider_eyes_never_score_higher() {
        let map = Calibration::default().eye_constriction;
        let mut prev_ratio = f64::MIN;
        let mut prev_score = u8::MAX;
        for tenth in 5..=80 {
            let f = face(tenth as f64 / 10.0, 0.0);
            let r = eye_aspect_ratio(&f).unwrap();
            let s = eye_constriction(&f, &map).unwrap();
            assert!(r >= prev_ratio);
            assert!(s <= prev_score, "opening {tenth}: {s} > {prev_score}");
            prev_ratio = r;
            prev_score = s;
        }
    }

    #[test]
    fn squint_scores_high() {
        let map = Calibration::default().eye_constriction;
        // lids 3.0 over width 26: ratio 0.115 -> saturates at 100
        assert_eq!(eye_constriction(&face(1.5, 0.0), &map).unwrap(), 100);
        // lids 12 over 26: 0.46 -> 0
        assert_eq!(eye_constriction(&face(6.0, 0.0), &map).unwrap(), 0);
    }

    #[test]
    fn collapsed_eye_is_degenerate() {
        let mut r = regions(4.5, 0.0);
        r.left_eye = vec![p(160.0, 150.0); 6];
        let f = LandmarkSet::from_regions(r).unwrap();
        let err = eye_constriction(&f, &Calibration::default().eye_constriction).unwrap_err();
        assert_eq!(
            err,
            ScoringError::DegenerateGeometry {
                metric: Metric::EyeConstriction
            }
        );
    }

    #[test]
    fn nan_coordinates_surface_as_errors() {
        let mut r = regions(4.5, 0.0);
        r.nose[3] = p(200.0, f64::NAN);
        let f = LandmarkSet::from_regions(r).unwrap();
        let err = cheek_raise(&f, &Calibration::default().cheek_raise).unwrap_err();
        assert_eq!(
            err,
            ScoringError::NonFiniteGeometry {
                metric: Metric::CheekRaise
            }
        );
    }

    #[test]
    fn mirrored_face_is_fully_symmetric() {
        let f = face(4.5, 3.0);
        let cal = Calibration::default();
        assert_eq!(jaw_asymmetry_ratio(&f).unwrap(), 0.0);
        assert_eq!(jaw_symmetry(&f, &cal.jaw_symmetry).unwrap(), 100);
        assert_eq!(feature_symmetry(&f, &cal.feature_symmetry).unwrap(), 100);
    }

    #[test]
    fn any_jaw_difference_drops_below_100() {
        let cal = Calibration::default();
        for shift in [0.1, 0.5, 3.0, 20.0] {
            let mut r = regions(4.5, 0.0);
            r.jaw[16].x += shift;
            let f = LandmarkSet::from_regions(r).unwrap();
            let score = jaw_symmetry(&f, &cal.jaw_symmetry).unwrap();
            assert!(score < 100, "shift {shift} scored {score}");
        }
    }

    #[test]
    fn one_sided_smile_breaks_feature_symmetry() {
        let mut r = regions(4.5, 0.0);
        r.mouth[6].y -= 8.0;
        let f = LandmarkSet::from_regions(r).unwrap();
        let score = feature_symmetry(&f, &Calibration::default().feature_symmetry).unwrap();
        // mouth tilt 8/48 -> ratio 0.083 -> 58
        assert_eq!(score, 58);
    }

    #[test]
    fn lifted_corners_raise_mouth_curve() {
        let map = Calibration::default().mouth_corner_lift;
        let neutral = mouth_curve_corner_lift(&face(4.5, 0.0), &map).unwrap();
        let smile = mouth_curve_corner_lift(&face(4.5, 8.0), &map).unwrap();
        assert!(smile > neutral);
        // lift +6 over width 48 = 0.125 -> (0.175 / 0.25) -> 70
        assert_eq!(smile, 70);
    }

    #[test]
    fn zero_width_mouth_is_degenerate() {
        let mut r = regions(4.5, 0.0);
        r.mouth[6] = r.mouth[0];
        let f = LandmarkSet::from_regions(r).unwrap();
        let formulas = FormulaSet::default();
        assert_eq!(
            formulas.measure(Metric::MouthCurve, &f).unwrap_err(),
            ScoringError::DegenerateGeometry {
                metric: Metric::MouthCurve
            }
        );
    }

    #[test]
    fn zero_scale_calibration_rejected() {
        let mut formulas = FormulaSet::default();
        formulas.calibration.cheek_raise.scale = 0.0;
        assert!(matches!(
            formulas.validate(),
            Err(PolicyError::InvalidCalibration {
                name: "cheek_raise",
                ..
            })
        ));
        assert!(FormulaSet::default().validate().is_ok());
    }

    #[test]
    fn metric_set_serializes_with_wire_names() {
        let set = MetricSet::new()
            .with(Metric::EyeConstriction, 70)
            .with(Metric::CheekRaise, 60);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"{"eyeConstriction":70,"cheekRaise":60}"#);
    }

    #[test]
    fn metric_set_clamps_to_100() {
        let set = MetricSet::new().with(Metric::Symmetry, 250);
        assert_eq!(set.get(Metric::Symmetry), Some(100));
    }

    #[test]
    fn floor_keeps_exact_percentages() {
        assert_eq!(percent_floor(0.29), 29);
        assert_eq!(percent_floor(0.57), 57);
        assert_eq!(percent_floor(0.58), 58);
        assert_eq!(percent_floor(0.0), 0);
        assert_eq!(percent_floor(0.994), 99);
        assert_eq!(percent_floor(1.0 - 1e-12), 99);
        assert_eq!(percent_floor(1.0), 100);
    }

    #[test]
    fn symmetry_calibration_does_not_lose_a_point() {
        let cal = Calibration::default();
        // (0.084 - 0.2) / -0.2 * 100 is 57.99999999999999 in f64.
        assert_eq!(percent_floor(cal.feature_symmetry.apply(0.084)), 58);
        // (0.085 - 0.25) / -0.25 * 100 is 65.99999999999999 in f64.
        assert_eq!(percent_floor(cal.jaw_symmetry.apply(0.085)), 66);
    }

    #[test]
    fn misspelled_formula_keys_rejected() {
        let typo = "symetry = \"feature_offsets\"\n";
        assert!(toml::from_str::<FormulaSet>(typo).is_err());

        let table = "[calibration.eye_constrction]\noffset = 0.5\nscale = -0.1\n";
        assert!(toml::from_str::<FormulaSet>(table).is_err());

        let field = "[calibration.eye_constriction]\noffset = 0.5\nscal = -0.1\n";
        assert!(toml::from_str::<FormulaSet>(field).is_err());

        let ok = "symmetry = \"feature_offsets\"\n";
        assert_eq!(
            toml::from_str::<FormulaSet>(ok).unwrap().symmetry,
            SymmetryMethod::FeatureOffsets
        );
    }
}
