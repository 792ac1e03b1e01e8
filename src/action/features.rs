//! Per-frame action features
//!
//! Static measurements used by every candidate scorer, plus the clamped linear
//! ramp that turns a feature into a [0,1] score.

use crate::geometry::{trunk_lean, BodyMidpoints, GeometryEngine};
use crate::landmarks::*;
use crate::types::Point2;

/// Guard for width/length denominators
const WIDTH_EPSILON: f64 = 1e-6;

/// Linear ramp from 0 at `lo` to 1 at `hi`, clamped
pub fn ramp(value: f64, lo: f64, hi: f64) -> f64 {
    if !value.is_finite() || hi <= lo {
        return 0.0;
    }
    ((value - lo) / (hi - lo)).clamp(0.0, 1.0)
}

/// Single-frame pose features for action scoring
#[derive(Debug, Clone, PartialEq)]
pub struct StaticFeatures {
    pub midpoints: BodyMidpoints,
    pub left_wrist: Option<Point2>,
    pub right_wrist: Option<Point2>,
    pub shoulder_width: f64,
    pub hip_width: f64,
    /// Largest same-side shoulder-to-wrist distance, in shoulder widths
    pub reach: f64,
    pub trunk_lean_deg: f64,
    /// Height of the highest wrist above the shoulder line, in torso lengths
    pub overhead_ratio: f64,
    /// Relative shoulder/hip width mismatch (0 = equal widths)
    pub twist: f64,
}

impl StaticFeatures {
    /// Extract features, or `None` when shoulders/hips are unresolvable
    pub fn extract(view: &FrameView<'_>) -> Option<Self> {
        let midpoints = GeometryEngine::midpoints(view)?;
        let left_shoulder = view.point(LEFT_SHOULDER)?;
        let right_shoulder = view.point(RIGHT_SHOULDER)?;
        let shoulder_width = left_shoulder.distance_to(right_shoulder);
        let hip_width = view.pair_width(LEFT_HIP, RIGHT_HIP)?;

        let left_wrist = view.point(LEFT_WRIST);
        let right_wrist = view.point(RIGHT_WRIST);

        let reach = [(left_shoulder, left_wrist), (right_shoulder, right_wrist)]
            .into_iter()
            .filter_map(|(shoulder, wrist)| wrist.map(|w| w.distance_to(shoulder)))
            .fold(0.0_f64, f64::max)
            / shoulder_width.max(WIDTH_EPSILON);

        let torso = midpoints.shoulder.distance_to(midpoints.hip);
        let overhead_ratio = [left_wrist, right_wrist]
            .into_iter()
            .flatten()
            .map(|w| (midpoints.shoulder.y - w.y) / torso.max(WIDTH_EPSILON))
            .fold(f64::NEG_INFINITY, f64::max);
        let overhead_ratio = if overhead_ratio.is_finite() {
            overhead_ratio
        } else {
            0.0
        };

        let twist =
            (shoulder_width - hip_width).abs() / shoulder_width.max(hip_width).max(WIDTH_EPSILON);

        Some(Self {
            midpoints,
            left_wrist,
            right_wrist,
            shoulder_width,
            hip_width,
            reach,
            trunk_lean_deg: trunk_lean(midpoints.hip, midpoints.shoulder),
            overhead_ratio,
            twist,
        })
    }

    /// Distance between the wrists in shoulder widths, when both are visible
    pub fn wrist_gap(&self) -> Option<f64> {
        let gap = self.left_wrist?.distance_to(self.right_wrist?);
        (self.shoulder_width > WIDTH_EPSILON).then(|| gap / self.shoulder_width)
    }
}
