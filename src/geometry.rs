//! Joint geometry
//!
//! Pure functions turning a landmark frame into joint angles and body midpoints.
//! Shoulders and hips are mandatory; every other joint is optional and simply
//! drops its angle when it cannot be resolved.

use crate::landmarks::*;
use crate::types::{JointAngleSet, Point2};

/// Guard added to vector-norm products before dividing
pub const ANGLE_EPSILON: f64 = 1e-9;

/// Gain applied to the ear/shoulder horizontal offset for the neck proxy
const NECK_GAIN: f64 = 120.0;
const NECK_MAX_DEG: f64 = 60.0;

/// Gain applied to the shoulder height difference for the tilt proxy
const TILT_GAIN: f64 = 180.0;
const TILT_MAX_DEG: f64 = 30.0;

/// Midpoints of the paired landmarks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyMidpoints {
    pub shoulder: Point2,
    pub hip: Point2,
    /// Midpoint of both wrists, or the single visible wrist
    pub wrist: Option<Point2>,
    /// Midpoint of both wrists only; stays comparable across frames when one
    /// wrist flickers, so velocities are taken from this point
    pub paired_wrist: Option<Point2>,
    pub ear: Option<Point2>,
}

/// Angles and midpoints derived from one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameGeometry {
    pub angles: JointAngleSet,
    pub midpoints: BodyMidpoints,
}

/// Stateless geometry engine
pub struct GeometryEngine;

impl GeometryEngine {
    /// Derive angles and midpoints, or `None` if shoulders/hips are unavailable
    pub fn analyze(view: &FrameView<'_>) -> Option<FrameGeometry> {
        let midpoints = Self::midpoints(view)?;

        let left_shoulder = view.point(LEFT_SHOULDER)?;
        let right_shoulder = view.point(RIGHT_SHOULDER)?;

        let neck_flexion_deg = midpoints
            .ear
            .map(|ear| neck_flexion_proxy(ear, midpoints.shoulder))
            .unwrap_or(0.0);

        let angles = JointAngleSet {
            neck_flexion_deg,
            trunk_lean_deg: trunk_lean(midpoints.hip, midpoints.shoulder),
            shoulder_tilt_deg: shoulder_tilt_proxy(left_shoulder, right_shoulder),
            left_elbow_deg: limb_angle(view, LEFT_SHOULDER, LEFT_ELBOW, LEFT_WRIST),
            right_elbow_deg: limb_angle(view, RIGHT_SHOULDER, RIGHT_ELBOW, RIGHT_WRIST),
            left_knee_deg: limb_angle(view, LEFT_HIP, LEFT_KNEE, LEFT_ANKLE),
            right_knee_deg: limb_angle(view, RIGHT_HIP, RIGHT_KNEE, RIGHT_ANKLE),
        };

        Some(FrameGeometry { angles, midpoints })
    }

    /// Shoulder, hip, wrist and ear midpoints; `None` without both shoulders and hips
    pub fn midpoints(view: &FrameView<'_>) -> Option<BodyMidpoints> {
        let shoulder = view.pair_midpoint(LEFT_SHOULDER, RIGHT_SHOULDER)?;
        let hip = view.pair_midpoint(LEFT_HIP, RIGHT_HIP)?;

        let left_wrist = view.point(LEFT_WRIST);
        let right_wrist = view.point(RIGHT_WRIST);
        let paired_wrist = view.pair_midpoint(LEFT_WRIST, RIGHT_WRIST);

        Some(BodyMidpoints {
            shoulder,
            hip,
            wrist: paired_wrist.or(left_wrist).or(right_wrist),
            paired_wrist,
            ear: view.pair_midpoint(LEFT_EAR, RIGHT_EAR),
        })
    }
}

/// Angle at vertex `b` formed by `a-b-c`, in degrees (0-180)
pub fn angle_at_vertex(a: Point2, b: Point2, c: Point2) -> f64 {
    let ba = (a.x - b.x, a.y - b.y);
    let bc = (c.x - b.x, c.y - b.y);

    let dot = ba.0 * bc.0 + ba.1 * bc.1;
    let norms = (ba.0 * ba.0 + ba.1 * ba.1).sqrt() * (bc.0 * bc.0 + bc.1 * bc.1).sqrt();

    let cos_angle = (dot / (norms + ANGLE_EPSILON)).clamp(-1.0, 1.0);
    cos_angle.acos().to_degrees()
}

/// Deviation of hip→shoulder from the upward vertical, in degrees (0 = upright)
pub fn trunk_lean(hip_mid: Point2, shoulder_mid: Point2) -> f64 {
    // Image y grows downward, so "up" is (0, -1).
    let vx = shoulder_mid.x - hip_mid.x;
    let vy = shoulder_mid.y - hip_mid.y;
    if vx.hypot(vy) < ANGLE_EPSILON {
        // Coincident midpoints have no direction.
        return 90.0;
    }
    vx.abs().atan2(-vy).to_degrees()
}

/// Horizontal ear/shoulder offset scaled into a pseudo-angle (0-60)
pub fn neck_flexion_proxy(ear_mid: Point2, shoulder_mid: Point2) -> f64 {
    ((ear_mid.x - shoulder_mid.x).abs() * NECK_GAIN).clamp(0.0, NECK_MAX_DEG)
}

/// Shoulder height difference scaled into a pseudo-angle (0-30)
pub fn shoulder_tilt_proxy(left_shoulder: Point2, right_shoulder: Point2) -> f64 {
    ((left_shoulder.y - right_shoulder.y).abs() * TILT_GAIN).clamp(0.0, TILT_MAX_DEG)
}

fn limb_angle(view: &FrameView<'_>, proximal: usize, joint: usize, distal: usize) -> Option<f64> {
    Some(angle_at_vertex(
        view.point(proximal)?,
        view.point(joint)?,
        view.point(distal)?,
    ))
}
