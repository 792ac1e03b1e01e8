//! Lever biomechanics
//!
//! Derives shoulder and low-back moment indices from body midpoints. The indices
//! are leverage proxies in normalized-frame units: real limb lengths and camera
//! calibration are unavailable, so no physical torque is implied.

use crate::geometry::{BodyMidpoints, GeometryEngine};
use crate::landmarks::FrameView;
use crate::types::{Level, LeverMetrics, LeverPoints};

const SHOULDER_MOMENT_GAIN: f64 = 10.0;
const LOW_BACK_MOMENT_GAIN: f64 = 12.0;
const STRAIN_GAIN: f64 = 60.0;
const STRAIN_MAX: f64 = 100.0;

/// Summed reach + torso distance above which strain is High
const HIGH_STRAIN_DISTANCE: f64 = 1.0;
/// Shoulder reach above which strain is Medium
const MEDIUM_STRAIN_REACH: f64 = 0.4;

/// Stateless lever engine
pub struct LeverBiomechanicsEngine;

impl LeverBiomechanicsEngine {
    /// Compute lever metrics directly from a frame
    pub fn analyze(view: &FrameView<'_>) -> Option<LeverMetrics> {
        GeometryEngine::midpoints(view).map(|m| Self::from_midpoints(&m))
    }

    /// Compute lever metrics from already-derived midpoints.
    ///
    /// Without a visible wrist the reach collapses to zero (wrist = shoulder midpoint).
    pub fn from_midpoints(midpoints: &BodyMidpoints) -> LeverMetrics {
        let shoulder_mid = midpoints.shoulder;
        let hip_mid = midpoints.hip;
        let wrist_mid = midpoints.wrist.unwrap_or(shoulder_mid);

        let reach = wrist_mid.distance_to(shoulder_mid);
        let torso = shoulder_mid.distance_to(hip_mid);
        let combined = reach + torso;

        let strain_level = if combined > HIGH_STRAIN_DISTANCE {
            Level::High
        } else if reach > MEDIUM_STRAIN_REACH {
            Level::Medium
        } else {
            Level::Low
        };

        LeverMetrics {
            shoulder_moment_index: reach * SHOULDER_MOMENT_GAIN,
            low_back_moment_index: torso * LOW_BACK_MOMENT_GAIN,
            strain_index: (combined * STRAIN_GAIN).min(STRAIN_MAX),
            strain_level,
            points: LeverPoints {
                shoulder_mid,
                hip_mid,
                wrist_mid,
            },
        }
    }
}
