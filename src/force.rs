//! Dynamic force estimation
//!
//! Frame-to-frame intensity estimate combining how fast a tracked point moves
//! with the current lever index. One estimator belongs to one session; call
//! [`ForceEstimator::reset`] when the input source changes.

use crate::types::{ForceEstimate, Level, Point2};

/// Smallest time step used for velocity, in seconds
pub const MIN_DT_SEC: f64 = 0.016;

const SPEED_GAIN: f64 = 0.6;
const LEVER_SCALE: f64 = 2.0;
const COMPONENT_WEIGHT: f64 = 50.0;
const STATIC_LEVER_GAIN: f64 = 10.0;

const HIGH_FORCE: u32 = 70;
const MEDIUM_FORCE: u32 = 35;

/// Stateful force estimator
#[derive(Debug, Clone, Default)]
pub struct ForceEstimator {
    previous: Option<(Point2, f64)>,
}

impl ForceEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Estimate force for the tracked point at `now_ms`
    pub fn estimate(&mut self, point: Option<Point2>, lever_index: f64, now_ms: f64) -> ForceEstimate {
        let Some(current) = point else {
            self.reset();
            return ForceEstimate::idle();
        };

        let lever_index = if lever_index.is_finite() {
            lever_index.max(0.0)
        } else {
            0.0
        };

        let estimate = match self.previous {
            None => ForceEstimate {
                level: Level::Low,
                value: to_value(lever_index * STATIC_LEVER_GAIN),
            },
            Some((prev_point, prev_ms)) => {
                let dt = ((now_ms - prev_ms) / 1000.0).max(MIN_DT_SEC);
                let speed = current.distance_to(prev_point) / dt;
                let speed_norm = (speed * SPEED_GAIN).min(1.0);
                let lever_norm = (lever_index / LEVER_SCALE).min(1.0);
                let value = to_value(lever_norm * COMPONENT_WEIGHT + speed_norm * COMPONENT_WEIGHT);

                ForceEstimate {
                    level: level_for(value),
                    value,
                }
            }
        };

        self.previous = Some((current, now_ms));
        estimate
    }

    /// Forget the previous observation
    pub fn reset(&mut self) {
        self.previous = None;
    }

    pub fn has_history(&self) -> bool {
        self.previous.is_some()
    }
}

fn level_for(value: u32) -> Level {
    if value >= HIGH_FORCE {
        Level::High
    } else if value >= MEDIUM_FORCE {
        Level::Medium
    } else {
        Level::Low
    }
}

fn to_value(raw: f64) -> u32 {
    if raw.is_finite() {
        raw.round().clamp(0.0, 100.0) as u32
    } else {
        0
    }
}
