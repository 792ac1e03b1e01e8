//! Clap event detection
//!
//! Clapping is detected from discrete contact events rather than a per-frame
//! score. An event is logged when the wrists are close (relative to shoulder
//! width) and were closing fast, debounced so one contact is not counted twice.
//! Two or more events inside the rolling window make a clap.

use std::collections::VecDeque;

use log::debug;

use crate::force::MIN_DT_SEC;

/// Normalized inter-wrist distance below which the hands are in contact
pub const CONTACT_THRESHOLD: f64 = 0.65;
/// Closing speed (shoulder widths per second) required for a contact event
pub const APPROACH_VELOCITY: f64 = 1.8;
/// Minimum spacing between logged events
pub const DEBOUNCE_MS: f64 = 180.0;
/// Rolling window for counting events
pub const EVENT_WINDOW_MS: f64 = 1200.0;

const BASE_CONFIDENCE: f64 = 0.65;
const CONFIDENCE_PER_EXTRA_EVENT: f64 = 0.15;

/// Rolling clap event detector
#[derive(Debug, Clone, Default)]
pub struct ClapDetector {
    /// Previous normalized inter-wrist distance and its timestamp
    previous: Option<(f64, f64)>,
    /// Timestamps of logged contact events
    events: VecDeque<f64>,
    last_event_ms: Option<f64>,
}

impl ClapDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one frame and return the current clap confidence (0-1).
    ///
    /// `wrist_gap` is the inter-wrist distance in shoulder widths, `None` when
    /// either wrist is missing.
    pub fn observe(&mut self, wrist_gap: Option<f64>, now_ms: f64) -> f64 {
        self.evict(now_ms);

        match wrist_gap.filter(|g| g.is_finite()) {
            Some(gap) => {
                if let Some((prev_gap, prev_ms)) = self.previous {
                    let dt = ((now_ms - prev_ms) / 1000.0).max(MIN_DT_SEC);
                    let closing_velocity = (prev_gap - gap) / dt;

                    let debounced = self
                        .last_event_ms
                        .map_or(true, |last| now_ms - last >= DEBOUNCE_MS);

                    if gap < CONTACT_THRESHOLD && closing_velocity > APPROACH_VELOCITY && debounced {
                        debug!(
                            "clap contact at {now_ms:.0}ms (gap {gap:.2}, closing {closing_velocity:.2}/s)"
                        );
                        self.events.push_back(now_ms);
                        self.last_event_ms = Some(now_ms);
                    }
                }
                self.previous = Some((gap, now_ms));
            }
            None => self.previous = None,
        }

        self.confidence()
    }

    /// Clap confidence from the events currently in the window
    pub fn confidence(&self) -> f64 {
        let count = self.events.len();
        if count < 2 {
            return 0.0;
        }
        (BASE_CONFIDENCE + CONFIDENCE_PER_EXTRA_EVENT * (count - 2) as f64).clamp(0.0, 1.0)
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn reset(&mut self) {
        self.previous = None;
        self.events.clear();
        self.last_event_ms = None;
    }

    fn evict(&mut self, now_ms: f64) {
        while let Some(&oldest) = self.events.front() {
            if now_ms - oldest > EVENT_WINDOW_MS {
                self.events.pop_front();
            } else {
                break;
            }
        }
    }
}
