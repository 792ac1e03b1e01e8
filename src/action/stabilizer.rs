//! Hysteresis stabilizer
//!
//! Keeps the emitted action label from flickering under noisy per-frame input.
//! The transition is a pure function of `(state, raw observation, now)` so it
//! can be driven by an injected clock.

use log::debug;

use crate::types::ActionResult;

/// Window after a label change during which the held label is protected
pub const HOLD_MS: f64 = 300.0;
/// Confidence lead a competing label needs to break the hold
pub const SWITCH_MARGIN: f64 = 0.12;
/// Weight of the held confidence when smoothing a repeated label
pub const HELD_WEIGHT: f64 = 0.7;

/// Stabilizer state: the held result and when it last changed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StabilizerState {
    held: Option<ActionResult>,
    last_change_ms: f64,
}

impl StabilizerState {
    pub fn held(&self) -> Option<&ActionResult> {
        self.held.as_ref()
    }

    pub fn last_change_ms(&self) -> f64 {
        self.last_change_ms
    }

    /// Apply one raw observation, returning the next state and the emitted result
    pub fn transition(&self, raw: ActionResult, now_ms: f64) -> (StabilizerState, ActionResult) {
        let held = match &self.held {
            Some(held) if now_ms - self.last_change_ms < HOLD_MS => held,
            _ => return Self::accept(raw, now_ms),
        };

        if raw.label == held.label {
            let smoothed = HELD_WEIGHT * held.confidence + (1.0 - HELD_WEIGHT) * raw.confidence;
            let emitted = ActionResult {
                label: held.label,
                confidence: raw.confidence.max(smoothed).clamp(0.0, 1.0),
                notes: raw.notes,
            };
            let next = StabilizerState {
                held: Some(emitted.clone()),
                last_change_ms: self.last_change_ms,
            };
            return (next, emitted);
        }

        if raw.confidence > held.confidence + SWITCH_MARGIN {
            return Self::accept(raw, now_ms);
        }

        debug!(
            "suppressed {} ({:.2}) while holding {} ({:.2})",
            raw.label.as_str(),
            raw.confidence,
            held.label.as_str(),
            held.confidence
        );
        (self.clone(), held.clone())
    }

    fn accept(raw: ActionResult, now_ms: f64) -> (StabilizerState, ActionResult) {
        let next = StabilizerState {
            held: Some(raw.clone()),
            last_change_ms: now_ms,
        };
        (next, raw)
    }
}

/// Owning wrapper that advances a [`StabilizerState`] in place
#[derive(Debug, Clone, Default)]
pub struct Stabilizer {
    state: StabilizerState,
}

impl Stabilizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, raw: ActionResult, now_ms: f64) -> ActionResult {
        let (next, emitted) = self.state.transition(raw, now_ms);
        self.state = next;
        emitted
    }

    pub fn state(&self) -> &StabilizerState {
        &self.state
    }

    pub fn reset(&mut self) {
        self.state = StabilizerState::default();
    }
}
