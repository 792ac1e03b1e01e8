//! Candidate action scoring
//!
//! Every candidate label has its own scoring function returning an
//! [`ActionCandidate`]. Classification sorts the candidates by score, so adding a
//! label only means adding a scorer.

use crate::action::features::{ramp, StaticFeatures};
use crate::types::{ActionLabel, ActionResult};

/// Best score below which the result falls back to Holding/Static
pub const CONFIDENCE_FLOOR: f64 = 0.35;
/// Confidence reported for the low-confidence fallback
pub const FALLBACK_CONFIDENCE: f64 = 0.6;
/// Weight of the residual stillness candidate.
///
/// A detected hold therefore tops out at 0.5, below [`FALLBACK_CONFIDENCE`].
/// The two are told apart by their notes, not by confidence: the fallback
/// confidence is a fixed report value, not a score.
const STILLNESS_WEIGHT: f64 = 0.5;

/// One scored label for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct ActionCandidate {
    pub label: ActionLabel,
    /// Score (0-1)
    pub score: f64,
    pub notes: String,
}

impl ActionCandidate {
    pub fn new(label: ActionLabel, score: f64, notes: impl Into<String>) -> Self {
        Self {
            label,
            score: if score.is_finite() {
                score.clamp(0.0, 1.0)
            } else {
                0.0
            },
            notes: notes.into(),
        }
    }
}

/// Scorer signature for single-frame candidates
pub type CandidateScorer = fn(&StaticFeatures) -> ActionCandidate;

/// Candidates computed from a single frame, in tie-break order
pub const STATIC_SCORERS: [CandidateScorer; 4] = [
    score_overhead_reach,
    score_bending,
    score_twisting,
    score_reaching,
];

pub fn score_overhead_reach(f: &StaticFeatures) -> ActionCandidate {
    ActionCandidate::new(
        ActionLabel::OverheadReach,
        ramp(f.overhead_ratio, 0.10, 0.50),
        format!("wrist {:.2} torso lengths above shoulders", f.overhead_ratio.max(0.0)),
    )
}

pub fn score_bending(f: &StaticFeatures) -> ActionCandidate {
    ActionCandidate::new(
        ActionLabel::Bending,
        ramp(f.trunk_lean_deg, 15.0, 45.0),
        format!("trunk lean {:.0}°", f.trunk_lean_deg),
    )
}

pub fn score_twisting(f: &StaticFeatures) -> ActionCandidate {
    ActionCandidate::new(
        ActionLabel::Twisting,
        ramp(f.twist, 0.25, 0.55),
        format!("shoulder/hip width mismatch {:.0}%", f.twist * 100.0),
    )
}

pub fn score_reaching(f: &StaticFeatures) -> ActionCandidate {
    ActionCandidate::new(
        ActionLabel::Reaching,
        ramp(f.reach, 1.20, 2.20),
        format!("reach {:.2} shoulder widths", f.reach),
    )
}

/// Residual stillness: high when nothing else scores and the body is not moving
pub fn score_stillness(others: &[ActionCandidate], motion: f64) -> ActionCandidate {
    let strongest = others.iter().map(|c| c.score).fold(0.0_f64, f64::max);
    let motion = motion.clamp(0.0, 1.0);
    ActionCandidate::new(
        ActionLabel::HoldingStatic,
        STILLNESS_WEIGHT * (1.0 - strongest) * (1.0 - motion),
        "no dominant movement",
    )
}

/// Pick the best candidate, appending the residual stillness candidate first.
///
/// Candidates are sorted by descending score; ties keep scorer order.
pub fn select(mut candidates: Vec<ActionCandidate>, motion: f64) -> ActionResult {
    let stillness = score_stillness(&candidates, motion);
    candidates.push(stillness);
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

    match candidates.into_iter().next() {
        Some(best) if best.score >= CONFIDENCE_FLOOR => {
            ActionResult::new(best.label, best.score).with_notes(best.notes)
        }
        _ => fallback(),
    }
}

/// Low-confidence floor result: not a real detection
pub fn fallback() -> ActionResult {
    ActionResult::new(ActionLabel::HoldingStatic, FALLBACK_CONFIDENCE)
        .with_notes("low confidence; defaulting to static hold")
}
