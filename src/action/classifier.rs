//! Action classifiers
//!
//! [`StaticActionClassifier`] scores a single image with no history.
//! [`TemporalActionClassifier`] adds motion-derived candidates (lifting,
//! clapping) and stabilizes the emitted label across frames. Its hidden state
//! belongs to one session and must be reset when the input source changes.

use log::debug;

use crate::action::candidates::{select, ActionCandidate, STATIC_SCORERS};
use crate::action::clap::ClapDetector;
use crate::action::features::{ramp, StaticFeatures};
use crate::action::stabilizer::Stabilizer;
use crate::force::MIN_DT_SEC;
use crate::landmarks::FrameView;
use crate::types::{ActionLabel, ActionResult, Point2};

/// Trunk lean ramp for Lifting, below the Bending ramp so a lift registers early
const LIFT_LEAN_START_DEG: f64 = 10.0;
const LIFT_LEAN_FULL_DEG: f64 = 30.0;

/// Capability shared by both classifier variants
pub trait ActionClassifier {
    /// Score every candidate label for one frame, or `None` without a usable pose
    fn candidates(&mut self, view: &FrameView<'_>, now_ms: f64) -> Option<Vec<ActionCandidate>>;

    /// Classify one frame
    fn classify(&mut self, view: &FrameView<'_>, now_ms: f64) -> Option<ActionResult>;

    /// Clear any hidden per-session state
    fn reset(&mut self);
}

/// Single-image classifier with no history
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticActionClassifier;

impl StaticActionClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl ActionClassifier for StaticActionClassifier {
    fn candidates(&mut self, view: &FrameView<'_>, _now_ms: f64) -> Option<Vec<ActionCandidate>> {
        let features = StaticFeatures::extract(view)?;
        Some(STATIC_SCORERS.iter().map(|score| score(&features)).collect())
    }

    fn classify(&mut self, view: &FrameView<'_>, now_ms: f64) -> Option<ActionResult> {
        self.candidates(view, now_ms).map(|c| select(c, 0.0))
    }

    fn reset(&mut self) {}
}

/// Previous-frame sample used for velocities
#[derive(Debug, Clone, Copy)]
struct MotionSample {
    hip_mid: Point2,
    wrist_mid: Option<Point2>,
    at_ms: f64,
}

/// Velocities between the previous and current frame
#[derive(Debug, Clone, Copy, Default)]
struct Motion {
    /// Upward hip speed (units/s); positive when rising
    hip_rise_speed: f64,
    /// Wrist midpoint speed (units/s)
    wrist_speed: f64,
}

/// Video/live classifier with motion candidates and label stabilization
#[derive(Debug, Clone, Default)]
pub struct TemporalActionClassifier {
    previous: Option<MotionSample>,
    clap: ClapDetector,
    stabilizer: Stabilizer,
    last_motion: f64,
}

impl TemporalActionClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify without stabilization (raw per-frame winner)
    pub fn classify_raw(&mut self, view: &FrameView<'_>, now_ms: f64) -> Option<ActionResult> {
        let candidates = self.candidates(view, now_ms)?;
        Some(select(candidates, self.last_motion))
    }

    pub fn clap_events(&self) -> usize {
        self.clap.event_count()
    }

    fn motion(&self, features: &StaticFeatures, now_ms: f64) -> Motion {
        let Some(prev) = self.previous else {
            return Motion::default();
        };
        let dt = ((now_ms - prev.at_ms) / 1000.0).max(MIN_DT_SEC);

        // Image y grows downward: rising means y decreases.
        let hip_rise_speed = (prev.hip_mid.y - features.midpoints.hip.y) / dt;
        let wrist_speed = match (prev.wrist_mid, features.midpoints.paired_wrist) {
            (Some(a), Some(b)) => a.distance_to(b) / dt,
            _ => 0.0,
        };

        Motion {
            hip_rise_speed,
            wrist_speed,
        }
    }
}

impl ActionClassifier for TemporalActionClassifier {
    fn candidates(&mut self, view: &FrameView<'_>, now_ms: f64) -> Option<Vec<ActionCandidate>> {
        let features = StaticFeatures::extract(view)?;
        let motion = self.motion(&features, now_ms);

        let rise = ramp(motion.hip_rise_speed, 0.05, 0.35);

        // Lifting leads so that it wins ties against Bending.
        let mut candidates = vec![ActionCandidate::new(
            ActionLabel::Lifting,
            rise * ramp(features.trunk_lean_deg, LIFT_LEAN_START_DEG, LIFT_LEAN_FULL_DEG),
            format!("hips rising {:.2}/s while bent", motion.hip_rise_speed.max(0.0)),
        )];
        candidates.extend(STATIC_SCORERS.iter().map(|score| score(&features)));

        let clap_confidence = self.clap.observe(features.wrist_gap(), now_ms);
        candidates.push(ActionCandidate::new(
            ActionLabel::Clapping,
            clap_confidence,
            format!("{} hand contacts in window", self.clap.event_count()),
        ));

        self.last_motion = ramp(motion.wrist_speed, 0.10, 0.60);
        self.previous = Some(MotionSample {
            hip_mid: features.midpoints.hip,
            wrist_mid: features.midpoints.paired_wrist,
            at_ms: now_ms,
        });

        Some(candidates)
    }

    fn classify(&mut self, view: &FrameView<'_>, now_ms: f64) -> Option<ActionResult> {
        let raw = self.classify_raw(view, now_ms)?;
        Some(self.stabilizer.observe(raw, now_ms))
    }

    fn reset(&mut self) {
        debug!("temporal action classifier reset");
        self.previous = None;
        self.clap.reset();
        self.stabilizer.reset();
        self.last_motion = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::fixtures::FrameBuilder;
    use crate::landmarks::*;
    use crate::types::LandmarkFrame;

    fn classify_static(frame: &LandmarkFrame) -> ActionResult {
        StaticActionClassifier::new()
            .classify(&FrameView::from(frame), 0.0)
            .unwrap()
    }

    /// Neutral pose with the wrists `gap` shoulder widths apart at chest height
    fn hands_apart(gap: f64) -> LandmarkFrame {
        let half = gap * 0.2 / 2.0;
        FrameBuilder::neutral()
            .set(LEFT_WRIST, 0.5 - half, 0.4)
            .set(RIGHT_WRIST, 0.5 + half, 0.4)
            .build()
    }

    /// Trunk leaning forward ~45° with hips at `hip_y`
    fn bent_over(hip_y: f64) -> LandmarkFrame {
        FrameBuilder::neutral()
            .set(LEFT_SHOULDER, 0.6, hip_y - 0.2)
            .set(RIGHT_SHOULDER, 0.8, hip_y - 0.2)
            .set(LEFT_HIP, 0.42, hip_y)
            .set(RIGHT_HIP, 0.58, hip_y)
            .set(LEFT_WRIST, 0.65, hip_y)
            .set(RIGHT_WRIST, 0.75, hip_y)
            .build()
    }

    #[test]
    fn test_static_neutral_is_holding() {
        let result = classify_static(&FrameBuilder::neutral().build());
        assert_eq!(result.label, ActionLabel::HoldingStatic);
    }

    #[test]
    fn test_static_overhead() {
        let frame = FrameBuilder::neutral()
            .set(LEFT_WRIST, 0.4, 0.05)
            .set(RIGHT_WRIST, 0.6, 0.05)
            .build();
        let result = classify_static(&frame);
        assert_eq!(result.label, ActionLabel::OverheadReach);
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_static_reaching() {
        let frame = FrameBuilder::neutral().set(RIGHT_WRIST, 1.0, 0.3).build();
        let result = classify_static(&frame);
        assert_eq!(result.label, ActionLabel::Reaching);
        assert!((result.confidence - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_static_bending() {
        let result = classify_static(&bent_over(0.6));
        assert_eq!(result.label, ActionLabel::Bending);
    }

    #[test]
    fn test_static_without_pose() {
        let frame = FrameBuilder::neutral().hide(LEFT_HIP).build();
        assert!(StaticActionClassifier::new()
            .classify(&FrameView::from(&frame), 0.0)
            .is_none());
    }

    #[test]
    fn test_temporal_detects_clapping() {
        let mut classifier = TemporalActionClassifier::new();
        let open = hands_apart(2.0);
        let closed = hands_apart(0.3);

        let mut last = None;
        for (frame, t) in [(&open, 0.0), (&closed, 100.0), (&open, 200.0), (&closed, 400.0)] {
            last = classifier.classify(&FrameView::from(frame), t);
        }

        assert_eq!(classifier.clap_events(), 2);
        let result = last.unwrap();
        assert_eq!(result.label, ActionLabel::Clapping);
        assert!(result.confidence >= 0.65);
    }

    #[test]
    fn test_temporal_detects_lifting() {
        let mut classifier = TemporalActionClassifier::new();
        classifier.classify_raw(&FrameView::from(&bent_over(0.7)), 0.0);

        // Hips rise 0.1 in 200 ms = 0.5/s while bent ~45°
        let raw = classifier
            .classify_raw(&FrameView::from(&bent_over(0.6)), 200.0)
            .unwrap();
        assert_eq!(raw.label, ActionLabel::Lifting);
        assert!(raw.confidence > 0.9);
    }

    #[test]
    fn test_temporal_lifting_at_moderate_lean() {
        // Trunk lean ~27°: Bending ramp 0.4, Lifting ramp 0.85
        let stooped = |hip_y: f64| {
            FrameBuilder::neutral()
                .set(LEFT_SHOULDER, 0.5, hip_y - 0.3)
                .set(RIGHT_SHOULDER, 0.7, hip_y - 0.3)
                .set(LEFT_HIP, 0.37, hip_y)
                .set(RIGHT_HIP, 0.53, hip_y)
                .build()
        };
        let mut classifier = TemporalActionClassifier::new();
        classifier.classify_raw(&FrameView::from(&stooped(0.7)), 0.0);

        let raw = classifier
            .classify_raw(&FrameView::from(&stooped(0.6)), 200.0)
            .unwrap();
        assert_eq!(raw.label, ActionLabel::Lifting);
    }

    #[test]
    fn test_temporal_bending_matches_static() {
        let bent = bent_over(0.6);
        let mut temporal = TemporalActionClassifier::new();
        temporal.candidates(&FrameView::from(&bent_over(0.7)), 0.0);
        let temporal_candidates = temporal.candidates(&FrameView::from(&bent), 200.0).unwrap();
        let static_candidates = StaticActionClassifier::new()
            .candidates(&FrameView::from(&bent), 200.0)
            .unwrap();

        let bending = |candidates: &[ActionCandidate]| {
            candidates
                .iter()
                .find(|c| c.label == ActionLabel::Bending)
                .map(|c| c.score)
        };
        assert_eq!(bending(&temporal_candidates), bending(&static_candidates));
        assert_eq!(bending(&static_candidates), Some(1.0));
    }

    #[test]
    fn test_wrist_flicker_is_not_motion() {
        let mut classifier = TemporalActionClassifier::new();
        let still = FrameBuilder::neutral().build();
        let flicker = FrameBuilder::neutral().hide(LEFT_WRIST).build();

        classifier.classify_raw(&FrameView::from(&still), 0.0);
        classifier.classify_raw(&FrameView::from(&flicker), 33.0);
        assert_eq!(classifier.last_motion, 0.0);

        let raw = classifier
            .classify_raw(&FrameView::from(&still), 66.0)
            .unwrap();
        assert_eq!(classifier.last_motion, 0.0);
        assert_eq!(raw.label, ActionLabel::HoldingStatic);
    }

    #[test]
    fn test_temporal_reset_clears_state() {
        let mut classifier = TemporalActionClassifier::new();
        let open = hands_apart(2.0);
        let closed = hands_apart(0.3);
        classifier.classify(&FrameView::from(&open), 0.0);
        classifier.classify(&FrameView::from(&closed), 100.0);
        assert_eq!(classifier.clap_events(), 1);

        classifier.reset();
        assert_eq!(classifier.clap_events(), 0);

        // A fresh session accepts whatever comes first
        let result = classifier
            .classify(&FrameView::from(&FrameBuilder::neutral().build()), 110.0)
            .unwrap();
        assert_eq!(result.label, ActionLabel::HoldingStatic);
    }
}
