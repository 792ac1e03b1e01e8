//! Per-frame report assembly
//!
//! Pure composition of the posture report, lever metrics, force estimate and
//! action result into the value serialized for presentation and export. Field
//! order is fixed: score, risk, angles, issues, lever, action.

use serde::{Deserialize, Serialize};

use crate::types::{
    ActionResult, ForceEstimate, JointAngleSet, Level, LeverMetrics, PostureIssue, PostureReport,
    Severity,
};

/// Lever metrics extended with the dynamic force estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeverReport {
    #[serde(flatten)]
    pub metrics: LeverMetrics,
    pub force: ForceEstimate,
}

/// Complete ergonomic assessment for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub score: u32,
    pub risk: Level,
    pub angles: JointAngleSet,
    pub issues: Vec<PostureIssue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lever: Option<LeverReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionResult>,
}

impl FrameReport {
    /// True when any issue is rated HIGH
    pub fn has_high_issue(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::High)
    }
}

/// Stateless report composer
pub struct ReportAssembler;

impl ReportAssembler {
    pub fn assemble(
        posture: PostureReport,
        lever: Option<LeverMetrics>,
        force: Option<ForceEstimate>,
        action: Option<ActionResult>,
    ) -> FrameReport {
        let lever = lever.map(|metrics| LeverReport {
            metrics,
            force: force.unwrap_or_else(ForceEstimate::idle),
        });

        FrameReport {
            score: posture.score,
            risk: posture.risk,
            angles: posture.angles,
            issues: posture.issues,
            lever,
            action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::fixtures::FrameBuilder;
    use crate::landmarks::FrameView;
    use crate::lever::LeverBiomechanicsEngine;
    use crate::scorer::PostureScorer;
    use crate::types::ActionLabel;
    use pretty_assertions::assert_eq;

    fn neutral_posture() -> PostureReport {
        PostureScorer::score(JointAngleSet::default())
    }

    #[test]
    fn test_posture_only_report() {
        let report = ReportAssembler::assemble(neutral_posture(), None, None, None);
        assert_eq!(report.score, 100);
        assert_eq!(report.risk, Level::Low);

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("lever").is_none());
        assert!(json.get("action").is_none());
    }

    #[test]
    fn test_field_order_is_stable() {
        let frame = FrameBuilder::neutral().build();
        let lever = LeverBiomechanicsEngine::analyze(&FrameView::from(&frame));
        let action = ActionResult::new(ActionLabel::Reaching, 0.8);
        let report = ReportAssembler::assemble(neutral_posture(), lever, None, Some(action));

        let json = serde_json::to_string(&report).unwrap();
        let positions: Vec<usize> = ["\"score\"", "\"risk\"", "\"angles\"", "\"issues\"", "\"lever\"", "\"action\""]
            .iter()
            .map(|key| json.find(key).unwrap())
            .collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn test_lever_is_flattened_with_force() {
        let frame = FrameBuilder::neutral().build();
        let lever = LeverBiomechanicsEngine::analyze(&FrameView::from(&frame));
        let force = ForceEstimate {
            level: Level::Medium,
            value: 40,
        };
        let report = ReportAssembler::assemble(neutral_posture(), lever, Some(force), None);

        let json = serde_json::to_value(&report).unwrap();
        let lever = &json["lever"];
        assert!(lever["shoulderMomentIndex"].is_number());
        assert_eq!(lever["force"]["level"], "Medium");
        assert_eq!(lever["force"]["value"], 40);
    }

    #[test]
    fn test_missing_force_defaults_to_idle() {
        let frame = FrameBuilder::neutral().build();
        let lever = LeverBiomechanicsEngine::analyze(&FrameView::from(&frame));
        let report = ReportAssembler::assemble(neutral_posture(), lever, None, None);
        assert_eq!(report.lever.unwrap().force, ForceEstimate::idle());
    }
}
