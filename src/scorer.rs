//! Posture scoring
//!
//! Maps a joint angle set to a ranked issue list, an ErgoScore and a risk tier.
//! Each angle family yields at most one issue; HIGH thresholds are checked
//! before MILD ones. Issue order is evaluation order (neck, trunk, shoulder,
//! elbow) and is never re-sorted.

use crate::types::{JointAngleSet, Level, PostureIssue, PostureReport, Severity};

/// Score every frame starts from
pub const MAX_SCORE: u32 = 100;

const NECK_MILD_DEG: f64 = 20.0;
const NECK_HIGH_DEG: f64 = 35.0;

const TRUNK_MILD_DEG: f64 = 10.0;
const TRUNK_HIGH_DEG: f64 = 20.0;

const SHOULDER_MILD_DEG: f64 = 12.0;
const SHOULDER_HIGH_DEG: f64 = 18.0;

/// Comfortable elbow range; anything outside is a MILD issue
const ELBOW_MIN_DEG: f64 = 75.0;
const ELBOW_MAX_DEG: f64 = 135.0;

/// Rule-table posture scorer
pub struct PostureScorer;

impl PostureScorer {
    /// Score a set of angles. Angles are passed through unchanged.
    pub fn score(angles: JointAngleSet) -> PostureReport {
        let issues: Vec<PostureIssue> = [
            neck_issue(angles.neck_flexion_deg),
            trunk_issue(angles.trunk_lean_deg),
            shoulder_issue(angles.shoulder_tilt_deg),
            elbow_issue(angles.left_elbow_deg, angles.right_elbow_deg),
        ]
        .into_iter()
        .flatten()
        .collect();

        let score = score_issues(&issues);

        PostureReport {
            score,
            risk: Level::from_score(score),
            angles,
            issues,
        }
    }
}

/// `clamp(100 - sum(penalties), 0, 100)`
pub fn score_issues(issues: &[PostureIssue]) -> u32 {
    let penalty: u32 = issues.iter().map(|i| i.severity.penalty()).sum();
    MAX_SCORE.saturating_sub(penalty)
}

/// Severity for a single angle given ascending MILD/HIGH thresholds
fn classify(value: f64, mild: f64, high: f64) -> Severity {
    if value >= high {
        Severity::High
    } else if value >= mild {
        Severity::Mild
    } else {
        Severity::Ok
    }
}

fn neck_issue(neck_deg: f64) -> Option<PostureIssue> {
    let severity = classify(neck_deg, NECK_MILD_DEG, NECK_HIGH_DEG);
    if severity == Severity::Ok {
        return None;
    }
    Some(PostureIssue {
        id: "neck_flexion".to_string(),
        title: "Forward head posture".to_string(),
        severity,
        measured: format!("Neck flexion ≈ {}°", neck_deg.round()),
        why_it_matters: "Every degree the head drifts forward multiplies the load carried by \
                         the neck extensors and upper back."
            .to_string(),
        fix: "Raise the screen or work surface to eye level and tuck the chin so the ears \
              sit over the shoulders."
            .to_string(),
    })
}

fn trunk_issue(trunk_deg: f64) -> Option<PostureIssue> {
    let severity = classify(trunk_deg, TRUNK_MILD_DEG, TRUNK_HIGH_DEG);
    if severity == Severity::Ok {
        return None;
    }
    Some(PostureIssue {
        id: "trunk_lean".to_string(),
        title: "Trunk lean".to_string(),
        severity,
        measured: format!("Trunk lean ≈ {}°", trunk_deg.round()),
        why_it_matters: "Leaning the torso away from vertical lengthens the lever arm on the \
                         lower back and raises disc pressure."
            .to_string(),
        fix: "Bring the work closer, hinge at the hips instead of the waist and keep the \
              chest over the pelvis."
            .to_string(),
    })
}

fn shoulder_issue(tilt_deg: f64) -> Option<PostureIssue> {
    let severity = classify(tilt_deg, SHOULDER_MILD_DEG, SHOULDER_HIGH_DEG);
    if severity == Severity::Ok {
        return None;
    }
    Some(PostureIssue {
        id: "shoulder_tilt".to_string(),
        title: "Uneven shoulders".to_string(),
        severity,
        measured: format!("Shoulder tilt ≈ {}°", tilt_deg.round()),
        why_it_matters: "A dropped or hiked shoulder loads one side of the neck and spine \
                         asymmetrically."
            .to_string(),
        fix: "Level the armrests or work height and avoid carrying or leaning on one side."
            .to_string(),
    })
}

fn elbow_issue(left_deg: Option<f64>, right_deg: Option<f64>) -> Option<PostureIssue> {
    let out_of_range = |deg: f64| !(ELBOW_MIN_DEG..=ELBOW_MAX_DEG).contains(&deg);

    let flagged: Vec<String> = [("left", left_deg), ("right", right_deg)]
        .into_iter()
        .filter_map(|(side, deg)| deg.filter(|d| out_of_range(*d)).map(|d| (side, d)))
        .map(|(side, d)| format!("{side} elbow ≈ {}°", d.round()))
        .collect();

    if flagged.is_empty() {
        return None;
    }

    Some(PostureIssue {
        id: "elbow_angle".to_string(),
        title: "Elbow angle outside neutral range".to_string(),
        severity: Severity::Mild,
        measured: flagged.join(", "),
        why_it_matters: "Working with the elbows far from roughly 90° strains the forearm \
                         and shoulder muscles over time."
            .to_string(),
        fix: "Adjust desk or tool height so the elbows rest close to the body at about 90°."
            .to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn neutral_angles() -> JointAngleSet {
        JointAngleSet {
            neck_flexion_deg: 0.0,
            trunk_lean_deg: 0.0,
            shoulder_tilt_deg: 0.0,
            left_elbow_deg: Some(90.0),
            right_elbow_deg: Some(90.0),
            left_knee_deg: Some(180.0),
            right_knee_deg: Some(180.0),
        }
    }

    #[test]
    fn test_neutral_posture_scores_100() {
        let report = PostureScorer::score(neutral_angles());
        assert!(report.issues.is_empty());
        assert_eq!(report.score, 100);
        assert_eq!(report.risk, Level::Low);
        assert_eq!(report.angles, neutral_angles());
    }

    #[test]
    fn test_high_neck_issue_keeps_low_risk() {
        // A single HIGH issue scores 82, which still lands in the Low tier.
        let angles = JointAngleSet {
            neck_flexion_deg: 36.0,
            ..neutral_angles()
        };
        let report = PostureScorer::score(angles);

        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].id, "neck_flexion");
        assert_eq!(report.issues[0].severity, Severity::High);
        assert_eq!(report.issues[0].measured, "Neck flexion ≈ 36°");
        assert_eq!(report.score, 82);
        assert_eq!(report.risk, Level::Low);
    }

    #[test]
    fn test_threshold_boundaries() {
        assert_eq!(classify(19.99, NECK_MILD_DEG, NECK_HIGH_DEG), Severity::Ok);
        assert_eq!(classify(20.0, NECK_MILD_DEG, NECK_HIGH_DEG), Severity::Mild);
        assert_eq!(classify(35.0, NECK_MILD_DEG, NECK_HIGH_DEG), Severity::High);
        assert_eq!(classify(10.0, TRUNK_MILD_DEG, TRUNK_HIGH_DEG), Severity::Mild);
        assert_eq!(classify(18.0, SHOULDER_MILD_DEG, SHOULDER_HIGH_DEG), Severity::High);
    }

    #[test]
    fn test_issue_order_is_evaluation_order() {
        let angles = JointAngleSet {
            neck_flexion_deg: 22.0,
            trunk_lean_deg: 25.0,
            shoulder_tilt_deg: 13.0,
            left_elbow_deg: Some(150.0),
            right_elbow_deg: Some(90.0),
            ..neutral_angles()
        };
        let report = PostureScorer::score(angles);
        let ids: Vec<&str> = report.issues.iter().map(|i| i.id.as_str()).collect();

        assert_eq!(ids, vec!["neck_flexion", "trunk_lean", "shoulder_tilt", "elbow_angle"]);
        // 100 - 9 - 18 - 9 - 9
        assert_eq!(report.score, 55);
        assert_eq!(report.risk, Level::Medium);
    }

    #[test]
    fn test_elbow_issue_lists_both_sides_once() {
        let angles = JointAngleSet {
            left_elbow_deg: Some(60.0),
            right_elbow_deg: Some(160.0),
            ..neutral_angles()
        };
        let report = PostureScorer::score(angles);

        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].severity, Severity::Mild);
        assert_eq!(report.issues[0].measured, "left elbow ≈ 60°, right elbow ≈ 160°");
        assert_eq!(report.score, 91);
    }

    #[test]
    fn test_missing_elbows_raise_nothing() {
        let angles = JointAngleSet {
            left_elbow_deg: None,
            right_elbow_deg: None,
            ..neutral_angles()
        };
        assert!(PostureScorer::score(angles).issues.is_empty());
    }

    #[test]
    fn test_score_formula_and_clamp() {
        let worst = JointAngleSet {
            neck_flexion_deg: 60.0,
            trunk_lean_deg: 80.0,
            shoulder_tilt_deg: 30.0,
            left_elbow_deg: Some(10.0),
            right_elbow_deg: None,
            ..neutral_angles()
        };
        let report = PostureScorer::score(worst);
        let highs = report.issues.iter().filter(|i| i.severity == Severity::High).count() as i64;
        let milds = report.issues.iter().filter(|i| i.severity == Severity::Mild).count() as i64;

        let expected = (100 - 18 * highs - 9 * milds).clamp(0, 100) as u32;
        assert_eq!(report.score, expected);
        assert_eq!(report.score, 37);
        assert_eq!(report.risk, Level::High);
    }
}
