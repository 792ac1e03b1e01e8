//! Core types for the Ergo Flux pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: landmark input, joint angles, posture issues and reports, lever
//! metrics, action results and force estimates.
//!
//! Serialized field names are camelCase because the per-frame report is handed
//! verbatim to presentation and export consumers.

use serde::{Deserialize, Serialize};

/// A single body landmark as produced by the upstream pose model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandmarkPoint {
    /// Horizontal position, normalized to frame width (0-1)
    pub x: f64,
    /// Vertical position, normalized to frame height (0-1, grows downward)
    pub y: f64,
    /// Optional relative depth proxy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    /// Optional detection confidence (0-1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f64>,
}

impl LandmarkPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            visibility: None,
        }
    }

    pub fn with_visibility(mut self, visibility: f64) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub fn with_depth(mut self, z: f64) -> Self {
        self.z = Some(z);
        self
    }

    /// Whether this landmark can be used given a minimum visibility.
    ///
    /// Landmarks without a reported visibility are trusted.
    pub fn is_resolvable(&self, min_visibility: f64) -> bool {
        if !self.x.is_finite() || !self.y.is_finite() {
            return false;
        }
        match self.visibility {
            Some(v) => v.is_finite() && v >= min_visibility,
            None => true,
        }
    }

    pub fn position(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

/// Fixed-index landmark sequence for one detected person.
///
/// Index semantics follow the upstream model (see [`crate::landmarks`]). The
/// sequence may be shorter than the full skeleton when trailing joints are missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkFrame {
    points: Vec<LandmarkPoint>,
}

impl LandmarkFrame {
    pub fn new(points: Vec<LandmarkPoint>) -> Self {
        Self { points }
    }

    pub fn get(&self, index: usize) -> Option<&LandmarkPoint> {
        self.points.get(index)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[LandmarkPoint] {
        &self.points
    }
}

impl From<Vec<LandmarkPoint>> for LandmarkFrame {
    fn from(points: Vec<LandmarkPoint>) -> Self {
        Self::new(points)
    }
}

/// Planar point in normalized frame units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn midpoint(a: Point2, b: Point2) -> Point2 {
        Point2::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
    }

    pub fn distance_to(&self, other: Point2) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Named joint angles in degrees.
///
/// `neck_flexion_deg` and `trunk_lean_deg` are 2D projection heuristics over
/// normalized image coordinates, not calibrated goniometry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JointAngleSet {
    /// Ear-to-shoulder horizontal offset proxy (0-60); 0 when ears are unresolvable
    pub neck_flexion_deg: f64,
    /// Deviation of the torso from vertical (0 = upright)
    pub trunk_lean_deg: f64,
    /// Shoulder height difference proxy (0-30)
    pub shoulder_tilt_deg: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_elbow_deg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_elbow_deg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_knee_deg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_knee_deg: Option<f64>,
}

/// Coarse three-step tier shared by risk, strain and force classifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Low => "Low",
            Level::Medium => "Medium",
            Level::High => "High",
        }
    }

    /// Risk tier for an ErgoScore: >= 80 Low, >= 55 Medium, otherwise High
    pub fn from_score(score: u32) -> Self {
        if score >= 80 {
            Level::Low
        } else if score >= 55 {
            Level::Medium
        } else {
            Level::High
        }
    }
}

/// Severity of a posture issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Ok,
    Mild,
    High,
}

impl Severity {
    /// Score penalty applied per issue of this severity
    pub fn penalty(&self) -> u32 {
        match self {
            Severity::Ok => 0,
            Severity::Mild => 9,
            Severity::High => 18,
        }
    }
}

/// A single posture finding with remediation text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostureIssue {
    pub id: String,
    pub title: String,
    pub severity: Severity,
    /// Human-readable measurement, e.g. "Neck flexion ≈ 36°"
    pub measured: String,
    pub why_it_matters: String,
    pub fix: String,
}

/// Scored posture assessment for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostureReport {
    /// ErgoScore (0-100)
    pub score: u32,
    pub risk: Level,
    pub angles: JointAngleSet,
    pub issues: Vec<PostureIssue>,
}

/// Midpoints used for the lever computation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeverPoints {
    pub shoulder_mid: Point2,
    pub hip_mid: Point2,
    pub wrist_mid: Point2,
}

/// Biomechanical leverage proxies in normalized-frame units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeverMetrics {
    pub shoulder_moment_index: f64,
    pub low_back_moment_index: f64,
    /// Aggregate strain (0-100)
    pub strain_index: f64,
    pub strain_level: Level,
    pub points: LeverPoints,
}

/// Closed set of body actions the classifier can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ActionLabel {
    #[serde(rename = "Overhead reach")]
    OverheadReach,
    Bending,
    Twisting,
    Reaching,
    #[serde(rename = "Holding/Static")]
    HoldingStatic,
    Lifting,
    Clapping,
}

impl ActionLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionLabel::OverheadReach => "Overhead reach",
            ActionLabel::Bending => "Bending",
            ActionLabel::Twisting => "Twisting",
            ActionLabel::Reaching => "Reaching",
            ActionLabel::HoldingStatic => "Holding/Static",
            ActionLabel::Lifting => "Lifting",
            ActionLabel::Clapping => "Clapping",
        }
    }
}

/// Classified action for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    pub label: ActionLabel,
    /// Confidence (0-1)
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ActionResult {
    pub fn new(label: ActionLabel, confidence: f64) -> Self {
        Self {
            label,
            confidence: confidence.clamp(0.0, 1.0),
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Dynamic force/intensity estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForceEstimate {
    pub level: Level,
    /// Intensity value (0-100)
    pub value: u32,
}

impl ForceEstimate {
    pub fn idle() -> Self {
        Self {
            level: Level::Low,
            value: 0,
        }
    }
}
