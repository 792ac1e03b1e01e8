//! Session statistics
//!
//! This module accumulates per-session aggregates over analyzed frames: pose
//! coverage, score statistics with a rolling window, and counts per risk tier
//! and action label.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_SCORE_WINDOW;
use crate::report::FrameReport;
use crate::types::{ActionLabel, Level};

/// Rolling session statistics store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    frames_seen: u64,
    frames_with_pose: u64,
    score_sum: u64,
    min_score: Option<u32>,
    /// Most recent scores, oldest first
    score_window: VecDeque<u32>,
    risk_counts: BTreeMap<Level, u64>,
    action_counts: BTreeMap<ActionLabel, u64>,
    high_issue_frames: u64,
    /// Maximum window size
    window_size: usize,
}

/// Snapshot of a session's statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub frames_seen: u64,
    pub frames_with_pose: u64,
    /// Fraction of frames with a usable pose (0-1)
    pub pose_coverage: f64,
    pub mean_score: Option<f64>,
    pub min_score: Option<u32>,
    /// Mean score over the last `window_size` posed frames
    pub rolling_mean_score: Option<f64>,
    /// Latest score relative to the rolling mean, in percent
    pub latest_deviation_pct: Option<f64>,
    pub risk_counts: BTreeMap<Level, u64>,
    pub action_counts: BTreeMap<ActionLabel, u64>,
    pub high_issue_frames: u64,
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new(DEFAULT_SCORE_WINDOW)
    }
}

impl SessionStats {
    /// Create a new store with the given rolling window size
    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            frames_seen: 0,
            frames_with_pose: 0,
            score_sum: 0,
            min_score: None,
            score_window: VecDeque::with_capacity(window_size),
            risk_counts: BTreeMap::new(),
            action_counts: BTreeMap::new(),
            high_issue_frames: 0,
            window_size,
        }
    }

    /// Record one analyzed frame; `None` means no usable pose
    pub fn record(&mut self, report: Option<&FrameReport>) {
        self.frames_seen += 1;

        let Some(report) = report else {
            return;
        };

        self.frames_with_pose += 1;
        self.score_sum += u64::from(report.score);
        self.min_score = Some(self.min_score.map_or(report.score, |m| m.min(report.score)));

        self.score_window.push_back(report.score);
        while self.score_window.len() > self.window_size {
            self.score_window.pop_front();
        }

        *self.risk_counts.entry(report.risk).or_insert(0) += 1;
        if let Some(action) = &report.action {
            *self.action_counts.entry(action.label).or_insert(0) += 1;
        }
        if report.has_high_issue() {
            self.high_issue_frames += 1;
        }
    }

    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }

    pub fn summary(&self) -> SessionSummary {
        let rolling_mean_score = Self::rolling_average(&self.score_window);
        let latest_deviation_pct = match (self.score_window.back(), rolling_mean_score) {
            (Some(&latest), Some(mean)) if mean > 0.0 => {
                Some((f64::from(latest) - mean) / mean * 100.0)
            }
            _ => None,
        };

        SessionSummary {
            frames_seen: self.frames_seen,
            frames_with_pose: self.frames_with_pose,
            pose_coverage: if self.frames_seen == 0 {
                0.0
            } else {
                self.frames_with_pose as f64 / self.frames_seen as f64
            },
            mean_score: (self.frames_with_pose > 0)
                .then(|| self.score_sum as f64 / self.frames_with_pose as f64),
            min_score: self.min_score,
            rolling_mean_score,
            latest_deviation_pct,
            risk_counts: self.risk_counts.clone(),
            action_counts: self.action_counts.clone(),
            high_issue_frames: self.high_issue_frames,
        }
    }

    /// Clear all statistics, keeping the window size
    pub fn reset(&mut self) {
        *self = Self::new(self.window_size);
    }

    fn rolling_average(queue: &VecDeque<u32>) -> Option<f64> {
        if queue.is_empty() {
            return None;
        }
        let sum: u64 = queue.iter().map(|&s| u64::from(s)).sum();
        Some(sum as f64 / queue.len() as f64)
    }

    /// Load a store from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the store to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
