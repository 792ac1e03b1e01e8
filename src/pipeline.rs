//! Pipeline orchestration
//!
//! This module provides the public API for Ergo Flux. It runs one landmark
//! frame through geometry, posture scoring, lever metrics, force estimation
//! and action classification, and assembles the per-frame report.

use log::{debug, info, warn};

use crate::action::{ActionClassifier, StaticActionClassifier, TemporalActionClassifier};
use crate::config::{AnalysisMode, AnalyzerConfig};
use crate::encoder::{ReportEncoder, ReportPayload};
use crate::error::ComputeError;
use crate::force::ForceEstimator;
use crate::geometry::GeometryEngine;
use crate::landmarks::FrameView;
use crate::lever::LeverBiomechanicsEngine;
use crate::report::{FrameReport, ReportAssembler};
use crate::schema::{FrameRecord, FrameRecordAdapter};
use crate::scorer::PostureScorer;
use crate::session::{SessionStats, SessionSummary};
use crate::types::LandmarkFrame;

/// Analyze a single still image.
///
/// Uses the static action classifier and skips force estimation, since a
/// single image has no motion. Returns `None` when shoulders or hips are
/// unresolvable.
///
/// # Example
/// ```ignore
/// let report = analyze_still(&frame);
/// ```
pub fn analyze_still(frame: &LandmarkFrame) -> Option<FrameReport> {
    let config = AnalyzerConfig::still();
    let view = FrameView::new(frame, config.min_visibility);
    assess(&view, 0.0, &config, &mut StaticActionClassifier::new(), None)
}

/// Convert a batch of frame records (JSON array or NDJSON) to report payloads.
///
/// Frames are analyzed in order as one video session.
///
/// # Returns
/// One JSON payload per input record
pub fn landmark_frames_to_reports(raw_json: String) -> Result<Vec<String>, ComputeError> {
    ErgoProcessor::new().process_json(&raw_json)
}

/// Run every stage for one resolvable frame
fn assess(
    view: &FrameView<'_>,
    now_ms: f64,
    config: &AnalyzerConfig,
    classifier: &mut dyn ActionClassifier,
    force: Option<&mut ForceEstimator>,
) -> Option<FrameReport> {
    let geometry = GeometryEngine::analyze(view)?;

    let posture = PostureScorer::score(geometry.angles);
    let lever = LeverBiomechanicsEngine::from_midpoints(&geometry.midpoints);

    // A single flickering wrist is not motion: force tracks the paired midpoint only.
    let force = force.map(|estimator| {
        estimator.estimate(geometry.midpoints.paired_wrist, lever.shoulder_moment_index, now_ms)
    });

    let action = if config.classify_actions {
        classifier.classify(view, now_ms)
    } else {
        None
    };

    Some(ReportAssembler::assemble(posture, Some(lever), force, action))
}

/// Stateful processor for one analysis session (a camera, video or photo set).
///
/// Owns the temporal classifier, force estimator and session statistics.
/// Each concurrent session needs its own processor.
pub struct ErgoProcessor {
    config: AnalyzerConfig,
    classifier: Box<dyn ActionClassifier + Send>,
    force: ForceEstimator,
    stats: SessionStats,
    encoder: ReportEncoder,
    last_timestamp_ms: Option<f64>,
    source_id: Option<String>,
}

impl Default for ErgoProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl ErgoProcessor {
    /// Create a new processor with default settings
    pub fn new() -> Self {
        Self::with_config(AnalyzerConfig::default())
    }

    pub fn with_config(config: AnalyzerConfig) -> Self {
        let classifier: Box<dyn ActionClassifier + Send> = match config.mode {
            AnalysisMode::Temporal => Box::new(TemporalActionClassifier::new()),
            AnalysisMode::Static => Box::new(StaticActionClassifier::new()),
        };

        Self {
            stats: SessionStats::new(config.score_window),
            config,
            classifier,
            force: ForceEstimator::new(),
            encoder: ReportEncoder::new(),
            last_timestamp_ms: None,
            source_id: None,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze one frame. `None` input or an unresolvable pose yields `None`.
    pub fn analyze(&mut self, frame: Option<&LandmarkFrame>, now_ms: f64) -> Option<FrameReport> {
        if let Some(last) = self.last_timestamp_ms {
            if now_ms < last {
                warn!("timestamp went backwards ({last:.0}ms -> {now_ms:.0}ms); resetting session state");
                self.reset_temporal();
            }
        }
        self.last_timestamp_ms = Some(now_ms);

        let report = frame.and_then(|frame| {
            let view = FrameView::new(frame, self.config.min_visibility);
            let force = self.config.estimate_force.then_some(&mut self.force);
            assess(&view, now_ms, &self.config, self.classifier.as_mut(), force)
        });

        if report.is_none() {
            debug!("no usable pose at {now_ms:.0}ms");
            self.force.reset();
        }

        self.stats.record(report.as_ref());
        report
    }

    /// Process a single frame record into a payload.
    ///
    /// A change of `source_id` starts a new session.
    pub fn process_record(&mut self, record: &FrameRecord) -> Result<ReportPayload, ComputeError> {
        record
            .validate()
            .map_err(|e| ComputeError::InvalidFrame(e.to_string()))?;

        if let Some(source) = &record.source_id {
            if self.source_id.as_ref().is_some_and(|current| current != source) {
                warn!("source changed to {source}; resetting session state");
                self.reset_temporal();
            }
            self.source_id = Some(source.clone());
        }

        let frame = record.frame();
        let report = self.analyze(frame.as_ref(), record.timestamp_ms);
        self.encoder
            .encode(report, record.timestamp_ms, record.source_id.as_deref())
    }

    /// Process a JSON array or NDJSON batch of records, one compact JSON payload each
    pub fn process_json(&mut self, input: &str) -> Result<Vec<String>, ComputeError> {
        let records = FrameRecordAdapter::parse_auto(input)?;

        let mut payloads = Vec::with_capacity(records.len());
        for record in &records {
            let payload = self.process_record(record)?;
            payloads.push(serde_json::to_string(&payload)?);
        }

        Ok(payloads)
    }

    pub fn summary(&self) -> SessionSummary {
        self.stats.summary()
    }

    /// Start a new session: clears hidden temporal state and statistics
    pub fn reset(&mut self) {
        self.reset_temporal();
        self.stats.reset();
        self.source_id = None;
    }

    /// Clear classifier and force history, keeping statistics
    fn reset_temporal(&mut self) {
        info!("resetting action classifier and force estimator");
        self.classifier.reset();
        self.force.reset();
        self.last_timestamp_ms = None;
    }
}
