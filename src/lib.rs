//! Ergo Flux - Ergonomic risk analytics over pose landmark frames
//!
//! Flux turns per-frame body landmarks from an external pose model into an
//! ergonomic assessment through a deterministic pipeline: geometry → posture
//! scoring → lever metrics → force estimation → action classification →
//! report assembly.
//!
//! ## Modules
//!
//! - **Core**: geometry, posture scoring, lever metrics, force and actions
//! - **Session**: [`ErgoProcessor`] owns per-session state and statistics
//! - **Surfaces**: frame record schema, payload encoder, C FFI and the `ergo` CLI

pub mod action;
pub mod config;
pub mod encoder;
pub mod error;
pub mod force;
pub mod geometry;
pub mod landmarks;
pub mod lever;
pub mod pipeline;
pub mod report;
pub mod schema;
pub mod scorer;
pub mod session;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::{AnalysisMode, AnalyzerConfig};
pub use error::ComputeError;
pub use pipeline::{analyze_still, landmark_frames_to_reports, ErgoProcessor};
pub use report::{FrameReport, LeverReport, ReportAssembler};
pub use session::SessionSummary;
pub use types::{
    ActionLabel, ActionResult, ForceEstimate, JointAngleSet, LandmarkFrame, LandmarkPoint, Level,
    LeverMetrics, PostureIssue, PostureReport, Severity,
};

// Schema exports
pub use schema::{FrameRecord, FrameRecordAdapter, FRAME_SCHEMA_VERSION};

/// Ergo Flux version embedded in all report payloads
pub const ERGO_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for report payloads
pub const PRODUCER_NAME: &str = "ergo-flux";
