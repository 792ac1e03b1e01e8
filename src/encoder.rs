//! Report payload encoding
//!
//! Wraps per-frame reports with producer metadata for export consumers.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ComputeError;
use crate::report::FrameReport;
use crate::{ERGO_VERSION, PRODUCER_NAME};

/// Producer metadata embedded in every payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Producer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Exported envelope for one analyzed frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportPayload {
    pub ergo_version: String,
    pub producer: Producer,
    pub timestamp_ms: f64,
    /// Wall-clock encoding time (RFC 3339)
    pub computed_at_utc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    pub pose_detected: bool,
    /// `None` when no usable pose was found
    pub report: Option<FrameReport>,
}

/// Encoder for producing report payloads
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn encode(
        &self,
        report: Option<FrameReport>,
        timestamp_ms: f64,
        source_id: Option<&str>,
    ) -> Result<ReportPayload, ComputeError> {
        if !timestamp_ms.is_finite() {
            return Err(ComputeError::EncodingError(format!(
                "timestamp is not finite: {timestamp_ms}"
            )));
        }

        Ok(ReportPayload {
            ergo_version: ERGO_VERSION.to_string(),
            producer: Producer {
                name: PRODUCER_NAME.to_string(),
                version: ERGO_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            timestamp_ms,
            computed_at_utc: Utc::now().to_rfc3339(),
            source_id: source_id.map(str::to_string),
            pose_detected: report.is_some(),
            report,
        })
    }

    /// Encode to a pretty-printed JSON string
    pub fn encode_to_json(
        &self,
        report: Option<FrameReport>,
        timestamp_ms: f64,
        source_id: Option<&str>,
    ) -> Result<String, ComputeError> {
        let payload = self.encode(report, timestamp_ms, source_id)?;
        serde_json::to_string_pretty(&payload).map_err(ComputeError::JsonError)
    }
}
