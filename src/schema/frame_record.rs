//! pose.landmark_frame.v1 schema definition
//!
//! One record per captured frame: a timestamp, the landmark list produced by
//! the pose model (or `null` when no person was detected) and an optional
//! source identifier used to detect session boundaries.

use serde::{Deserialize, Serialize};

use crate::landmarks::LANDMARK_COUNT;
use crate::types::{LandmarkFrame, LandmarkPoint};

/// Current schema version
pub const FRAME_SCHEMA_VERSION: &str = "pose.landmark_frame.v1";

fn default_schema_version() -> String {
    FRAME_SCHEMA_VERSION.to_string()
}

/// A single timestamped landmark frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Schema version identifier; defaults to the current version when omitted
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_id: Option<String>,
    /// Capture time in milliseconds on a monotonic clock
    pub timestamp_ms: f64,
    /// Camera, video or photo the frame came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    /// Landmarks in pose-model index order; `None` when no person was found
    #[serde(default)]
    pub landmarks: Option<Vec<LandmarkPoint>>,
}

impl FrameRecord {
    pub fn new(timestamp_ms: f64, landmarks: Option<Vec<LandmarkPoint>>) -> Self {
        Self {
            schema_version: FRAME_SCHEMA_VERSION.to_string(),
            frame_id: Some(uuid::Uuid::new_v4().to_string()),
            timestamp_ms,
            source_id: None,
            landmarks,
        }
    }

    pub fn with_source(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    /// Landmarks as a frame, if a person was detected
    pub fn frame(&self) -> Option<LandmarkFrame> {
        self.landmarks.clone().map(LandmarkFrame::from)
    }

    /// Validate the record
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.schema_version != FRAME_SCHEMA_VERSION {
            return Err(ValidationError::InvalidSchemaVersion {
                expected: FRAME_SCHEMA_VERSION.to_string(),
                actual: self.schema_version.clone(),
            });
        }

        if !self.timestamp_ms.is_finite() || self.timestamp_ms < 0.0 {
            return Err(ValidationError::InvalidTimestamp(self.timestamp_ms));
        }

        let Some(landmarks) = &self.landmarks else {
            return Ok(());
        };

        if landmarks.len() > LANDMARK_COUNT {
            return Err(ValidationError::TooManyLandmarks {
                max: LANDMARK_COUNT,
                actual: landmarks.len(),
            });
        }

        for (index, point) in landmarks.iter().enumerate() {
            let coords_finite = point.x.is_finite()
                && point.y.is_finite()
                && point.z.map_or(true, f64::is_finite);
            if !coords_finite {
                return Err(ValidationError::NonFiniteCoordinate { index });
            }
            if let Some(visibility) = point.visibility {
                if !(0.0..=1.0).contains(&visibility) {
                    return Err(ValidationError::VisibilityOutOfRange { index, visibility });
                }
            }
        }

        Ok(())
    }
}

/// Validation errors for frame records
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid schema version: expected {expected}, got {actual}")]
    InvalidSchemaVersion { expected: String, actual: String },

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(f64),

    #[error("Too many landmarks: expected at most {max}, got {actual}")]
    TooManyLandmarks { max: usize, actual: usize },

    #[error("Landmark {index} has a non-finite coordinate")]
    NonFiniteCoordinate { index: usize },

    #[error("Landmark {index} visibility {visibility} is outside [0, 1]")]
    VisibilityOutOfRange { index: usize, visibility: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_record() {
        let json = r#"{"timestamp_ms": 1500, "landmarks": [{"x": 0.5, "y": 0.4}]}"#;
        let record: FrameRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.schema_version, FRAME_SCHEMA_VERSION);
        assert_eq!(record.timestamp_ms, 1500.0);
        assert_eq!(record.frame().unwrap().len(), 1);
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_null_landmarks_is_valid() {
        let json = r#"{"timestamp_ms": 0, "landmarks": null, "source_id": "cam-1"}"#;
        let record: FrameRecord = serde_json::from_str(json).unwrap();

        assert!(record.frame().is_none());
        assert_eq!(record.source_id.as_deref(), Some("cam-1"));
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_serialize_new_record() {
        let record = FrameRecord::new(33.0, Some(vec![LandmarkPoint::new(0.1, 0.2)]))
            .with_source("video-7");
        let json = serde_json::to_string(&record).unwrap();

        assert!(json.contains(FRAME_SCHEMA_VERSION));
        assert!(json.contains("video-7"));
        assert!(record.frame_id.is_some());
    }

    #[test]
    fn test_validation_errors() {
        let mut record = FrameRecord::new(-1.0, None);
        assert_eq!(record.validate(), Err(ValidationError::InvalidTimestamp(-1.0)));

        record.timestamp_ms = 10.0;
        record.landmarks = Some(vec![LandmarkPoint::new(f64::NAN, 0.2)]);
        assert_eq!(
            record.validate(),
            Err(ValidationError::NonFiniteCoordinate { index: 0 })
        );

        record.landmarks = Some(vec![LandmarkPoint::new(0.1, 0.2).with_visibility(1.4)]);
        assert!(matches!(
            record.validate(),
            Err(ValidationError::VisibilityOutOfRange { index: 0, .. })
        ));

        record.landmarks = Some(vec![LandmarkPoint::new(0.1, 0.2); LANDMARK_COUNT + 1]);
        assert!(matches!(
            record.validate(),
            Err(ValidationError::TooManyLandmarks { .. })
        ));

        record.landmarks = None;
        record.schema_version = "wrong.v0".to_string();
        assert!(matches!(
            record.validate(),
            Err(ValidationError::InvalidSchemaVersion { .. })
        ));
    }
}
