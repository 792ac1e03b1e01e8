//! Parsing and batch validation of pose.landmark_frame.v1 records

use crate::error::ComputeError;
use crate::schema::frame_record::*;

/// Reader for frame record batches
pub struct FrameRecordAdapter;

impl FrameRecordAdapter {
    /// Parse a single JSON record
    pub fn parse_record(json: &str) -> Result<FrameRecord, ComputeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a JSON string containing an array of records
    pub fn parse_array(json: &str) -> Result<Vec<FrameRecord>, ComputeError> {
        let records: Vec<FrameRecord> = serde_json::from_str(json)?;
        Ok(records)
    }

    /// Parse NDJSON (newline-delimited JSON), skipping blank lines
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<FrameRecord>, ComputeError> {
        let mut records = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<FrameRecord>(trimmed) {
                Ok(record) => records.push(record),
                Err(e) => {
                    return Err(ComputeError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(records)
    }

    /// Parse either a JSON array or NDJSON, based on the first non-blank character
    pub fn parse_auto(input: &str) -> Result<Vec<FrameRecord>, ComputeError> {
        if input.trim_start().starts_with('[') {
            Self::parse_array(input)
        } else {
            Self::parse_ndjson(input)
        }
    }

    /// Validate a batch of records, returning only the failures
    pub fn validate_records(records: &[FrameRecord]) -> Vec<ValidationResult> {
        records
            .iter()
            .enumerate()
            .filter_map(|(index, record)| {
                record.validate().err().map(|error| ValidationResult {
                    index,
                    frame_id: record.frame_id.clone(),
                    error,
                })
            })
            .collect()
    }
}

/// A record that failed validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub index: usize,
    pub frame_id: Option<String>,
    pub error: ValidationError,
}
