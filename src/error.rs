//! Error types for Ergo Flux
//!
//! The analytics core never fails: missing or partial poses degrade to absent
//! results. These errors only surface from the outer layers (record parsing,
//! configuration, encoding and the FFI/CLI surfaces).

use thiserror::Error;

/// Errors that can occur around the analytics core
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Failed to parse frame record: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid landmark frame: {0}")]
    InvalidFrame(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
