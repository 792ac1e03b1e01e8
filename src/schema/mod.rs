//! Unified pose.landmark_frame.v1 schema
//!
//! This module defines the input record for landmark frames and the adapter
//! that reads them from JSON arrays or NDJSON streams.

mod adapter;
mod frame_record;

pub use adapter::*;
pub use frame_record::*;
