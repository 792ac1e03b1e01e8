//! FFI bindings for Ergo Flux
//!
//! This module provides C-compatible functions for calling Ergo Flux from other
//! languages. All functions use C strings (null-terminated) and return allocated
//! memory that must be freed by the caller using `ergo_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::AnalyzerConfig;
use crate::error::ComputeError;
use crate::pipeline::{analyze_still, landmark_frames_to_reports, ErgoProcessor};
use crate::types::LandmarkFrame;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Join already-serialized JSON payloads into one JSON array
fn vec_to_json_array(vec: Vec<String>) -> String {
    format!("[{}]", vec.join(","))
}

/// Hand a result back across the boundary, recording any error
fn into_cstr(result: Result<String, ComputeError>) -> *mut c_char {
    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Analyze one still image given as a JSON landmark array.
///
/// Returns the report JSON, or the string `null` when no usable pose was found.
///
/// # Safety
/// - `landmarks_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `ergo_free_string`.
/// - Returns NULL on error; call `ergo_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn ergo_analyze_frame_json(landmarks_json: *const c_char) -> *mut c_char {
    clear_last_error();

    let Some(json) = cstr_to_string(landmarks_json) else {
        set_last_error("Invalid landmarks string pointer");
        return ptr::null_mut();
    };

    into_cstr(
        serde_json::from_str::<LandmarkFrame>(&json)
            .and_then(|frame| serde_json::to_string(&analyze_still(&frame)))
            .map_err(ComputeError::from),
    )
}

/// Analyze a batch of frame records (JSON array or NDJSON) as one session.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated JSON array that must be freed with `ergo_free_string`.
/// - Returns NULL on error; call `ergo_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn ergo_frames_to_reports(json: *const c_char) -> *mut c_char {
    clear_last_error();

    let Some(json) = cstr_to_string(json) else {
        set_last_error("Invalid JSON string pointer");
        return ptr::null_mut();
    };

    into_cstr(landmark_frames_to_reports(json).map(vec_to_json_array))
}

// ============================================================================
// Stateful Processor API
// ============================================================================

/// Opaque handle to an ErgoProcessor
pub struct ErgoProcessorHandle {
    processor: ErgoProcessor,
}

/// Create a new processor.
///
/// `config_json` may be NULL for the default configuration.
///
/// # Safety
/// - `config_json` must be NULL or a valid null-terminated C string.
/// - Must be freed with `ergo_processor_free`.
/// - Returns NULL on error; call `ergo_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn ergo_processor_new(config_json: *const c_char) -> *mut ErgoProcessorHandle {
    clear_last_error();

    let config = if config_json.is_null() {
        AnalyzerConfig::default()
    } else {
        let parsed = cstr_to_string(config_json)
            .ok_or_else(|| ComputeError::ConfigError("config is not valid UTF-8".to_string()))
            .and_then(|json| AnalyzerConfig::from_json(&json));
        match parsed {
            Ok(config) => config,
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        }
    };

    let handle = Box::new(ErgoProcessorHandle {
        processor: ErgoProcessor::with_config(config),
    });
    Box::into_raw(handle)
}

/// Free a processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `ergo_processor_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn ergo_processor_free(processor: *mut ErgoProcessorHandle) {
    if !processor.is_null() {
        drop(Box::from_raw(processor));
    }
}

/// Process frame records (JSON array, NDJSON or a single record) with a stateful processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `ergo_processor_new`.
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated JSON array that must be freed with `ergo_free_string`.
/// - Returns NULL on error; call `ergo_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn ergo_processor_process(
    processor: *mut ErgoProcessorHandle,
    json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &mut *processor;

    let Some(json) = cstr_to_string(json) else {
        set_last_error("Invalid JSON string pointer");
        return ptr::null_mut();
    };

    into_cstr(handle.processor.process_json(&json).map(vec_to_json_array))
}

/// Start a new session on a processor (camera, video or photo source changed).
///
/// # Safety
/// - `processor` must be a valid pointer returned by `ergo_processor_new`.
/// - Returns 0 on success, non-zero on error.
#[no_mangle]
pub unsafe extern "C" fn ergo_processor_reset(processor: *mut ErgoProcessorHandle) -> i32 {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return -1;
    }

    (*processor).processor.reset();
    0
}

/// Session statistics as JSON.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `ergo_processor_new`.
/// - Returns a newly allocated string that must be freed with `ergo_free_string`.
/// - Returns NULL on error; call `ergo_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn ergo_processor_summary(processor: *mut ErgoProcessorHandle) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &*processor;
    into_cstr(serde_json::to_string(&handle.processor.summary()).map_err(ComputeError::from))
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Ergo Flux functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by an Ergo Flux function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn ergo_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Ergo Flux call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn ergo_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn ergo_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::fixtures::FrameBuilder;
    use std::ffi::CString;

    fn neutral_landmarks_json() -> CString {
        CString::new(serde_json::to_string(&FrameBuilder::neutral().build()).unwrap()).unwrap()
    }

    fn records_json() -> CString {
        let landmarks = serde_json::to_string(&FrameBuilder::neutral().build()).unwrap();
        CString::new(format!(
            "[{{\"timestamp_ms\": 0, \"landmarks\": {landmarks}}}, \
              {{\"timestamp_ms\": 33, \"landmarks\": {landmarks}}}]"
        ))
        .unwrap()
    }

    #[test]
    fn test_ffi_analyze_frame_json() {
        let json = neutral_landmarks_json();
        unsafe {
            let result = ergo_analyze_frame_json(json.as_ptr());
            assert!(!result.is_null());

            let result_str = CStr::from_ptr(result).to_str().unwrap();
            let value: serde_json::Value = serde_json::from_str(result_str).unwrap();
            assert_eq!(value["score"], 100);
            assert_eq!(value["risk"], "Low");

            ergo_free_string(result);
        }
    }

    #[test]
    fn test_ffi_analyze_frame_without_pose() {
        let json = CString::new("[]").unwrap();
        unsafe {
            let result = ergo_analyze_frame_json(json.as_ptr());
            assert!(!result.is_null());
            assert_eq!(CStr::from_ptr(result).to_str().unwrap(), "null");
            ergo_free_string(result);
        }
    }

    #[test]
    fn test_ffi_frames_to_reports() {
        let json = records_json();
        unsafe {
            let result = ergo_frames_to_reports(json.as_ptr());
            assert!(!result.is_null());

            let value: serde_json::Value =
                serde_json::from_str(CStr::from_ptr(result).to_str().unwrap()).unwrap();
            assert_eq!(value.as_array().unwrap().len(), 2);
            ergo_free_string(result);
        }
    }

    #[test]
    fn test_ffi_processor_lifecycle() {
        unsafe {
            let processor = ergo_processor_new(ptr::null());
            assert!(!processor.is_null());

            let json = records_json();
            let result = ergo_processor_process(processor, json.as_ptr());
            assert!(!result.is_null());
            assert!(CStr::from_ptr(result).to_str().unwrap().contains("ergo_version"));
            ergo_free_string(result);

            let summary = ergo_processor_summary(processor);
            assert!(!summary.is_null());
            let value: serde_json::Value =
                serde_json::from_str(CStr::from_ptr(summary).to_str().unwrap()).unwrap();
            assert_eq!(value["frames_seen"], 2);
            ergo_free_string(summary);

            assert_eq!(ergo_processor_reset(processor), 0);
            let summary = ergo_processor_summary(processor);
            let value: serde_json::Value =
                serde_json::from_str(CStr::from_ptr(summary).to_str().unwrap()).unwrap();
            assert_eq!(value["frames_seen"], 0);
            ergo_free_string(summary);

            ergo_processor_free(processor);
        }
    }

    #[test]
    fn test_ffi_processor_with_config() {
        let config = CString::new(r#"{"mode": "static", "score_window": 5}"#).unwrap();
        let bad = CString::new(r#"{"score_window": 0}"#).unwrap();
        unsafe {
            let processor = ergo_processor_new(config.as_ptr());
            assert!(!processor.is_null());
            ergo_processor_free(processor);

            assert!(ergo_processor_new(bad.as_ptr()).is_null());
            assert!(!ergo_last_error().is_null());
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        unsafe {
            let invalid_json = CString::new("not json").unwrap();
            let result = ergo_analyze_frame_json(invalid_json.as_ptr());
            assert!(result.is_null());

            let error = ergo_last_error();
            assert!(!error.is_null());
            assert!(!CStr::from_ptr(error).to_str().unwrap().is_empty());

            assert!(ergo_processor_process(ptr::null_mut(), invalid_json.as_ptr()).is_null());
            assert_eq!(ergo_processor_reset(ptr::null_mut()), -1);
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = ergo_version();
            assert!(!version.is_null());
            assert_eq!(
                CStr::from_ptr(version).to_str().unwrap(),
                env!("CARGO_PKG_VERSION")
            );
        }
    }
}
