//! FFI bindings for Reading Insight
//!
//! This module provides C-compatible functions for driving the insight engine from
//! a host page or another language. All functions use C strings (null-terminated)
//! and return allocated memory that must be freed by the caller using
//! `insight_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use serde::Deserialize;

use crate::classifier::classify;
use crate::config::InsightConfig;
use crate::engine::InsightEngine;
use crate::pipeline::session_to_report;
use crate::render::ContainerSink;
use crate::types::BlockId;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
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

/// Serialize `value` and hand it out as a C string, recording failures
fn json_to_cstr<T: serde::Serialize>(value: &T) -> *mut c_char {
    match serde_json::to_string(value) {
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

/// Classify a text block and return its theme profile as JSON (`null` if no theme matched).
///
/// # Safety
/// - `text` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `insight_free_string`.
/// - Returns NULL on error; call `insight_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn insight_classify(text: *const c_char) -> *mut c_char {
    clear_last_error();

    let text_str = match cstr_to_string(text) {
        Some(s) => s,
        None => {
            set_last_error("Invalid text string pointer");
            return ptr::null_mut();
        }
    };

    json_to_cstr(&classify(&text_str))
}

/// Replay reading session JSON and return the insight report JSON.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `insight_free_string`.
/// - Returns NULL on error; call `insight_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn insight_session_to_report(json: *const c_char) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    match session_to_report(json_str) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateful Engine API
// ============================================================================

/// Opaque handle to an InsightEngine rendering into an in-memory container
pub struct InsightEngineHandle {
    engine: InsightEngine<ContainerSink>,
}

/// A block currently on screen, as passed to `insight_engine_tick`
#[derive(Deserialize)]
struct VisibleBlock {
    block_id: BlockId,
    text: String,
}

/// Create a new InsightEngine with default configuration.
///
/// # Safety
/// - Returns a pointer to a newly allocated engine.
/// - Must be freed with `insight_engine_free`.
#[no_mangle]
pub unsafe extern "C" fn insight_engine_new() -> *mut InsightEngineHandle {
    clear_last_error();

    let engine = InsightEngine::new(ContainerSink::default());
    Box::into_raw(Box::new(InsightEngineHandle { engine }))
}

/// Create a new InsightEngine from configuration JSON.
///
/// Missing fields take their defaults; out-of-range values are rejected.
///
/// # Safety
/// - `config_json` must be a valid null-terminated C string.
/// - Returns a pointer to a newly allocated engine, or NULL on error.
/// - Must be freed with `insight_engine_free`.
/// - On error, call `insight_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn insight_engine_new_with_config(
    config_json: *const c_char,
) -> *mut InsightEngineHandle {
    clear_last_error();

    let json_str = match cstr_to_string(config_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid config string pointer");
            return ptr::null_mut();
        }
    };

    let config = match InsightConfig::from_json(&json_str) {
        Ok(config) => config,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    let engine = InsightEngine::with_config(config, ContainerSink::default());
    Box::into_raw(Box::new(InsightEngineHandle { engine }))
}

/// Free an InsightEngine.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `insight_engine_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn insight_engine_free(engine: *mut InsightEngineHandle) {
    if !engine.is_null() {
        drop(Box::from_raw(engine));
    }
}

/// Record one observation of a block (`p<index>`) and refresh the container.
///
/// Counts regardless of the configured dwell sampling; hosts forwarding raw
/// threshold crossings should use `insight_engine_observe_crossing`.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `insight_engine_new`.
/// - `block_id` must be a valid null-terminated C string.
/// - Returns 0 on success, non-zero on error.
/// - On error, call `insight_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn insight_engine_record_observation(
    engine: *mut InsightEngineHandle,
    block_id: *const c_char,
) -> i32 {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return -1;
    }

    let handle = &mut *engine;

    let id = match cstr_to_string(block_id).map(|s| s.parse::<BlockId>()) {
        Some(Ok(id)) => id,
        Some(Err(e)) => {
            set_last_error(&e.to_string());
            return -1;
        }
        None => {
            set_last_error("Invalid block_id string pointer");
            return -1;
        }
    };

    match handle.engine.record_observation(&id) {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Forward a threshold crossing of a block (`p<index>`).
///
/// Counts and refreshes the container under `on_crossing` sampling; ignored under
/// `per_tick`, where ticks sample dwell instead.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `insight_engine_new`.
/// - `block_id` must be a valid null-terminated C string.
/// - Returns 1 if the crossing was counted, 0 if ignored, -1 on error.
/// - On error, call `insight_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn insight_engine_observe_crossing(
    engine: *mut InsightEngineHandle,
    block_id: *const c_char,
) -> i32 {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return -1;
    }

    let handle = &mut *engine;

    let id = match cstr_to_string(block_id).map(|s| s.parse::<BlockId>()) {
        Some(Ok(id)) => id,
        Some(Err(e)) => {
            set_last_error(&e.to_string());
            return -1;
        }
        None => {
            set_last_error("Invalid block_id string pointer");
            return -1;
        }
    };

    match handle.engine.observe_crossing(&id) {
        Ok(counted) => i32::from(counted),
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Run a periodic tick over the on-screen blocks and return the insights as JSON.
///
/// `visible_json` is an array of `{"block_id": "p0", "text": "..."}` objects.
/// Under `per_tick` sampling each listed block also gets one dwell sample and the
/// container is refreshed.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `insight_engine_new`.
/// - `visible_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `insight_free_string`.
/// - Returns NULL on error; call `insight_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn insight_engine_tick(
    engine: *mut InsightEngineHandle,
    visible_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return ptr::null_mut();
    }

    let handle = &mut *engine;

    let json_str = match cstr_to_string(visible_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    let visible: Vec<VisibleBlock> = match serde_json::from_str(&json_str) {
        Ok(v) => v,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    match handle
        .engine
        .tick(visible.iter().map(|b| (&b.block_id, b.text.as_str())))
    {
        Ok(insights) => json_to_cstr(&insights),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Current insights as a JSON array.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `insight_engine_new`.
/// - Returns a newly allocated string that must be freed with `insight_free_string`.
/// - Returns NULL on error; call `insight_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn insight_engine_insights(engine: *mut InsightEngineHandle) -> *mut c_char {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return ptr::null_mut();
    }

    let handle = &*engine;
    json_to_cstr(&handle.engine.generate_insights())
}

/// Markup currently held by the insight container.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `insight_engine_new`.
/// - Returns a newly allocated string that must be freed with `insight_free_string`.
/// - Returns NULL on error; call `insight_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn insight_engine_markup(engine: *mut InsightEngineHandle) -> *mut c_char {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return ptr::null_mut();
    }

    let handle = &*engine;
    string_to_cstr(handle.engine.sink().content())
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Reading Insight functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Reading Insight function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn insight_free_string(ptr: *mut c_char) {
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
/// - The returned pointer is valid until the next Reading Insight call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn insight_last_error() -> *const c_char {
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
pub unsafe extern "C" fn insight_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    unsafe fn take_string(ptr: *mut c_char) -> String {
        assert!(!ptr.is_null());
        let s = CStr::from_ptr(ptr).to_str().unwrap().to_string();
        insight_free_string(ptr);
        s
    }

    #[test]
    fn test_ffi_classify() {
        let text = CString::new("innovation and technology will shape our future").unwrap();
        let plain = CString::new("nothing to see here").unwrap();

        unsafe {
            let profile: serde_json::Value =
                serde_json::from_str(&take_string(insight_classify(text.as_ptr()))).unwrap();
            assert_eq!(profile["progress"], 1.0);

            let none = take_string(insight_classify(plain.as_ptr()));
            assert_eq!(none, "null");
        }
    }

    #[test]
    fn test_ffi_engine_lifecycle() {
        let p0 = CString::new("p0").unwrap();
        let visible = CString::new(
            r#"[{ "block_id": "p0", "text": "our heritage and tradition give us pride" }]"#,
        )
        .unwrap();

        unsafe {
            let engine = insight_engine_new();
            assert!(!engine.is_null());

            assert_eq!(insight_engine_record_observation(engine, p0.as_ptr()), 0);

            let insights = take_string(insight_engine_tick(engine, visible.as_ptr()));
            let insights: serde_json::Value = serde_json::from_str(&insights).unwrap();
            assert_eq!(insights[1]["title"], "Key Interest");
            assert_eq!(
                insights[1]["content"],
                "The city's historical evolution appears to resonate with you"
            );

            // Tick alone does not render; the next observation does
            assert_eq!(take_string(insight_engine_markup(engine)), "");
            assert_eq!(insight_engine_record_observation(engine, p0.as_ptr()), 0);
            assert!(take_string(insight_engine_markup(engine)).contains("insight-card"));

            let current = take_string(insight_engine_insights(engine));
            assert!(current.contains("Reading Pattern"));

            insight_engine_free(engine);
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        let bad_id = CString::new("intro").unwrap();
        let bad_json = CString::new("not json").unwrap();

        unsafe {
            let engine = insight_engine_new();
            assert_eq!(insight_engine_record_observation(engine, bad_id.as_ptr()), -1);
            let error = CStr::from_ptr(insight_last_error()).to_str().unwrap();
            assert!(error.contains("intro"));

            assert!(insight_engine_tick(engine, bad_json.as_ptr()).is_null());
            assert!(insight_session_to_report(bad_json.as_ptr()).is_null());
            assert!(!insight_last_error().is_null());

            assert_eq!(
                insight_engine_record_observation(ptr::null_mut(), bad_id.as_ptr()),
                -1
            );
            insight_engine_free(engine);
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = insight_version();
            assert!(!version.is_null());

            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert!(!version_str.is_empty());
        }
    }

    #[test]
    fn test_ffi_engine_with_config() {
        let config = CString::new(r#"{ "dwell_sampling": "per_tick" }"#).unwrap();
        let p0 = CString::new("p0").unwrap();
        let visible = CString::new(
            r#"[{ "block_id": "p0", "text": "innovation and technology will shape our future" }]"#,
        )
        .unwrap();

        unsafe {
            let engine = insight_engine_new_with_config(config.as_ptr());
            assert!(!engine.is_null());

            // Crossings are left to the ticks
            assert_eq!(insight_engine_observe_crossing(engine, p0.as_ptr()), 0);
            assert_eq!(take_string(insight_engine_markup(engine)), "");

            for _ in 0..3 {
                insight_free_string(insight_engine_tick(engine, visible.as_ptr()));
            }
            assert_eq!((*engine).engine.dwell().get(&BlockId::from_index(0)), 3);
            assert!(take_string(insight_engine_markup(engine)).contains("insight-card"));

            insight_engine_free(engine);
        }
    }

    #[test]
    fn test_ffi_engine_config_errors() {
        let out_of_range = CString::new(r#"{ "observation_threshold": 1.5 }"#).unwrap();
        let bad_json = CString::new("{").unwrap();

        unsafe {
            assert!(insight_engine_new_with_config(out_of_range.as_ptr()).is_null());
            let error = CStr::from_ptr(insight_last_error()).to_str().unwrap();
            assert!(error.contains("observation_threshold"));

            assert!(insight_engine_new_with_config(bad_json.as_ptr()).is_null());
            assert!(!insight_last_error().is_null());

            assert!(insight_engine_new_with_config(ptr::null()).is_null());
        }
    }

    #[test]
    fn test_ffi_default_engine_counts_crossings() {
        let p1 = CString::new("p1").unwrap();
        unsafe {
            let engine = insight_engine_new();
            assert_eq!(insight_engine_observe_crossing(engine, p1.as_ptr()), 1);
            assert_eq!((*engine).engine.dwell().get(&BlockId::from_index(1)), 1);
            insight_engine_free(engine);
        }
    }
}
