//! C-ABI wrapper around `httpcli-core`.
//!
//! # Overview
//! Exposes `RequestBuilder` through `extern "C"` functions so any language
//! with a C FFI can configure, execute and re-execute requests and read the
//! memoized response.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Setters return an `FfiErrorCode`; `httpcli_request_execute` returns a
//!   heap-allocated `FfiResult` envelope.
//! - The request body kind is a plain `u32`; unknown kinds fail with
//!   `InvalidBodyType` instead of being ignored.
//! - The C caller owns all returned pointers and must call the matching
//!   `httpcli_free_*` / `httpcli_request_free` function to release them.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use httpcli_core::RequestBuilder;

use types::*;

/// Borrow a C string as `&str`.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives `'a`.
unsafe fn c_str<'a>(ptr: *const c_char) -> Result<&'a str, FfiErrorCode> {
    if ptr.is_null() {
        return Err(FfiErrorCode::NullArg);
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| FfiErrorCode::InvalidUtf8)
}

/// Run a setter against a live request handle, mapping null and panics to
/// error codes.
fn with_request(
    req: *mut FfiRequest,
    f: impl FnOnce(&mut RequestBuilder) -> Result<(), FfiErrorCode>,
) -> FfiErrorCode {
    if req.is_null() {
        return FfiErrorCode::NullArg;
    }
    catch_unwind(AssertUnwindSafe(|| {
        let req = unsafe { &mut *req };
        match f(&mut req.inner) {
            Ok(()) => FfiErrorCode::Ok,
            Err(code) => code,
        }
    }))
    .unwrap_or(FfiErrorCode::Panic)
}

// ---------------------------------------------------------------------------
// Request lifecycle
// ---------------------------------------------------------------------------

/// Create a new request for `method` and `url`.
///
/// Returns null if `url` is null or not valid UTF-8, or if an internal panic
/// occurs. The caller must free the returned pointer with
/// `httpcli_request_free`.
#[unsafe(no_mangle)]
pub extern "C" fn httpcli_request_new(method: FfiHttpMethod, url: *const c_char) -> *mut FfiRequest {
    catch_unwind(|| {
        let Ok(url) = (unsafe { c_str(url) }) else {
            return std::ptr::null_mut();
        };
        let inner = RequestBuilder::new(method.into(), url);
        Box::into_raw(Box::new(FfiRequest { inner }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a request created by `httpcli_request_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn httpcli_request_free(req: *mut FfiRequest) {
    if !req.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(req) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Replace the target URL.
#[unsafe(no_mangle)]
pub extern "C" fn httpcli_request_set_url(req: *mut FfiRequest, url: *const c_char) -> FfiErrorCode {
    with_request(req, |inner| {
        let url = unsafe { c_str(url) }?;
        inner.set_url(url);
        Ok(())
    })
}

/// Set a parameter; the last value for a key wins.
#[unsafe(no_mangle)]
pub extern "C" fn httpcli_request_param(
    req: *mut FfiRequest,
    key: *const c_char,
    value: *const c_char,
) -> FfiErrorCode {
    with_request(req, |inner| {
        let (key, value) = unsafe { (c_str(key)?, c_str(value)?) };
        inner.param(key, value);
        Ok(())
    })
}

/// Set a header, replacing any previous value. An invalid name or value is
/// reported as `InvalidHeader` by `httpcli_request_execute`.
#[unsafe(no_mangle)]
pub extern "C" fn httpcli_request_header(
    req: *mut FfiRequest,
    key: *const c_char,
    value: *const c_char,
) -> FfiErrorCode {
    with_request(req, |inner| {
        let (key, value) = unsafe { (c_str(key)?, c_str(value)?) };
        inner.header(key, value);
        Ok(())
    })
}

/// Attach an explicit body of `len` bytes at `data`.
///
/// `kind` is `FFI_BODY_BYTES` or `FFI_BODY_TEXT` (which must be UTF-8); any
/// other value fails with `InvalidBodyType` and leaves the request unchanged.
/// `data` may be null only when `len` is 0.
#[unsafe(no_mangle)]
pub extern "C" fn httpcli_request_body(
    req: *mut FfiRequest,
    kind: u32,
    data: *const u8,
    len: usize,
) -> FfiErrorCode {
    with_request(req, |inner| {
        if data.is_null() && len > 0 {
            return Err(FfiErrorCode::NullArg);
        }
        let bytes = if len == 0 {
            &[][..]
        } else {
            unsafe { std::slice::from_raw_parts(data, len) }
        };
        match kind {
            FFI_BODY_BYTES => {
                inner.raw_body(bytes);
            }
            FFI_BODY_TEXT => {
                let text = std::str::from_utf8(bytes).map_err(|_| FfiErrorCode::InvalidUtf8)?;
                inner.raw_body(text);
            }
            other => {
                log::warn!(target: "httpcli", "rejecting unknown body kind {other}");
                return Err(FfiErrorCode::InvalidBodyType);
            }
        }
        Ok(())
    })
}

/// Attach a JSON body and stop escaping parameters.
#[unsafe(no_mangle)]
pub extern "C" fn httpcli_request_json(req: *mut FfiRequest, json: *const c_char) -> FfiErrorCode {
    with_request(req, |inner| {
        let json = unsafe { c_str(json) }?;
        inner.json_body(json);
        Ok(())
    })
}

/// Skip TLS certificate verification for this request.
#[unsafe(no_mangle)]
pub extern "C" fn httpcli_request_insecure_tls(req: *mut FfiRequest) -> FfiErrorCode {
    with_request(req, |inner| {
        inner.insecure_tls();
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// The current request URL. Free with `httpcli_free_string`. Null if `req`
/// is null.
#[unsafe(no_mangle)]
pub extern "C" fn httpcli_request_url(req: *const FfiRequest) -> *mut c_char {
    if req.is_null() {
        return std::ptr::null_mut();
    }
    catch_unwind(AssertUnwindSafe(|| to_c_string(&unsafe { &*req }.inner.url())))
        .unwrap_or(std::ptr::null_mut())
}

/// Human-readable summary of the request and any cached response. Free with
/// `httpcli_free_string`. Null if `req` is null.
#[unsafe(no_mangle)]
pub extern "C" fn httpcli_request_info(req: *const FfiRequest) -> *mut c_char {
    if req.is_null() {
        return std::ptr::null_mut();
    }
    catch_unwind(AssertUnwindSafe(|| to_c_string(&unsafe { &*req }.inner.info())))
        .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Execute the request, or return the cached response if it already ran.
///
/// The result is always non-null and must be freed with `httpcli_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn httpcli_request_execute(req: *mut FfiRequest) -> *mut FfiResult {
    if req.is_null() {
        return FfiResult::null_arg("req");
    }
    catch_unwind(AssertUnwindSafe(|| {
        let req = unsafe { &mut *req };
        match req.inner.execute() {
            Ok(resp) => FfiResult::ok_response(resp),
            Err(e) => FfiResult::from_error(&e),
        }
    }))
    .unwrap_or_else(|_| FfiResult::panic("panic in httpcli_request_execute"))
}

/// Drop the cached response so the next execute performs a new call.
#[unsafe(no_mangle)]
pub extern "C" fn httpcli_request_rearm(req: *mut FfiRequest) -> FfiErrorCode {
    with_request(req, |inner| {
        inner.rearm();
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiResult` returned by `httpcli_request_execute`. Safe to call
/// with null.
#[unsafe(no_mangle)]
pub extern "C" fn httpcli_free_result(result: *mut FfiResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_message.is_null() {
            drop(unsafe { std::ffi::CString::from_raw(result.error_message) });
        }
        unsafe { free_raw_bytes(result.body, result.body_len) };
    }));
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn httpcli_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { std::ffi::CString::from_raw(s) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
