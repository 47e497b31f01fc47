//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type with a C-compatible representation:
//! `*mut c_char` instead of `String`, pointer + length instead of `Vec<u8>`,
//! and enums with explicit discriminants. Conversion helpers live here to keep
//! `lib.rs` focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use httpcli_core::{HttpError, HttpMethod, RequestBuilder, Response};

/// Opaque handle to a `RequestBuilder`. C callers receive a pointer to this
/// and pass it back into every `httpcli_request_*` function.
pub struct FfiRequest {
    pub(crate) inner: RequestBuilder,
}

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Delete = 3,
    Patch = 4,
    Head = 5,
}

impl From<FfiHttpMethod> for HttpMethod {
    fn from(m: FfiHttpMethod) -> Self {
        match m {
            FfiHttpMethod::Get => HttpMethod::Get,
            FfiHttpMethod::Post => HttpMethod::Post,
            FfiHttpMethod::Put => HttpMethod::Put,
            FfiHttpMethod::Delete => HttpMethod::Delete,
            FfiHttpMethod::Patch => HttpMethod::Patch,
            FfiHttpMethod::Head => HttpMethod::Head,
        }
    }
}

/// Body kinds accepted by `httpcli_request_body`. Passed as a plain `u32`;
/// any other value is rejected with `InvalidBodyType`.
pub const FFI_BODY_BYTES: u32 = 0;
pub const FFI_BODY_TEXT: u32 = 1;

/// Error codes returned by setters and in `FfiResult`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    NilResponse = 1,
    UrlParse = 2,
    Transport = 3,
    BodyRead = 4,
    Decode = 5,
    InvalidHeader = 6,
    Serialization = 7,
    InvalidBodyType = 8,
    InvalidUtf8 = 9,
    Panic = 10,
    NullArg = 11,
}

impl From<&HttpError> for FfiErrorCode {
    fn from(err: &HttpError) -> Self {
        match err {
            HttpError::NilResponse => FfiErrorCode::NilResponse,
            HttpError::UrlParse { .. } => FfiErrorCode::UrlParse,
            HttpError::Transport(_) => FfiErrorCode::Transport,
            HttpError::BodyRead(_) => FfiErrorCode::BodyRead,
            HttpError::Decode(_) => FfiErrorCode::Decode,
            HttpError::InvalidHeader(_) => FfiErrorCode::InvalidHeader,
            HttpError::Serialize(_) => FfiErrorCode::Serialization,
        }
    }
}

/// Result envelope for `httpcli_request_execute`.
///
/// On success `error_code` is `Ok`, `error_message` is null, `http_status`
/// holds the response status and `body`/`body_len` the response bytes (null
/// and 0 for an empty body). On failure `error_code` describes the category,
/// `error_message` is a human-readable C string and `body` is null.
#[repr(C)]
pub struct FfiResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub body: *mut u8,
    pub body_len: usize,
}

impl FfiResult {
    /// Build a success result from a cached response, copying its body.
    pub(crate) fn ok_response(resp: &Response) -> *mut Self {
        let http_status = resp.status_code().unwrap_or(0);
        let (body, body_len) = into_raw_bytes(resp.as_bytes().to_vec());
        Box::into_raw(Box::new(FfiResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status,
            body,
            body_len,
        }))
    }

    pub(crate) fn from_error(err: &HttpError) -> *mut Self {
        Self::error(FfiErrorCode::from(err), &err.to_string())
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::error(FfiErrorCode::NullArg, &format!("null argument: {name}"))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::error(FfiErrorCode::Panic, msg)
    }

    fn error(error_code: FfiErrorCode, msg: &str) -> *mut Self {
        Box::into_raw(Box::new(FfiResult {
            error_code,
            error_message: to_c_string(msg),
            http_status: 0,
            body: std::ptr::null_mut(),
            body_len: 0,
        }))
    }
}

/// Leak `bytes` as a boxed slice for C. Empty input yields null.
fn into_raw_bytes(bytes: Vec<u8>) -> (*mut u8, usize) {
    if bytes.is_empty() {
        return (std::ptr::null_mut(), 0);
    }
    let boxed = bytes.into_boxed_slice();
    let len = boxed.len();
    (Box::into_raw(boxed) as *mut u8, len)
}

/// Reclaim a slice leaked by `into_raw_bytes`.
pub(crate) unsafe fn free_raw_bytes(ptr: *mut u8, len: usize) {
    if !ptr.is_null() && len > 0 {
        drop(unsafe { Box::from_raw(std::ptr::slice_from_raw_parts_mut(ptr, len)) });
    }
}

/// Convert to an owned C string, dropping interior NULs rather than failing.
pub(crate) fn to_c_string(s: &str) -> *mut c_char {
    let cleaned: Vec<u8> = s.bytes().filter(|&b| b != 0).collect();
    CString::new(cleaned).unwrap_or_default().into_raw()
}
