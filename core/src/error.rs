//! Error types for the request builder and response wrapper.
//!
//! # Design
//! Every failure is returned from the operation that detected it; nothing is
//! retried and nothing is fatal. Transport failures are opaque and passed
//! through unchanged. Decode failures keep the underlying serde error as the
//! `source()` so callers can inspect the exact position of the mismatch.

use std::fmt;
use std::io;

use crate::transport::TransportError;

/// Errors returned by `RequestBuilder` and `Response` operations.
#[derive(Debug)]
pub enum HttpError {
    /// An accessor was called on an absent response.
    NilResponse,

    /// The finalized URL could not be parsed.
    UrlParse { url: String, source: url::ParseError },

    /// The transport failed (connection, TLS, timeout, ...).
    Transport(TransportError),

    /// The response body stream could not be fully read.
    BodyRead(io::Error),

    /// The cached body could not be decoded into the requested shape.
    Decode(DecodeError),

    /// A header name or value passed to `RequestBuilder::header` was invalid.
    InvalidHeader(String),

    /// A value passed to `RequestBuilder::json` could not be serialized.
    Serialize(serde_json::Error),
}

/// Format-specific decode failure.
#[derive(Debug)]
pub enum DecodeError {
    Json(serde_json::Error),
    Xml(quick_xml::de::DeError),
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpError::NilResponse => write!(f, "nil response"),
            HttpError::UrlParse { url, source } => {
                write!(f, "invalid URL {url:?}: {source}")
            }
            HttpError::Transport(err) => write!(f, "transport error: {err}"),
            HttpError::BodyRead(err) => write!(f, "failed to read response body: {err}"),
            HttpError::Decode(err) => write!(f, "failed to decode response body: {err}"),
            HttpError::InvalidHeader(msg) => write!(f, "invalid header: {msg}"),
            HttpError::Serialize(err) => write!(f, "serialization failed: {err}"),
        }
    }
}

impl std::error::Error for HttpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HttpError::UrlParse { source, .. } => Some(source),
            HttpError::Transport(err) => Some(&**err),
            HttpError::BodyRead(err) => Some(err),
            HttpError::Decode(err) => Some(err),
            HttpError::Serialize(err) => Some(err),
            HttpError::NilResponse | HttpError::InvalidHeader(_) => None,
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Json(err) => write!(f, "json: {err}"),
            DecodeError::Xml(err) => write!(f, "xml: {err}"),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::Json(err) => Some(err),
            DecodeError::Xml(err) => Some(err),
        }
    }
}

impl From<TransportError> for HttpError {
    fn from(err: TransportError) -> Self {
        HttpError::Transport(err)
    }
}

impl From<DecodeError> for HttpError {
    fn from(err: DecodeError) -> Self {
        HttpError::Decode(err)
    }
}

pub type Result<T, E = HttpError> = std::result::Result<T, E>;
