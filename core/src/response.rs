//! Memoizing wrapper around a transport response.
//!
//! # Design
//! The body stream is read at most once. The first accessor that needs the
//! body drains the stream into an `OnceCell` and drops the stream, on success
//! and on failure alike. Every later view (bytes, text, JSON, XML, `info`)
//! works from the cached bytes. Accessors take `&self` so a cached `Response`
//! can be handed out by reference. The type is not `Sync`.

use std::cell::{OnceCell, RefCell};
use std::io::{self, Read};

use http::{HeaderMap, StatusCode, Version};
use serde::de::DeserializeOwned;

use crate::error::{DecodeError, HttpError, Result};
use crate::http::RawResponse;

struct ResponseHead {
    status: StatusCode,
    version: Version,
    headers: HeaderMap,
}

enum BodyStream {
    Unread(Box<dyn Read>),
    Closed,
}

/// A response whose body is materialized lazily and then cached.
pub struct Response {
    head: Option<ResponseHead>,
    stream: RefCell<BodyStream>,
    body: OnceCell<Vec<u8>>,
}

impl Response {
    pub fn new(raw: RawResponse) -> Self {
        Response {
            head: Some(ResponseHead {
                status: raw.status,
                version: raw.version,
                headers: raw.headers,
            }),
            stream: RefCell::new(BodyStream::Unread(raw.body)),
            body: OnceCell::new(),
        }
    }

    /// An absent response. Every fallible accessor returns `NilResponse`.
    pub fn nil() -> Self {
        Response {
            head: None,
            stream: RefCell::new(BodyStream::Closed),
            body: OnceCell::new(),
        }
    }

    pub fn is_nil(&self) -> bool {
        self.head.is_none()
    }

    fn head(&self) -> Result<&ResponseHead> {
        self.head.as_ref().ok_or(HttpError::NilResponse)
    }

    /// Read the whole body on first call, then return the cached bytes.
    pub fn receive_bytes(&self) -> Result<&[u8]> {
        self.head()?;
        if let Some(body) = self.body.get() {
            return Ok(body);
        }

        let stream = std::mem::replace(&mut *self.stream.borrow_mut(), BodyStream::Closed);
        let mut reader = match stream {
            BodyStream::Unread(reader) => reader,
            BodyStream::Closed => {
                return Err(HttpError::BodyRead(io::Error::new(
                    io::ErrorKind::Other,
                    "response body already closed",
                )));
            }
        };
        let mut buf = Vec::new();
        let read = reader.read_to_end(&mut buf);
        drop(reader);
        read.map_err(HttpError::BodyRead)?;

        log::trace!(target: "httpcli", "received {} body bytes", buf.len());
        Ok(self.body.get_or_init(|| buf))
    }

    /// The body as text. Invalid UTF-8 is replaced rather than rejected.
    pub fn receive_string(&self) -> Result<String> {
        self.receive_bytes()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// The body bytes, or an empty slice if they could not be read.
    pub fn as_bytes(&self) -> &[u8] {
        self.receive_bytes().unwrap_or_default()
    }

    /// The body text, or an empty string if it could not be read.
    pub fn as_string(&self) -> String {
        self.receive_string().unwrap_or_default()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        let bytes = self.receive_bytes()?;
        serde_json::from_slice(bytes).map_err(|e| DecodeError::Json(e).into())
    }

    pub fn xml<T: DeserializeOwned>(&self) -> Result<T> {
        let text = self.receive_string()?;
        quick_xml::de::from_str(&text).map_err(|e| DecodeError::Xml(e).into())
    }

    /// Status line, e.g. `"200 OK"`.
    pub fn status(&self) -> Result<String> {
        self.head().map(|head| head.status.to_string())
    }

    pub fn status_code(&self) -> Result<u16> {
        self.head().map(|head| head.status.as_u16())
    }

    pub fn headers(&self) -> Result<&HeaderMap> {
        self.head().map(|head| &head.headers)
    }

    pub fn version(&self) -> Result<Version> {
        self.head().map(|head| head.version)
    }

    /// Status line, headers and body. Empty if there is no body to show.
    pub fn info(&self) -> String {
        let Some(head) = &self.head else {
            return String::new();
        };
        let body = self.as_string();
        if body.is_empty() {
            return body;
        }

        let mut out = format!("{:?} {}", head.version, head.status);
        for (name, value) in head.headers.iter() {
            out.push('\n');
            out.push_str(name.as_str());
            out.push(':');
            out.push_str(&String::from_utf8_lossy(value.as_bytes()));
        }
        out.push_str("\n\n");
        out.push_str(&body);
        out
    }
}

impl std::fmt::Debug for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("Response");
        if let Some(head) = &self.head {
            s.field("status", &head.status)
                .field("version", &head.version)
                .field("headers", &head.headers);
        }
        s.field("body_cached", &self.body.get().is_some())
            .finish_non_exhaustive()
    }
}
