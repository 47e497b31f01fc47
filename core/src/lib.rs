//! Deferred, re-executable HTTP requests over a pluggable transport.
//!
//! # Overview
//! A `RequestBuilder` collects URL, parameters, headers and body through
//! chained calls and only produces the wire request when it is executed. The
//! resulting `Response` reads the body stream once and serves every later view
//! (bytes, text, JSON, XML) from the cached bytes. Executing again without
//! `rearm` returns the same cached response.
//!
//! # Design
//! - Network I/O sits behind the `Transport` trait; `UreqTransport` is the
//!   default, tests use in-memory transports.
//! - GET parameters go to the query string, POST parameters become a form body
//!   unless an explicit body was set.
//! - Errors are explicit `HttpError` values; only `Response::as_bytes` and
//!   `Response::as_string` swallow them.
//!
//! ```no_run
//! use httpcli_core::RequestBuilder;
//!
//! let mut req = RequestBuilder::get("http://svc/search");
//! req.param("q", "cats");
//! let resp = req.execute()?;
//! println!("{}", resp.as_string());
//! # Ok::<(), httpcli_core::HttpError>(())
//! ```

pub mod client;
pub mod error;
pub mod http;
pub mod params;
pub mod response;
pub mod transport;

pub use client::RequestBuilder;
pub use error::{DecodeError, HttpError, Result};
pub use self::http::{HttpMethod, HttpRequest, Protocol, RawResponse, RequestBody};
pub use params::Params;
pub use response::Response;
pub use transport::{Transport, TransportConfig, TransportError, UreqTransport};
