//! The network boundary.
//!
//! # Design
//! The builder never opens sockets itself. It hands a finalized `HttpRequest`
//! to a `Transport` and gets back a `RawResponse` whose body has not been read
//! yet. `UreqTransport` is the default implementation; tests plug in their own.

use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use crate::http::{HttpRequest, RawResponse};

/// Opaque transport failure (connection, TLS, timeout, protocol).
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// Performs the actual HTTP round-trip for a finalized request.
///
/// Implementations must not interpret non-2xx statuses as errors: every
/// response the server produced is returned as a `RawResponse`.
pub trait Transport {
    fn round_trip(&self, request: &HttpRequest) -> Result<RawResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Rc<T> {
    fn round_trip(&self, request: &HttpRequest) -> Result<RawResponse, TransportError> {
        (**self).round_trip(request)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn round_trip(&self, request: &HttpRequest) -> Result<RawResponse, TransportError> {
        (**self).round_trip(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn round_trip(&self, request: &HttpRequest) -> Result<RawResponse, TransportError> {
        (**self).round_trip(request)
    }
}

/// Options for the built-in ureq transport.
#[derive(Debug, Clone, Default)]
pub struct TransportConfig {
    /// Skip TLS certificate verification.
    pub insecure_tls: bool,
    /// Overall per-call timeout. `None` leaves ureq's default.
    pub timeout: Option<Duration>,
}

/// `Transport` backed by a blocking `ureq::Agent`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl std::fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::with_config(&TransportConfig::default())
    }

    /// A transport that accepts any server certificate.
    pub fn insecure() -> Self {
        Self::with_config(&TransportConfig {
            insecure_tls: true,
            ..TransportConfig::default()
        })
    }

    pub fn with_config(config: &TransportConfig) -> Self {
        let mut builder = ureq::Agent::config_builder().http_status_as_error(false);
        if config.insecure_tls {
            builder = builder.tls_config(
                ureq::tls::TlsConfig::builder()
                    .disable_verification(true)
                    .build(),
            );
        }
        if let Some(timeout) = config.timeout {
            builder = builder.timeout_global(Some(timeout));
        }
        Self {
            agent: builder.build().new_agent(),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn round_trip(&self, request: &HttpRequest) -> Result<RawResponse, TransportError> {
        let mut builder = http::Request::builder()
            .method(request.method.to_http())
            .uri(request.url.as_str());
        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }

        let response = match &request.body {
            Some(body) => self.agent.run(builder.body(body.clone())?)?,
            None => self.agent.run(builder.body(())?)?,
        };

        let (parts, body) = response.into_parts();
        Ok(RawResponse {
            status: parts.status,
            version: parts.version,
            headers: parts.headers,
            body: Box::new(body.into_reader()),
        })
    }
}
