//! Deferred, re-executable HTTP request builder.
//!
//! # Design
//! `RequestBuilder` accumulates configuration through chained `&mut self`
//! calls and only turns it into a wire request in `finalize`, right before the
//! transport is invoked. Parameters therefore reflect whatever state the
//! builder is in at that moment: GET appends them to the URL, POST encodes them
//! as a form body unless an explicit body was supplied.
//!
//! Execution is an explicit two-state machine. `NotExecuted` derives the URL
//! from the current configuration on every query; `Executed` holds the request
//! that was actually sent, the URL string it was built from, and the memoized
//! `Response`. A GET URL is always derived from the current parameters; other
//! methods report the sent URL verbatim once executed. `execute` serves the
//! cached response without touching the network; `rearm` moves back to
//! `NotExecuted`.

use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::HeaderMap;
use serde::Serialize;
use url::Url;

use crate::error::{HttpError, Result};
use crate::http::{HttpMethod, HttpRequest, Protocol, RequestBody};
use crate::params::{self, Params};
use crate::response::Response;
use crate::transport::{Transport, UreqTransport};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";

enum Execution {
    NotExecuted,
    Executed {
        request: HttpRequest,
        sent_url: String,
        response: Response,
    },
}

/// Fluent builder for a reusable HTTP request.
pub struct RequestBuilder {
    target_url: String,
    method: HttpMethod,
    protocol: Protocol,
    encode_params: bool,
    params: Params,
    headers: HeaderMap,
    invalid_header: Option<String>,
    body: Option<RequestBody>,
    transport: Box<dyn Transport>,
    state: Execution,
}

impl RequestBuilder {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            target_url: url.into(),
            method,
            protocol: Protocol::Http11,
            encode_params: true,
            params: Params::new(),
            headers: HeaderMap::new(),
            invalid_header: None,
            body: None,
            transport: Box::new(UreqTransport::new()),
            state: Execution::NotExecuted,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    // -----------------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------------

    /// Replace the target URL. It is only validated when the request is sent.
    pub fn set_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.target_url = url.into();
        self
    }

    pub fn param(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn params<K, V>(&mut self, params: impl IntoIterator<Item = (K, V)>) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in params {
            self.params.insert(key.into(), value.into());
        }
        self
    }

    /// Set a header, replacing any existing value for the same name.
    ///
    /// An invalid name or value does not interrupt the chain; the first one
    /// seen is reported as `InvalidHeader` when the request is finalized.
    pub fn header(&mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> &mut Self {
        let (key, value) = (key.as_ref(), value.as_ref());
        match (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            (Err(e), _) => self.record_invalid_header(format!("{key:?}: {e}")),
            (_, Err(e)) => self.record_invalid_header(format!("{key:?} value: {e}")),
        }
        self
    }

    pub fn headers<K, V>(&mut self, headers: impl IntoIterator<Item = (K, V)>) -> &mut Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in headers {
            self.header(key, value);
        }
        self
    }

    fn record_invalid_header(&mut self, msg: String) {
        log::warn!(target: "httpcli", "ignoring invalid header {msg}");
        self.invalid_header.get_or_insert(msg);
    }

    /// Attach an explicit body. It takes precedence over any parameters.
    pub fn raw_body(&mut self, body: impl Into<RequestBody>) -> &mut Self {
        self.body = Some(body.into());
        self
    }

    /// Attach a JSON body verbatim and stop escaping parameters.
    pub fn json_body(&mut self, content: impl Into<String>) -> &mut Self {
        self.raw_body(content.into());
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        self.encode_params = false;
        self
    }

    /// Serialize `value` with serde_json and attach it as in `json_body`.
    pub fn json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<&mut Self> {
        let content = serde_json::to_string(value).map_err(HttpError::Serialize)?;
        Ok(self.json_body(content))
    }

    pub fn protocol(&mut self, protocol: Protocol) -> &mut Self {
        self.protocol = protocol;
        self
    }

    pub fn transport(&mut self, transport: impl Transport + 'static) -> &mut Self {
        self.transport = Box::new(transport);
        self
    }

    /// Use a ureq transport that skips TLS certificate verification.
    pub fn insecure_tls(&mut self) -> &mut Self {
        self.transport(UreqTransport::insecure())
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn request_headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Whether parameters are percent-escaped when encoded.
    pub fn encodes_params(&self) -> bool {
        self.encode_params
    }

    /// The request that produced the cached response, if any.
    pub fn last_request(&self) -> Option<&HttpRequest> {
        match &self.state {
            Execution::Executed { request, .. } => Some(request),
            Execution::NotExecuted => None,
        }
    }

    /// The cached response, if the request has been executed.
    pub fn response(&self) -> Option<&Response> {
        match &self.state {
            Execution::Executed { response, .. } => Some(response),
            Execution::NotExecuted => None,
        }
    }

    /// The request body: the explicit body if set, else the parameter encoding
    /// for POST (computed on every call), else `None`.
    pub fn body(&self) -> Option<Vec<u8>> {
        if let Some(body) = &self.body {
            return Some(body.as_bytes().to_vec());
        }
        match self.method {
            HttpMethod::Post => Some(self.encoded_params().into_bytes()),
            _ => None,
        }
    }

    /// The request URL.
    ///
    /// GET derives it from the current parameters on every call, executed or
    /// not. Other methods return the base URL, or once executed the exact
    /// string that was sent.
    pub fn url(&self) -> String {
        match (&self.state, self.method) {
            (_, HttpMethod::Get) | (Execution::NotExecuted, _) => self.working_url(),
            (Execution::Executed { sent_url, .. }, _) => sent_url.clone(),
        }
    }

    fn encoded_params(&self) -> String {
        params::encode(&self.params, self.encode_params)
    }

    fn working_url(&self) -> String {
        match self.method {
            HttpMethod::Get => params::append_query(&self.target_url, &self.encoded_params()),
            _ => self.target_url.clone(),
        }
    }

    // -----------------------------------------------------------------------
    // Execution
    // -----------------------------------------------------------------------

    /// Build the wire request from the current configuration without sending.
    pub fn finalize(&self) -> Result<HttpRequest> {
        if let Some(msg) = &self.invalid_header {
            return Err(HttpError::InvalidHeader(msg.clone()));
        }

        let mut headers = self.headers.clone();
        let mut body = self.body.as_ref().map(|b| b.as_bytes().to_vec());

        if !self.params.is_empty() && self.method == HttpMethod::Post && body.is_none() {
            if self.encode_params {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
            }
            body = Some(self.encoded_params().into_bytes());
        }

        let working_url = self.working_url();
        let url = Url::parse(&working_url).map_err(|source| HttpError::UrlParse {
            url: working_url,
            source,
        })?;

        Ok(HttpRequest {
            method: self.method,
            url,
            protocol: self.protocol,
            headers,
            body,
        })
    }

    /// Return the cached response, or send the request and cache the result.
    pub fn execute(&mut self) -> Result<&Response> {
        if matches!(self.state, Execution::Executed { .. }) {
            log::trace!(target: "httpcli", "reusing cached response for {}", self.url());
        } else {
            self.send()?;
        }
        self.response().ok_or(HttpError::NilResponse)
    }

    /// Send the request unconditionally, replacing any cached response.
    ///
    /// The whole body is read before returning, so stream errors surface here.
    pub fn send(&mut self) -> Result<&Response> {
        let request = self.finalize()?;
        log::debug!(
            target: "httpcli",
            "sending {} {} ({} body bytes)",
            request.method,
            request.url,
            request.content_length()
        );

        let sent_url = self.working_url();
        let raw = self.transport.round_trip(&request)?;
        let response = Response::new(raw);
        response.receive_bytes()?;
        log::debug!(
            target: "httpcli",
            "{} {} -> {}",
            request.method,
            request.url,
            response.status().unwrap_or_default()
        );

        self.state = Execution::Executed {
            request,
            sent_url,
            response,
        };
        self.response().ok_or(HttpError::NilResponse)
    }

    /// Drop the cached response so the next `execute` hits the network again.
    pub fn rearm(&mut self) -> &mut Self {
        if matches!(self.state, Execution::Executed { .. }) {
            log::trace!(target: "httpcli", "re-arming {} {}", self.method, self.target_url);
        }
        self.state = Execution::NotExecuted;
        self
    }

    /// Human-readable summary of the request and, if cached, its response.
    pub fn info(&self) -> String {
        let url = self.url();
        let (method, protocol, headers, body) = match &self.state {
            Execution::Executed { request, .. } => (
                request.method,
                request.protocol,
                &request.headers,
                request.body.clone(),
            ),
            Execution::NotExecuted => (self.method, self.protocol, &self.headers, self.body()),
        };

        let mut out = format!("{method} {url} {protocol}");
        for (name, value) in headers.iter() {
            out.push('\n');
            out.push_str(name.as_str());
            out.push(':');
            out.push_str(&String::from_utf8_lossy(value.as_bytes()));
        }
        if let Some(body) = body.filter(|b| !b.is_empty()) {
            out.push_str("\n\n");
            out.push_str(&String::from_utf8_lossy(&body));
        }
        if let Some(response) = self.response() {
            out.push_str("\n\n");
            out.push_str(&response.info());
        }
        out
    }
}

impl std::fmt::Debug for RequestBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("method", &self.method)
            .field("url", &self.target_url)
            .field("params", &self.params)
            .field("headers", &self.headers)
            .field("body", &self.body)
            .field("executed", &self.response().is_some())
            .finish_non_exhaustive()
    }
}
