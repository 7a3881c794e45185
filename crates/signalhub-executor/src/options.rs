//! Per-call request options.

use reqwest::Method;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Method, headers, query, body and cancellation for one call.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub(crate) method: Method,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) body: Option<serde_json::Value>,
    pub(crate) timeout: Option<Duration>,
    pub(crate) cancel: Option<CancellationToken>,
}

impl RequestOptions {
    /// Options for a request with the given method and nothing else.
    pub fn new(method: Method) -> Self {
        Self {
            method,
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
            timeout: None,
            cancel: None,
        }
    }

    /// A `GET` request.
    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    /// A `POST` request.
    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    /// Sends `body` as JSON.
    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Adds a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Appends a query parameter.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Overrides the executor's timeout for this call.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Aborts the call when `token` is cancelled.
    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// The HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The JSON body, if any.
    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::get()
    }
}
