//! Errors raised by the request executor.

use signalhub_core::{Classify, ErrorKind};
use std::time::Duration;

/// Failure of a single logical request (after any retries).
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// The configured deadline elapsed before the call finished.
    #[error("request to {url} timed out after {timeout:?}")]
    Timeout {
        /// Target address.
        url: String,
        /// Deadline that elapsed.
        timeout: Duration,
    },

    /// The caller's cancellation token fired.
    #[error("request to {url} was aborted")]
    Cancelled {
        /// Target address.
        url: String,
    },

    /// The transport failed before a response arrived.
    #[error("network error calling {url}: {source}")]
    Network {
        /// Target address.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}{}", reason_suffix(.status_text))]
    Status {
        /// Target address.
        url: String,
        /// Numeric status code.
        status: u16,
        /// Canonical reason phrase, empty if unknown.
        status_text: String,
    },

    /// The response body was not the expected JSON.
    #[error("invalid response body from {url}: {source}")]
    Decode {
        /// Target address.
        url: String,
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },

    /// The request could not be built (bad URL, bad header).
    #[error("invalid request to {url}: {message}")]
    InvalidRequest {
        /// Target address.
        url: String,
        /// What was wrong.
        message: String,
    },
}

impl RequestError {
    pub(crate) fn from_transport(url: &str, source: reqwest::Error) -> Self {
        if source.is_builder() {
            RequestError::InvalidRequest {
                url: url.to_string(),
                message: source.to_string(),
            }
        } else {
            RequestError::Network {
                url: url.to_string(),
                source,
            }
        }
    }

    /// The HTTP status, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The address this request targeted.
    pub fn url(&self) -> &str {
        match self {
            RequestError::Timeout { url, .. }
            | RequestError::Cancelled { url }
            | RequestError::Network { url, .. }
            | RequestError::Status { url, .. }
            | RequestError::Decode { url, .. }
            | RequestError::InvalidRequest { url, .. } => url,
        }
    }

    /// Whether the executor's retry loop should try again after this error.
    ///
    /// Network failures and timeouts are always retried. Server errors (5xx)
    /// and 429 are retried when `retry_server_errors` is set; every other
    /// status, caller cancellation, decode and build errors fail fast.
    pub fn is_retryable(&self, retry_server_errors: bool) -> bool {
        match self {
            RequestError::Network { .. } | RequestError::Timeout { .. } => true,
            RequestError::Status { status, .. } => {
                retry_server_errors && (*status >= 500 || *status == 429)
            }
            RequestError::Cancelled { .. }
            | RequestError::Decode { .. }
            | RequestError::InvalidRequest { .. } => false,
        }
    }
}

fn reason_suffix(status_text: &str) -> String {
    if status_text.is_empty() {
        String::new()
    } else {
        format!(": {status_text}")
    }
}

impl Classify for RequestError {
    fn kind(&self) -> ErrorKind {
        match self {
            RequestError::Timeout { .. } => ErrorKind::Timeout,
            RequestError::Cancelled { .. } => ErrorKind::Cancelled,
            RequestError::Network { .. } => ErrorKind::Network,
            RequestError::Status { .. } => ErrorKind::HttpStatus,
            RequestError::Decode { .. } => ErrorKind::Decode,
            RequestError::InvalidRequest { .. } => ErrorKind::Configuration,
        }
    }
}
