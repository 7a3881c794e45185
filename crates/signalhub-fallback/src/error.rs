//! Errors returned by the assistant API client.

use signalhub_core::{Classify, ErrorKind};
use signalhub_executor::RequestError;

/// Errors returned by the fallback client.
#[derive(Debug, thiserror::Error)]
pub enum FallbackError {
    /// Required settings are missing; raised before any network access.
    #[error("assistant API misconfigured: {0}")]
    Configuration(String),

    /// The last endpoint tried failed at the transport or HTTP level.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// An endpoint answered, but its envelope reported a failure.
    #[error("assistant API error {code} from {endpoint}: {message}")]
    Envelope {
        endpoint: String,
        code: i64,
        message: String,
    },

    /// Every endpoint was tried and none recorded an error.
    #[error("unknown error: no endpoint produced a response")]
    Unknown,
}

impl FallbackError {
    /// The underlying request error, if any.
    pub fn request_error(&self) -> Option<&RequestError> {
        match self {
            FallbackError::Request(e) => Some(e),
            _ => None,
        }
    }
}

impl Classify for FallbackError {
    fn kind(&self) -> ErrorKind {
        match self {
            FallbackError::Configuration(_) => ErrorKind::Configuration,
            FallbackError::Request(e) => e.kind(),
            FallbackError::Envelope { .. } => ErrorKind::Envelope,
            FallbackError::Unknown => ErrorKind::Other,
        }
    }
}
