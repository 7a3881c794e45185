//! Error taxonomy shared across signalhub.
//!
//! Every error raised inside the outbound-request layer carries an
//! [`ErrorKind`] chosen at the point it is raised. Retry predicates and the
//! user-facing message formatter branch on the kind instead of on message
//! text.

use std::fmt;
use std::io;

/// Opaque error type used where the original error is type-erased.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Category of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorKind {
    /// The transport failed before a response arrived (DNS, connect, reset).
    Network,
    /// A configured deadline elapsed.
    Timeout,
    /// The caller cancelled the operation.
    Cancelled,
    /// The remote answered with a non-success HTTP status.
    HttpStatus,
    /// The remote answered but its response envelope reported a failure.
    Envelope,
    /// Local configuration is missing or invalid (e.g. no credentials).
    Configuration,
    /// A response body could not be decoded.
    Decode,
    /// A create operation against the data store failed.
    Create,
    /// An update operation against the data store failed.
    Update,
    /// A delete operation against the data store failed.
    Delete,
    /// Anything else.
    Other,
}

impl ErrorKind {
    /// Returns true for failures that may succeed if simply tried again.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            ErrorKind::Network | ErrorKind::Timeout | ErrorKind::Cancelled
        )
    }

    /// Stable lowercase name, suitable for log fields and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Network => "network",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::HttpStatus => "http_status",
            ErrorKind::Envelope => "envelope",
            ErrorKind::Configuration => "configuration",
            ErrorKind::Decode => "decode",
            ErrorKind::Create => "create",
            ErrorKind::Update => "update",
            ErrorKind::Delete => "delete",
            ErrorKind::Other => "other",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that know their own [`ErrorKind`].
pub trait Classify {
    /// The category of this error.
    fn kind(&self) -> ErrorKind;
}

impl Classify for ErrorKind {
    fn kind(&self) -> ErrorKind {
        *self
    }
}

impl Classify for io::Error {
    fn kind(&self) -> ErrorKind {
        match io::Error::kind(self) {
            io::ErrorKind::TimedOut => ErrorKind::Timeout,
            io::ErrorKind::Interrupted => ErrorKind::Cancelled,
            io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
            | io::ErrorKind::AddrNotAvailable
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::UnexpectedEof => ErrorKind::Network,
            _ => classify_message(&self.to_string()),
        }
    }
}

impl Classify for BoxError {
    fn kind(&self) -> ErrorKind {
        if let Some(io) = self.downcast_ref::<io::Error>() {
            return Classify::kind(io);
        }
        classify_message(&self.to_string())
    }
}

/// Best-effort classification of a foreign error from its message.
///
/// Only used for errors that did not originate in signalhub and therefore
/// carry no kind of their own.
pub fn classify_message(message: &str) -> ErrorKind {
    let message = message.trim_start().to_ascii_lowercase();

    if message.starts_with("failed to create") {
        ErrorKind::Create
    } else if message.starts_with("failed to update") {
        ErrorKind::Update
    } else if message.starts_with("failed to delete") {
        ErrorKind::Delete
    } else if message.contains("timed out") || message.contains("timeout") {
        ErrorKind::Timeout
    } else if message.contains("abort") || message.contains("cancel") {
        ErrorKind::Cancelled
    } else if message.contains("network")
        || message.contains("connection")
        || message.contains("failed to fetch")
        || message.contains("econnrefused")
        || message.contains("econnreset")
    {
        ErrorKind::Network
    } else {
        ErrorKind::Other
    }
}
