//! Error types produced by the decorator.

use signalhub_core::{BoxError, Classify, ErrorKind};
use std::error::Error;
use std::time::SystemTime;

/// Call details attached to a [`ServiceError`] when context is enabled.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorContextInfo {
    /// Debug rendering of the call's arguments.
    pub args: String,
    /// When the failure was observed.
    pub timestamp: SystemTime,
    /// Identity of the caller, if one was configured.
    pub caller: Option<String>,
}

/// Uniform failure of a named operation on a named service.
///
/// The original error is kept as [`source`](Error::source) and its
/// [`ErrorKind`] is carried over, so retry predicates and user-facing
/// formatting keep working through the wrapper.
#[derive(Debug, thiserror::Error)]
#[error("{service_name}.{operation} failed: {source}")]
pub struct ServiceError {
    service_name: String,
    operation: String,
    #[source]
    source: BoxError,
    kind: ErrorKind,
    timestamp: SystemTime,
    context: Option<ErrorContextInfo>,
}

impl ServiceError {
    /// Wraps `error` raised by `service_name.operation`.
    pub fn new<E>(service_name: impl Into<String>, operation: impl Into<String>, error: E) -> Self
    where
        E: Classify + Into<BoxError>,
    {
        let kind = error.kind();
        Self {
            service_name: service_name.into(),
            operation: operation.into(),
            source: error.into(),
            kind,
            timestamp: SystemTime::now(),
            context: None,
        }
    }

    /// Attaches call context.
    pub fn with_context(mut self, context: ErrorContextInfo) -> Self {
        self.context = Some(context);
        self
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// When the error was wrapped.
    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    pub fn context(&self) -> Option<&ErrorContextInfo> {
        self.context.as_ref()
    }

    /// The error this one wraps.
    pub fn original_error(&self) -> &(dyn Error + Send + Sync + 'static) {
        &*self.source
    }

    /// Unwraps into the original error.
    pub fn into_original(self) -> BoxError {
        self.source
    }
}

impl Classify for ServiceError {
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// Failure of a create, update or delete against the data store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct OperationError {
    kind: ErrorKind,
    message: String,
}

impl OperationError {
    pub fn create(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Create, message)
    }

    pub fn update(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Update, message)
    }

    pub fn delete(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Delete, message)
    }

    /// An error of any other kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl Classify for OperationError {
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// Returns true if `error` is a [`ServiceError`].
pub fn is_service_error(error: &(dyn Error + 'static)) -> bool {
    error.is::<ServiceError>()
}

/// Returns the error a [`ServiceError`] wraps, or `error` itself otherwise.
pub fn get_original_error<'a>(error: &'a (dyn Error + 'static)) -> &'a (dyn Error + 'static) {
    match error.downcast_ref::<ServiceError>() {
        Some(service_error) => service_error.original_error(),
        None => error,
    }
}
