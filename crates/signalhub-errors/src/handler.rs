//! Wrapping a single async operation.

use crate::error::{ErrorContextInfo, ServiceError};
use futures::future::BoxFuture;
use signalhub_core::{BoxError, Classify};
use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;
use std::time::SystemTime;

#[cfg(feature = "tracing")]
use tracing::error;

/// How failures are decorated.
#[derive(Debug, Clone)]
pub struct ErrorHandlingOptions {
    pub(crate) log_errors: bool,
    pub(crate) include_context: bool,
    pub(crate) caller: Option<String>,
}

impl ErrorHandlingOptions {
    /// Defaults: errors are logged, no context is attached.
    pub fn new() -> Self {
        Self {
            log_errors: true,
            include_context: false,
            caller: None,
        }
    }

    /// Whether wrapped errors are logged at `error` level.
    pub fn log_errors(mut self, log: bool) -> Self {
        self.log_errors = log;
        self
    }

    /// Whether call arguments and a timestamp are attached to wrapped errors.
    pub fn include_context(mut self, include: bool) -> Self {
        self.include_context = include;
        self
    }

    /// Caller identity attached to the context.
    pub fn caller(mut self, caller: impl Into<String>) -> Self {
        self.caller = Some(caller.into());
        self
    }
}

impl Default for ErrorHandlingOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the [`ServiceError`] for a failed call, logging it if configured.
///
/// `args` is the `Debug` rendering of the call's arguments, taken before the
/// call when context is enabled.
pub(crate) fn decorate<E>(
    service_name: &str,
    operation: &str,
    error: E,
    args: Option<String>,
    options: &ErrorHandlingOptions,
) -> ServiceError
where
    E: Classify + Into<BoxError>,
{
    let mut wrapped = ServiceError::new(service_name, operation, error);

    if options.include_context {
        wrapped = wrapped.with_context(ErrorContextInfo {
            args: args.unwrap_or_default(),
            timestamp: SystemTime::now(),
            caller: options.caller.clone(),
        });
    }

    #[cfg(feature = "tracing")]
    if options.log_errors {
        error!(
            service = service_name,
            operation,
            kind = %wrapped.kind(),
            caller = options.caller.as_deref(),
            error = %wrapped,
            "service operation failed"
        );
    }

    wrapped
}

/// Wraps `op` so every failure becomes a [`ServiceError`] named
/// `service_name.operation`.
///
/// Successful results pass through unchanged. The argument is formatted
/// with `Debug` before the call when context is enabled.
///
/// # Examples
///
/// ```
/// use signalhub_errors::{with_error_handling, ErrorHandlingOptions, OperationError};
///
/// # #[tokio::main]
/// # async fn main() {
/// let create = with_error_handling(
///     |name: String| async move {
///         Err::<(), _>(OperationError::create(format!("Failed to create {name}")))
///     },
///     "BrandService",
///     "create",
///     ErrorHandlingOptions::new().include_context(true),
/// );
///
/// let err = create("acme".to_string()).await.unwrap_err();
/// assert_eq!(err.to_string(), "BrandService.create failed: Failed to create acme");
/// assert_eq!(err.context().unwrap().args, "\"acme\"");
/// # }
/// ```
pub fn with_error_handling<F, Fut, A, T, E>(
    op: F,
    service_name: impl Into<String>,
    operation: impl Into<String>,
    options: ErrorHandlingOptions,
) -> impl Fn(A) -> BoxFuture<'static, Result<T, ServiceError>> + Clone + Send + Sync + 'static
where
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    A: Debug + Send + 'static,
    T: Send + 'static,
    E: Classify + Into<BoxError> + 'static,
{
    let op = Arc::new(op);
    let service_name: Arc<str> = service_name.into().into();
    let operation: Arc<str> = operation.into().into();
    let options = Arc::new(options);

    move |args: A| {
        let args_repr = options.include_context.then(|| format!("{args:?}"));
        let fut = op(args);
        let service_name = Arc::clone(&service_name);
        let operation = Arc::clone(&operation);
        let options = Arc::clone(&options);

        Box::pin(async move {
            fut.await
                .map_err(|error| decorate(&service_name, &operation, error, args_repr, &options))
        })
    }
}
