//! Decorating a whole service.

use crate::error::ServiceError;
use crate::handler::{decorate, ErrorHandlingOptions};
use futures::future::BoxFuture;
use signalhub_core::{BoxError, Classify};
use std::fmt::Debug;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::layer::Layer;
use tower::Service;

type OperationName<Req> = Arc<dyn Fn(&Req) -> String + Send + Sync>;

/// A Tower layer wrapping every call of a service in error context.
///
/// Each failed call becomes a [`ServiceError`] named after the service and
/// the operation derived from the request.
///
/// # Examples
///
/// ```
/// use signalhub_errors::ErrorContextLayer;
/// use std::io;
/// use tower::{service_fn, ServiceBuilder, ServiceExt};
///
/// # #[tokio::main]
/// # async fn main() {
/// #[derive(Debug)]
/// enum Call {
///     List,
///     Chat(String),
/// }
///
/// let service = ServiceBuilder::new()
///     .layer(
///         ErrorContextLayer::new("AssistantService").operation(|call: &Call| match call {
///             Call::List => "list".to_string(),
///             Call::Chat(_) => "chat".to_string(),
///         }),
///     )
///     .service(service_fn(|_call: Call| async {
///         Err::<(), _>(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"))
///     }));
///
/// let err = service.oneshot(Call::List).await.unwrap_err();
/// assert_eq!(err.to_string(), "AssistantService.list failed: refused");
/// # }
/// ```
pub struct ErrorContextLayer<Req> {
    service_name: Arc<str>,
    operation: OperationName<Req>,
    options: Arc<ErrorHandlingOptions>,
}

impl<Req: 'static> ErrorContextLayer<Req> {
    /// Creates a layer for `service_name`.
    ///
    /// Every call is named `call` until [`operation`](Self::operation) is set.
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into().into(),
            operation: Arc::new(unnamed_operation::<Req>),
            options: Arc::new(ErrorHandlingOptions::default()),
        }
    }

    /// Derives the operation name from each request.
    pub fn operation<F>(mut self, f: F) -> Self
    where
        F: Fn(&Req) -> String + Send + Sync + 'static,
    {
        self.operation = Arc::new(f);
        self
    }

    /// Sets logging and context options.
    pub fn options(mut self, options: ErrorHandlingOptions) -> Self {
        self.options = Arc::new(options);
        self
    }
}

fn unnamed_operation<Req>(_: &Req) -> String {
    "call".to_string()
}

impl<Req> Clone for ErrorContextLayer<Req> {
    fn clone(&self) -> Self {
        Self {
            service_name: Arc::clone(&self.service_name),
            operation: Arc::clone(&self.operation),
            options: Arc::clone(&self.options),
        }
    }
}

impl<S, Req> Layer<S> for ErrorContextLayer<Req> {
    type Service = ErrorContext<S, Req>;

    fn layer(&self, inner: S) -> Self::Service {
        ErrorContext {
            inner,
            layer: self.clone(),
        }
    }
}

/// Wraps `service` so each of its operations reports failures as
/// [`ServiceError`]s.
///
/// Shorthand for applying an [`ErrorContextLayer`] with the given
/// operation-name extractor and options.
pub fn with_service_error_handling<S, Req, F>(
    service: S,
    service_name: impl Into<String>,
    operation: F,
    options: ErrorHandlingOptions,
) -> ErrorContext<S, Req>
where
    Req: 'static,
    F: Fn(&Req) -> String + Send + Sync + 'static,
{
    ErrorContextLayer::new(service_name)
        .operation(operation)
        .options(options)
        .layer(service)
}

/// A service whose failures carry service and operation context.
pub struct ErrorContext<S, Req> {
    inner: S,
    layer: ErrorContextLayer<Req>,
}

impl<S: Clone, Req> Clone for ErrorContext<S, Req> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            layer: self.layer.clone(),
        }
    }
}

impl<S, Req> ErrorContext<S, Req> {
    /// The wrapped service.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Unwraps into the inner service.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S, Req> Service<Req> for ErrorContext<S, Req>
where
    S: Service<Req>,
    S::Future: Send + 'static,
    S::Error: Classify + Into<BoxError>,
    Req: Debug,
{
    type Response = S::Response;
    type Error = ServiceError;
    type Future = BoxFuture<'static, Result<S::Response, ServiceError>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        let layer = &self.layer;
        self.inner.poll_ready(cx).map_err(|error| {
            decorate(
                &layer.service_name,
                "poll_ready",
                error,
                None,
                &layer.options,
            )
        })
    }

    fn call(&mut self, req: Req) -> Self::Future {
        let operation = (self.layer.operation)(&req);
        let args = self.layer.options.include_context.then(|| format!("{req:?}"));
        let service_name = Arc::clone(&self.layer.service_name);
        let options = Arc::clone(&self.layer.options);
        let fut = self.inner.call(req);

        Box::pin(async move {
            fut.await
                .map_err(|error| decorate(&service_name, &operation, error, args, &options))
        })
    }
}
