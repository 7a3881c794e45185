//! Structured error context for signalhub services.
//!
//! Failures leaving a service are wrapped in a [`ServiceError`] that names
//! the service and operation, keeps the original error as its source and
//! carries the original [`ErrorKind`](signalhub_core::ErrorKind).
//!
//! - [`with_error_handling`] wraps a single async operation
//! - [`ErrorContextLayer`] (or [`with_service_error_handling`]) wraps every
//!   call of a Tower service
//! - [`with_retry`] retries any async operation under a [`RetryConfig`]
//! - [`format_service_error_for_user`] turns a [`ServiceError`] into
//!   end-user text
//!
//! # Examples
//!
//! ```
//! use signalhub_errors::{
//!     format_service_error_for_user, with_error_handling, ErrorHandlingOptions, OperationError,
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let delete = with_error_handling(
//!     |id: u64| async move { Err::<(), _>(OperationError::delete(format!("Failed to delete {id}"))) },
//!     "BrandService",
//!     "delete",
//!     ErrorHandlingOptions::default(),
//! );
//!
//! let err = delete(7).await.unwrap_err();
//! assert_eq!(err.to_string(), "BrandService.delete failed: Failed to delete 7");
//! assert_eq!(
//!     format_service_error_for_user(&err),
//!     "Unable to delete the item. Please try again."
//! );
//! # }
//! ```

mod error;
mod format;
mod handler;
mod layer;
mod retry;

pub use error::{
    get_original_error, is_service_error, ErrorContextInfo, OperationError, ServiceError,
};
pub use format::{format_service_error_for_user, CONNECTIVITY_MESSAGE};
pub use handler::{with_error_handling, ErrorHandlingOptions};
pub use layer::{with_service_error_handling, ErrorContext, ErrorContextLayer};
pub use retry::{with_retry, RetryConfig, RetryConfigBuilder};
