//! Turning errors into end-user text.

use crate::error::ServiceError;
use signalhub_core::{Classify, ErrorKind};

/// Shown when the backend could not be reached.
pub const CONNECTIVITY_MESSAGE: &str =
    "Unable to connect to the server. Please check your internet connection and try again.";

/// Renders `error` for display to an end user.
///
/// Connectivity failures and data-store write failures get fixed, generic
/// wording; everything else shows the original error's message.
pub fn format_service_error_for_user(error: &ServiceError) -> String {
    match error.kind() {
        ErrorKind::Network | ErrorKind::Timeout | ErrorKind::Cancelled => {
            CONNECTIVITY_MESSAGE.to_string()
        }
        ErrorKind::Create => "Unable to create the item. Please try again.".to_string(),
        ErrorKind::Update => "Unable to update the item. Please try again.".to_string(),
        ErrorKind::Delete => "Unable to delete the item. Please try again.".to_string(),
        _ => error.original_error().to_string(),
    }
}
