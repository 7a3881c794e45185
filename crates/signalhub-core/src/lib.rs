//! Core infrastructure for signalhub.
//!
//! This crate provides the pieces every other signalhub crate shares:
//! - Event system for observability
//! - The [`ErrorKind`] taxonomy assigned where an error is raised
//! - Exponential backoff used by both retry loops

pub mod backoff;
pub mod error;
pub mod events;

pub use backoff::ExponentialBackoff;
pub use error::{classify_message, BoxError, Classify, ErrorKind};
pub use events::{EventListener, EventListeners, EventTally, FnListener, HubEvent};
