//! Tests for error context decoration, organized into:
//!
//! - **decorator**: wrapping functions and Tower services
//! - **retry_timing**: the generic retry wrapper under a paused clock
//! - **formatting**: user-facing messages by error kind

mod formatting;
