//! Tests for the request executor, organized into:
//!
//! - **health**: status thresholds over recorded call metrics
//! - **retry_policy**: which failures are retried, against a mock server
//! - **monitor**: the performance monitor on its own and fed by the executor

mod health;
mod monitor;
mod retry_policy;
