use signalhub_core::{ErrorKind, HubEvent};
use std::time::{Duration, Instant};

/// Events emitted by the request executor.
#[derive(Debug, Clone)]
pub enum RequestEvent {
    /// An attempt failed and another one will follow after `delay`.
    Retry {
        executor_name: String,
        timestamp: Instant,
        label: String,
        attempt: u32,
        delay: Duration,
    },
    /// The call succeeded.
    Success {
        executor_name: String,
        timestamp: Instant,
        label: String,
        attempts: u32,
        duration: Duration,
    },
    /// The call failed for good.
    Failure {
        executor_name: String,
        timestamp: Instant,
        label: String,
        attempts: u32,
        kind: ErrorKind,
    },
}

impl HubEvent for RequestEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RequestEvent::Retry { .. } => "retry",
            RequestEvent::Success { .. } => "success",
            RequestEvent::Failure { .. } => "failure",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            RequestEvent::Retry { timestamp, .. }
            | RequestEvent::Success { timestamp, .. }
            | RequestEvent::Failure { timestamp, .. } => *timestamp,
        }
    }

    fn source_name(&self) -> &str {
        match self {
            RequestEvent::Retry { executor_name, .. }
            | RequestEvent::Success { executor_name, .. }
            | RequestEvent::Failure { executor_name, .. } => executor_name,
        }
    }

    fn failure(&self) -> Option<ErrorKind> {
        match self {
            RequestEvent::Failure { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
