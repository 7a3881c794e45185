use signalhub_core::{ErrorKind, HubEvent};
use std::time::Instant;

/// Events emitted by the fallback client.
#[derive(Debug, Clone)]
pub enum FallbackEvent {
    /// The response was served from the cache.
    CacheHit {
        client_name: String,
        timestamp: Instant,
        key: String,
    },
    /// An endpoint failed; the next one, if any, will be tried.
    EndpointFailed {
        client_name: String,
        timestamp: Instant,
        endpoint: String,
        kind: ErrorKind,
    },
    /// An endpoint returned a valid response.
    Succeeded {
        client_name: String,
        timestamp: Instant,
        endpoint: String,
        attempts: usize,
    },
    /// Every endpoint failed.
    Exhausted {
        client_name: String,
        timestamp: Instant,
        attempts: usize,
    },
}

impl HubEvent for FallbackEvent {
    fn event_type(&self) -> &'static str {
        match self {
            FallbackEvent::CacheHit { .. } => "cache_hit",
            FallbackEvent::EndpointFailed { .. } => "endpoint_failed",
            FallbackEvent::Succeeded { .. } => "succeeded",
            FallbackEvent::Exhausted { .. } => "exhausted",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            FallbackEvent::CacheHit { timestamp, .. }
            | FallbackEvent::EndpointFailed { timestamp, .. }
            | FallbackEvent::Succeeded { timestamp, .. }
            | FallbackEvent::Exhausted { timestamp, .. } => *timestamp,
        }
    }

    fn source_name(&self) -> &str {
        match self {
            FallbackEvent::CacheHit { client_name, .. }
            | FallbackEvent::EndpointFailed { client_name, .. }
            | FallbackEvent::Succeeded { client_name, .. }
            | FallbackEvent::Exhausted { client_name, .. } => client_name,
        }
    }

    fn failure(&self) -> Option<ErrorKind> {
        match self {
            FallbackEvent::EndpointFailed { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
