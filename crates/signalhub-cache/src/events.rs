//! Events emitted by the TTL cache.

use signalhub_core::HubEvent;
use std::time::Instant;

/// Cache lifecycle events.
#[derive(Debug, Clone)]
pub enum CacheEvent {
    /// A read found a live entry.
    Hit {
        cache_name: String,
        timestamp: Instant,
        key: String,
    },
    /// A read found nothing, or only an expired entry.
    Miss {
        cache_name: String,
        timestamp: Instant,
        key: String,
    },
    /// A live entry was removed to make room for a new key.
    Eviction {
        cache_name: String,
        timestamp: Instant,
        key: String,
    },
    /// Expired entries were removed, lazily on read or by the sweeper.
    Expired {
        cache_name: String,
        timestamp: Instant,
        count: usize,
    },
}

impl HubEvent for CacheEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CacheEvent::Hit { .. } => "hit",
            CacheEvent::Miss { .. } => "miss",
            CacheEvent::Eviction { .. } => "eviction",
            CacheEvent::Expired { .. } => "expired",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            CacheEvent::Hit { timestamp, .. }
            | CacheEvent::Miss { timestamp, .. }
            | CacheEvent::Eviction { timestamp, .. }
            | CacheEvent::Expired { timestamp, .. } => *timestamp,
        }
    }

    fn source_name(&self) -> &str {
        match self {
            CacheEvent::Hit { cache_name, .. }
            | CacheEvent::Miss { cache_name, .. }
            | CacheEvent::Eviction { cache_name, .. }
            | CacheEvent::Expired { cache_name, .. } => cache_name,
        }
    }
}
