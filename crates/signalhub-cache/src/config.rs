//! Configuration for the TTL cache.

use crate::events::CacheEvent;
use crate::TtlCache;
use signalhub_core::{EventListener, EventListeners, FnListener};
use std::marker::PhantomData;
use std::time::Duration;

/// Configuration for a [`TtlCache`].
pub struct CacheConfig {
    pub(crate) max_size: usize,
    pub(crate) default_ttl: Duration,
    pub(crate) sweep_interval: Duration,
    pub(crate) event_listeners: EventListeners<CacheEvent>,
    pub(crate) name: String,
}

impl CacheConfig {
    /// Maximum number of entries.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// TTL applied by [`TtlCache::set`].
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Interval between background sweeps.
    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }
}

/// Builder for a [`TtlCache`].
pub struct CacheConfigBuilder<V> {
    max_size: usize,
    default_ttl: Duration,
    sweep_interval: Duration,
    event_listeners: EventListeners<CacheEvent>,
    name: String,
    _value: PhantomData<fn() -> V>,
}

impl<V> CacheConfigBuilder<V>
where
    V: Clone + Send + 'static,
{
    /// Creates a builder with default values.
    pub fn new() -> Self {
        Self {
            max_size: 100,
            default_ttl: Duration::from_secs(5 * 60),
            sweep_interval: Duration::from_secs(60),
            event_listeners: EventListeners::new(),
            name: String::from("<unnamed>"),
            _value: PhantomData,
        }
    }

    /// Sets the maximum number of entries.
    ///
    /// Default: 100
    pub fn max_size(mut self, size: usize) -> Self {
        self.max_size = size;
        self
    }

    /// Sets the TTL used when none is given explicitly.
    ///
    /// Default: 5 minutes
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Sets how often the background sweeper scans for expired entries.
    ///
    /// Default: 60 seconds
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Sets the name of this cache for logs, metrics and events.
    ///
    /// Default: `"<unnamed>"`
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a listener for every cache event.
    pub fn listener<L>(mut self, listener: L) -> Self
    where
        L: EventListener<CacheEvent> + 'static,
    {
        self.event_listeners.add(listener);
        self
    }

    /// Called with the key on every cache hit.
    pub fn on_hit<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let CacheEvent::Hit { key, .. } = event {
                f(key);
            }
        }));
        self
    }

    /// Called with the key on every cache miss.
    pub fn on_miss<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let CacheEvent::Miss { key, .. } = event {
                f(key);
            }
        }));
        self
    }

    /// Called with the evicted key when a live entry makes room for a new one.
    pub fn on_eviction<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let CacheEvent::Eviction { key, .. } = event {
                f(key);
            }
        }));
        self
    }

    /// Called with the number of expired entries removed.
    pub fn on_expired<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let CacheEvent::Expired { count, .. } = event {
                f(*count);
            }
        }));
        self
    }

    /// Builds the cache.
    pub fn build(self) -> TtlCache<V> {
        TtlCache::new(CacheConfig {
            max_size: self.max_size,
            default_ttl: self.default_ttl,
            sweep_interval: self.sweep_interval,
            event_listeners: self.event_listeners,
            name: self.name,
        })
    }
}

impl<V> Default for CacheConfigBuilder<V>
where
    V: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
