//! Bounded TTL cache for signalhub.
//!
//! [`TtlCache`] is a string-keyed store where every entry carries its own
//! time-to-live. Expired entries are treated as absent on read whether or not
//! they have been physically removed yet; a background sweeper removes the
//! ones nobody reads again.
//!
//! # Features
//!
//! - **Per-entry TTL** with a configurable default
//! - **Bounded size**: writing a new key into a full cache evicts the entry
//!   with the oldest write time
//! - **Cache-aside** via [`TtlCache::get_or_set`]
//! - **Pattern invalidation** with regular expressions over keys
//! - **Event system**: hit, miss, eviction and expiry callbacks
//!
//! The cache never fails: every operation is total over its internal map.
//!
//! # Examples
//!
//! ```
//! use signalhub_cache::TtlCache;
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let cache: TtlCache<String> = TtlCache::builder()
//!     .name("assistants")
//!     .max_size(500)
//!     .default_ttl(Duration::from_secs(600))
//!     .build();
//!
//! let _sweeper = cache.start_sweeper();
//!
//! cache.set("assistants:list:abc", "[]".to_string());
//! assert_eq!(cache.get("assistants:list:abc").as_deref(), Some("[]"));
//!
//! let removed = cache.invalidate_pattern("^assistants:list:");
//! assert_eq!(removed, 1);
//! # }
//! ```

mod config;
mod events;
mod store;
mod sweeper;

pub use config::{CacheConfig, CacheConfigBuilder};
pub use events::CacheEvent;
pub use sweeper::SweeperHandle;

use regex::Regex;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use store::{CacheStore, Lookup};

#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter, describe_gauge, gauge};

#[cfg(feature = "tracing")]
use tracing::{debug, trace, warn};

/// Point-in-time counters for a cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Entries currently stored, including expired ones not yet swept.
    pub size: usize,
    /// Configured capacity.
    pub max_size: usize,
    /// Reads that returned a value.
    pub hits: u64,
    /// Reads that returned nothing.
    pub misses: u64,
    /// Live entries removed to make room.
    pub evictions: u64,
    /// Expired entries removed, lazily or by sweeping.
    pub expirations: u64,
}

impl CacheStats {
    /// Fraction of reads that were hits, or 0.0 before the first read.
    pub fn hit_rate(&self) -> f64 {
        let reads = self.hits + self.misses;
        if reads == 0 {
            0.0
        } else {
            self.hits as f64 / reads as f64
        }
    }
}

struct Shared<V> {
    store: Mutex<CacheStore<V>>,
    config: CacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
}

/// A bounded, thread-safe key/value cache with per-entry expiry.
///
/// Cloning is cheap and yields a handle to the same store, so a single cache
/// built at startup can be handed to every consumer.
pub struct TtlCache<V> {
    inner: Arc<Shared<V>>,
}

impl<V> Clone for TtlCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> TtlCache<V>
where
    V: Clone + Send + 'static,
{
    /// Creates a cache from a configuration.
    pub fn new(config: CacheConfig) -> Self {
        #[cfg(feature = "metrics")]
        {
            describe_counter!(
                "signalhub_cache_requests_total",
                "Total number of cache reads (hits and misses)"
            );
            describe_counter!(
                "signalhub_cache_evictions_total",
                "Total number of capacity evictions"
            );
            describe_gauge!("signalhub_cache_size", "Current number of cache entries");
        }

        Self {
            inner: Arc::new(Shared {
                store: Mutex::new(CacheStore::new(config.max_size)),
                config,
                hits: AtomicU64::new(0),
                misses: AtomicU64::new(0),
                evictions: AtomicU64::new(0),
                expirations: AtomicU64::new(0),
            }),
        }
    }

    /// Creates a builder.
    pub fn builder() -> CacheConfigBuilder<V> {
        CacheConfigBuilder::new()
    }

    /// The configuration this cache was built with.
    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    /// The cache name.
    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    /// Returns the value for `key` if present and not expired.
    ///
    /// An expired entry is removed on the spot.
    pub fn get(&self, key: &str) -> Option<V> {
        let lookup = self.store().get(key, tokio::time::Instant::now());

        match lookup {
            Lookup::Hit(value) => {
                self.record_read(key, true);
                Some(value)
            }
            Lookup::Expired => {
                self.record_expired(1);
                self.record_read(key, false);
                None
            }
            Lookup::Missing => {
                self.record_read(key, false);
                None
            }
        }
    }

    /// Returns true if `key` holds a live entry. Same expiry rules as
    /// [`get`](Self::get), but the value is not read: hit and miss counters
    /// and events are left alone.
    pub fn has(&self, key: &str) -> bool {
        self.store().contains(key, tokio::time::Instant::now())
    }

    /// Stores `value` under `key` with the default TTL.
    pub fn set(&self, key: impl Into<String>, value: V) {
        self.set_with_ttl(key, value, self.inner.config.default_ttl);
    }

    /// Stores `value` under `key` with an explicit TTL.
    ///
    /// If `key` is new and the cache is full, the entry with the oldest write
    /// time is evicted first. Writes are never rejected.
    pub fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let key = key.into();
        let (evicted, size) = {
            let mut store = self.store();
            let evicted = store.insert(key, value, ttl, tokio::time::Instant::now());
            (evicted, store.len())
        };

        #[cfg(feature = "metrics")]
        gauge!("signalhub_cache_size", "cache" => self.inner.config.name.clone()).set(size as f64);
        #[cfg(not(feature = "metrics"))]
        let _ = size;

        if let Some(evicted) = evicted {
            self.inner.evictions.fetch_add(1, Ordering::Relaxed);

            #[cfg(feature = "metrics")]
            counter!("signalhub_cache_evictions_total", "cache" => self.inner.config.name.clone())
                .increment(1);

            #[cfg(feature = "tracing")]
            debug!(cache = %self.inner.config.name, key = %evicted, "evicted oldest entry");

            self.inner.config.event_listeners.emit(&CacheEvent::Eviction {
                cache_name: self.inner.config.name.clone(),
                timestamp: std::time::Instant::now(),
                key: evicted,
            });
        }
    }

    /// Removes `key`. Returns true if an entry was present.
    pub fn delete(&self, key: &str) -> bool {
        self.store().remove(key)
    }

    /// Removes every entry. Counters are kept.
    pub fn clear(&self) {
        self.store().clear();
    }

    /// Cache-aside read with the default TTL.
    ///
    /// See [`get_or_set_with_ttl`](Self::get_or_set_with_ttl).
    pub async fn get_or_set<F, Fut, E>(&self, key: &str, producer: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        self.get_or_set_with_ttl(key, self.inner.config.default_ttl, producer)
            .await
    }

    /// Returns the cached value for `key`, or runs `producer`, stores its
    /// value under `key` for `ttl` and returns it.
    ///
    /// Producer errors are returned unchanged and nothing is stored.
    /// Concurrent misses on the same key are not coalesced: each caller runs
    /// its own producer and the last one to finish wins the slot.
    pub async fn get_or_set_with_ttl<F, Fut, E>(
        &self,
        key: &str,
        ttl: Duration,
        producer: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let value = producer().await?;
        self.set_with_ttl(key, value.clone(), ttl);
        Ok(value)
    }

    /// Removes every key matching the regular expression `pattern`.
    ///
    /// Returns the number of entries removed. An invalid pattern removes
    /// nothing.
    pub fn invalidate_pattern(&self, pattern: &str) -> usize {
        let regex = match Regex::new(pattern) {
            Ok(regex) => regex,
            Err(_err) => {
                #[cfg(feature = "tracing")]
                warn!(cache = %self.inner.config.name, pattern, error = %_err, "invalid invalidation pattern");
                return 0;
            }
        };

        let removed = self.store().remove_where(|key| regex.is_match(key));

        #[cfg(feature = "tracing")]
        debug!(cache = %self.inner.config.name, pattern, removed, "invalidated keys");

        removed
    }

    /// Removes every expired entry now. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        let removed = self.store().purge_expired(tokio::time::Instant::now());

        #[cfg(feature = "tracing")]
        trace!(cache = %self.inner.config.name, removed, "sweep finished");

        if removed > 0 {
            self.record_expired(removed);
        }
        removed
    }

    /// Starts the periodic sweeper on the current tokio runtime.
    ///
    /// The task stops when the returned handle is stopped or dropped, or once
    /// every handle to this cache has been dropped.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn start_sweeper(&self) -> SweeperHandle {
        SweeperHandle::spawn(self)
    }

    /// Current counters.
    pub fn stats(&self) -> CacheStats {
        let (size, max_size) = {
            let store = self.store();
            (store.len(), store.max_size())
        };

        CacheStats {
            size,
            max_size,
            hits: self.inner.hits.load(Ordering::Relaxed),
            misses: self.inner.misses.load(Ordering::Relaxed),
            evictions: self.inner.evictions.load(Ordering::Relaxed),
            expirations: self.inner.expirations.load(Ordering::Relaxed),
        }
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.store().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn downgrade(&self) -> std::sync::Weak<Shared<V>> {
        Arc::downgrade(&self.inner)
    }

    pub(crate) fn from_shared(inner: Arc<Shared<V>>) -> Self {
        Self { inner }
    }

    fn store(&self) -> MutexGuard<'_, CacheStore<V>> {
        self.inner
            .store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn record_read(&self, key: &str, hit: bool) {
        let name = &self.inner.config.name;
        let event = if hit {
            self.inner.hits.fetch_add(1, Ordering::Relaxed);

            #[cfg(feature = "metrics")]
            counter!("signalhub_cache_requests_total", "cache" => name.clone(), "result" => "hit")
                .increment(1);

            #[cfg(feature = "tracing")]
            trace!(cache = %name, key, "cache hit");

            CacheEvent::Hit {
                cache_name: name.clone(),
                timestamp: std::time::Instant::now(),
                key: key.to_string(),
            }
        } else {
            self.inner.misses.fetch_add(1, Ordering::Relaxed);

            #[cfg(feature = "metrics")]
            counter!("signalhub_cache_requests_total", "cache" => name.clone(), "result" => "miss")
                .increment(1);

            #[cfg(feature = "tracing")]
            trace!(cache = %name, key, "cache miss");

            CacheEvent::Miss {
                cache_name: name.clone(),
                timestamp: std::time::Instant::now(),
                key: key.to_string(),
            }
        };
        self.inner.config.event_listeners.emit(&event);
    }

    fn record_expired(&self, count: usize) {
        self.inner
            .expirations
            .fetch_add(count as u64, Ordering::Relaxed);
        self.inner.config.event_listeners.emit(&CacheEvent::Expired {
            cache_name: self.inner.config.name.clone(),
            timestamp: std::time::Instant::now(),
            count,
        });
    }
}

impl<V> std::fmt::Debug for TtlCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("name", &self.inner.config.name)
            .field("max_size", &self.inner.config.max_size)
            .field("default_ttl", &self.inner.config.default_ttl)
            .finish()
    }
}
