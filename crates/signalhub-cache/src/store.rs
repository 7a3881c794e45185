//! Entry storage with per-entry TTL and oldest-first eviction.

use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// A stored value together with the instant it was written and its TTL.
#[derive(Clone, Debug)]
pub(crate) struct CacheEntry<V> {
    pub(crate) value: V,
    pub(crate) stored_at: Instant,
    pub(crate) ttl: Duration,
}

impl<V> CacheEntry<V> {
    /// Expired iff strictly more than `ttl` has elapsed since `stored_at`.
    pub(crate) fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) > self.ttl
    }
}

/// Result of a lookup.
#[derive(Debug, PartialEq)]
pub(crate) enum Lookup<V> {
    Hit(V),
    /// The entry existed but had expired; it has been removed.
    Expired,
    Missing,
}

pub(crate) struct CacheStore<V> {
    entries: HashMap<String, CacheEntry<V>>,
    max_size: usize,
}

impl<V: Clone> CacheStore<V> {
    pub(crate) fn new(max_size: usize) -> Self {
        let max_size = max_size.max(1);
        Self {
            entries: HashMap::with_capacity(max_size),
            max_size,
        }
    }

    pub(crate) fn max_size(&self) -> usize {
        self.max_size
    }

    pub(crate) fn get(&mut self, key: &str, now: Instant) -> Lookup<V> {
        match self.entries.get(key) {
            None => Lookup::Missing,
            Some(entry) if entry.is_expired_at(now) => {
                self.entries.remove(key);
                Lookup::Expired
            }
            Some(entry) => Lookup::Hit(entry.value.clone()),
        }
    }

    /// True if `key` holds a live entry. Leaves the store untouched.
    pub(crate) fn contains(&self, key: &str, now: Instant) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired_at(now))
    }

    /// Inserts or replaces `key`.
    ///
    /// Writing a new key into a full store first evicts the entry with the
    /// oldest `stored_at`; its key is returned.
    pub(crate) fn insert(
        &mut self,
        key: String,
        value: V,
        ttl: Duration,
        now: Instant,
    ) -> Option<String> {
        let evicted = if !self.entries.contains_key(&key) && self.entries.len() >= self.max_size {
            self.oldest_key().inspect(|oldest| {
                self.entries.remove(oldest);
            })
        } else {
            None
        };

        self.entries.insert(
            key,
            CacheEntry {
                value,
                stored_at: now,
                ttl,
            },
        );
        evicted
    }

    pub(crate) fn remove(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Removes every key for which `matches` returns true.
    pub(crate) fn remove_where(&mut self, mut matches: impl FnMut(&str) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !matches(key));
        before - self.entries.len()
    }

    /// Removes all expired entries.
    pub(crate) fn purge_expired(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        before - self.entries.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    fn oldest_key(&self) -> Option<String> {
        self.entries
            .iter()
            .min_by_key(|(_, entry)| entry.stored_at)
            .map(|(key, _)| key.clone())
    }
}
