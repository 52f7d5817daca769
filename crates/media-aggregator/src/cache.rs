//! In-memory response cache with time-based expiry.
//!
//! Freshness is evaluated when an entry is read; there is no background
//! sweep. An expired entry is removed by the `get` that observes it, so keys
//! that keep being queried never accumulate stale values. Entries that are
//! never read again stay until the process exits, which is acceptable for
//! the bounded set of distinct query keys this service sees. There is no
//! size-based eviction.

use dashmap::DashMap;
use std::hash::Hash;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// A cached value with its insertion timestamp
#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

/// Thread-safe key/value store with a single uniform TTL
#[derive(Debug)]
pub struct TtlCache<K, V>
where
    K: Eq + Hash,
{
    entries: DashMap<K, CacheEntry<V>>,
    ttl: Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + std::fmt::Display,
    V: Clone,
{
    /// Create a cache whose entries live for `ttl`.
    ///
    /// A zero TTL disables caching: `set` is a no-op and `get` always misses.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Get a fresh value, evicting it first if it has expired
    pub fn get(&self, key: &K) -> Option<V> {
        if self.ttl.is_zero() {
            return None;
        }

        let now = Instant::now();
        let ttl = self.ttl;
        let is_stale = |entry: &CacheEntry<V>| now.duration_since(entry.inserted_at) >= ttl;

        if let Some(entry) = self.entries.get(key) {
            if !is_stale(entry.value()) {
                debug!(key = %key, "Cache hit");
                return Some(entry.value().value.clone());
            }
        } else {
            debug!(key = %key, "Cache miss");
            return None;
        }

        // Re-checked under the write lock so a concurrent fresh `set` survives
        self.entries.remove_if(key, |_, entry| is_stale(entry));
        debug!(key = %key, "Cache entry expired");
        None
    }

    /// Store a value, replacing any previous entry for the key
    pub fn set(&self, key: K, value: V) {
        if self.ttl.is_zero() {
            return;
        }

        debug!(key = %key, "Cache stored");
        self.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Configured time-to-live
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of entries held, including expired entries not yet read
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
