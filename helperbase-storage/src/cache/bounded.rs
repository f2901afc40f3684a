//! Bounded in-process cache with TTL expiry and LRU eviction.

use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use lru::LruCache;
use tracing::debug;

use super::clock::{CacheClock, SystemClock};
use super::stats::CacheStats;

/// Configuration for [`BoundedTtlCache`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum age of an entry before reads treat it as absent.
    pub ttl: Duration,
    /// Maximum number of entries held at once. Zero is treated as one.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(5 * 60),
            max_entries: 100,
        }
    }
}

impl CacheConfig {
    /// Create a new cache config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the entry TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the capacity bound.
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = max;
        self
    }
}

#[derive(Debug)]
struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

#[derive(Debug)]
struct State<V> {
    entries: LruCache<String, Entry<V>>,
    hits: u64,
    misses: u64,
    evictions: u64,
    expirations: u64,
    /// Bumped by every delete, clear and pattern invalidation.
    generation: u64,
}

/// Key/value cache bounded by both age and entry count.
///
/// - An entry is fresh while `now - inserted_at < ttl`. Reads never extend
///   an entry's life; only `set` resets its age.
/// - Recency order is updated by `get` hits and by `set`. When a new key
///   arrives at capacity, expired entries are purged first and the least
///   recently used entry is evicted only if that did not free a slot.
/// - `get_or_set` never caches a failed fetch and never holds the lock
///   while the fetch is pending. Concurrent misses on one key each run
///   their own fetch. A fetch that overlaps any invalidation is returned
///   to its caller but not stored, so it cannot restore a removed entry.
///
/// All state sits behind one mutex. A poisoned lock is recovered since
/// every critical section leaves the map consistent.
#[derive(Debug)]
pub struct BoundedTtlCache<V> {
    state: Mutex<State<V>>,
    ttl: Duration,
    clock: Arc<dyn CacheClock>,
}

impl<V: Clone> BoundedTtlCache<V> {
    /// Create a cache using the system clock.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a cache reading time from `clock`.
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn CacheClock>) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            state: Mutex::new(State {
                entries: LruCache::new(capacity),
                hits: 0,
                misses: 0,
                evictions: 0,
                expirations: 0,
                generation: 0,
            }),
            ttl: config.ttl,
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<V>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_expired(&self, entry: &Entry<V>, now: Instant) -> bool {
        now.saturating_duration_since(entry.inserted_at) >= self.ttl
    }

    /// Insert or overwrite `key`, resetting its age.
    pub fn set(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        let now = self.clock.now();
        let mut guard = self.lock();
        self.insert(&mut guard, key, value, now);
    }

    fn insert(&self, state: &mut State<V>, key: String, value: V, now: Instant) {
        let is_new = !state.entries.contains(key.as_str());
        if is_new && state.entries.len() >= state.entries.cap().get() {
            let expired: Vec<String> = state
                .entries
                .iter()
                .filter(|(_, entry)| self.is_expired(entry, now))
                .map(|(k, _)| k.clone())
                .collect();
            for k in &expired {
                state.entries.pop(k.as_str());
            }
            state.expirations += expired.len() as u64;
        }

        let entry = Entry {
            value,
            inserted_at: now,
        };
        if let Some((displaced, _)) = state.entries.push(key.clone(), entry) {
            if displaced != key {
                state.evictions += 1;
                debug!(evicted = %displaced, "Cache at capacity, evicted least recently used entry");
            }
        }
    }

    /// Fetch a fresh value, promoting it to most recently used.
    ///
    /// An expired entry is removed and reported as a miss.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let mut guard = self.lock();
        let state = &mut *guard;

        let expired = match state.entries.peek(key) {
            None => {
                state.misses += 1;
                return None;
            }
            Some(entry) => self.is_expired(entry, now),
        };

        if expired {
            state.entries.pop(key);
            state.expirations += 1;
            state.misses += 1;
            return None;
        }

        state.hits += 1;
        state.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Whether `get` would return a value. Does not promote or count.
    pub fn has(&self, key: &str) -> bool {
        let now = self.clock.now();
        let guard = self.lock();
        guard
            .entries
            .peek(key)
            .is_some_and(|entry| !self.is_expired(entry, now))
    }

    /// Remove `key`. Returns whether an entry, fresh or stale, was present.
    pub fn delete(&self, key: &str) -> bool {
        let mut guard = self.lock();
        guard.generation += 1;
        guard.entries.pop(key).is_some()
    }

    /// Remove every entry. Counters are kept.
    pub fn clear(&self) {
        let mut guard = self.lock();
        guard.generation += 1;
        guard.entries.clear();
    }

    /// Return the cached value or run `fetcher` and cache its success.
    ///
    /// A fetch error is returned unchanged and leaves the cache untouched,
    /// so the next call fetches again. A successful fetch is not stored if
    /// any key was invalidated while it was pending.
    pub async fn get_or_set<F, Fut, E>(&self, key: &str, fetcher: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        let started_at = self.lock().generation;

        let value = fetcher().await?;

        let now = self.clock.now();
        let mut guard = self.lock();
        if guard.generation == started_at {
            self.insert(&mut guard, key.to_string(), value.clone(), now);
        } else {
            debug!(key, "Invalidation overlapped fetch, result not cached");
        }
        Ok(value)
    }

    /// Remove every key containing `pattern` and return how many went.
    pub fn invalidate_pattern(&self, pattern: &str) -> usize {
        let mut guard = self.lock();
        let state = &mut *guard;
        state.generation += 1;
        let matching: Vec<String> = state
            .entries
            .iter()
            .filter(|(k, _)| k.contains(pattern))
            .map(|(k, _)| k.clone())
            .collect();
        for k in &matching {
            state.entries.pop(k.as_str());
        }
        if !matching.is_empty() {
            debug!(pattern, removed = matching.len(), "Invalidated cache keys");
        }
        matching.len()
    }

    /// Snapshot of size, bounds and counters.
    pub fn stats(&self) -> CacheStats {
        let guard = self.lock();
        CacheStats {
            size: guard.entries.len(),
            max_size: guard.entries.cap().get(),
            ttl: self.ttl,
            hits: guard.hits,
            misses: guard.misses,
            evictions: guard.evictions,
            expirations: guard.expirations,
        }
    }

    /// Current keys, most recently used first.
    pub fn keys(&self) -> Vec<String> {
        self.lock().entries.iter().map(|(k, _)| k.clone()).collect()
    }

    /// Number of entries held, expired ones included until they are found.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl<V: Clone> Default for BoundedTtlCache<V> {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
