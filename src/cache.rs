//! Bounded get-or-load cache with write-based expiry.
//!
//! Entries are evicted least-recently-used once the cache is over capacity,
//! and dropped once older than the TTL no matter how often they are read.
//! Concurrent misses on one key share a single load.

use std::collections::HashMap;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::{Duration, Instant};

use lru::LruCache;

struct Entry<V> {
    written: Instant,
    value: V,
}

/// A running load; `stale` once invalidated while running.
struct Flight<V> {
    slot: Arc<OnceLock<V>>,
    stale: bool,
}

struct State<K, V> {
    entries: LruCache<K, Entry<V>>,
    in_flight: HashMap<K, Flight<V>>,
}

pub struct LoadingCache<K, V> {
    ttl: Duration,
    state: Mutex<State<K, V>>,
}

impl<K, V> LoadingCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// A zero capacity is raised to one.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            ttl,
            state: Mutex::new(State {
                entries: LruCache::new(capacity),
                in_flight: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State<K, V>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_expired(&self, entry: &Entry<V>, now: Instant) -> bool {
        now.duration_since(entry.written) >= self.ttl
    }

    /// Cached value for `key`, or the result of `load`.
    ///
    /// At most one load runs per key: while it runs, other callers for the
    /// same key block on it and get its value. This holds across invalidation
    /// too, so a load invalidated while running is still shared with every
    /// caller that joins it, but its value is not cached.
    pub fn get_or_load<F>(&self, key: K, load: F) -> V
    where
        F: FnOnce() -> V,
    {
        let slot = {
            let mut state = self.lock();
            let now = Instant::now();
            let expired = match state.entries.get(&key) {
                Some(entry) if !self.is_expired(entry, now) => return entry.value.clone(),
                Some(_) => true,
                None => false,
            };
            if expired {
                state.entries.pop(&key);
            }
            let flight = state.in_flight.entry(key.clone()).or_insert_with(|| Flight {
                slot: Arc::default(),
                stale: false,
            });
            Arc::clone(&flight.slot)
        };

        let value = slot.get_or_init(load).clone();

        let mut state = self.lock();
        let finished = state
            .in_flight
            .get(&key)
            .filter(|flight| Arc::ptr_eq(&flight.slot, &slot))
            .map(|flight| flight.stale);
        if let Some(stale) = finished {
            state.in_flight.remove(&key);
            if !stale {
                state.entries.put(
                    key,
                    Entry {
                        written: Instant::now(),
                        value: value.clone(),
                    },
                );
            }
        }
        value
    }

    /// Fresh cached value, without loading.
    pub fn get_if_present(&self, key: &K) -> Option<V> {
        let mut state = self.lock();
        let now = Instant::now();
        let entry = state.entries.get(key)?;
        (!self.is_expired(entry, now)).then(|| entry.value.clone())
    }

    /// Drops the cached value; a load already running for `key` keeps
    /// serving its callers but will not be cached.
    pub fn invalidate(&self, key: &K) {
        let mut state = self.lock();
        state.entries.pop(key);
        if let Some(flight) = state.in_flight.get_mut(key) {
            flight.stale = true;
        }
    }

    pub fn invalidate_all(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.in_flight.values_mut().for_each(|flight| flight.stale = true);
    }

    /// Drops every expired entry now instead of on next access.
    pub fn clean_up(&self) {
        let mut state = self.lock();
        let now = Instant::now();
        let expired: Vec<K> = state
            .entries
            .iter()
            .filter(|(_, entry)| self.is_expired(entry, now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in expired {
            state.entries.pop(&key);
        }
    }

    /// Number of cached entries, expired ones included until cleaned up.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
