//! Synchronized Cache Module
//!
//! Thread-safe handle over an [`ExpiryStore`] guarded by a single
//! reader/writer lock. Mutations take the write lock, queries the read lock.

use std::borrow::Borrow;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, SystemTime};

use crate::cache::{CacheStats, ExpiryStore};
use crate::clock::{Clock, SystemClock};
use crate::tasks::{run_reaper, FALLBACK_INTERVAL};

// == Cache ==
/// Cloneable, thread-safe cache handle. Clones share the same storage.
#[derive(Debug)]
pub struct Cache<K, V, C = SystemClock> {
    store: Arc<RwLock<ExpiryStore<K, V, C>>>,
}

impl<K, V, C> Clone for Cache<K, V, C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<K, V> Cache<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
{
    // == Constructor ==
    /// Creates an empty cache driven by the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<K, V> Default for Cache<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C> Cache<K, V, C>
where
    K: Eq + Hash + Clone,
    C: Clock,
{
    /// Creates an empty cache driven by a custom clock.
    pub fn with_clock(clock: C) -> Self {
        Self {
            store: Arc::new(RwLock::new(ExpiryStore::with_clock(clock))),
        }
    }

    // A panicking callback cannot leave the store half-updated; ignore poisoning.
    fn read(&self) -> RwLockReadGuard<'_, ExpiryStore<K, V, C>> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ExpiryStore<K, V, C>> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }

    // == Writes ==
    /// Inserts or overwrites a value. An existing TTL for the key is kept.
    pub fn set(&self, key: K, value: V) {
        self.write().set(key, value);
    }

    /// Inserts or overwrites a value that expires after `ttl`.
    pub fn set_with_ttl(&self, key: K, value: V, ttl: Duration) {
        self.write().set_with_ttl(key, value, ttl);
    }

    /// Deletes an entry. Returns whether it existed.
    pub fn remove<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.write().remove(key)
    }

    /// Runs one eviction pass. `on_evicted` is called under the write lock
    /// and must not call back into this cache.
    pub fn evict<F>(&self, on_evicted: F) -> usize
    where
        F: FnMut(K, V) -> bool,
    {
        self.write().evict(on_evicted)
    }

    /// Runs one eviction pass with no callback.
    pub fn purge_expired(&self) -> usize {
        self.write().purge_expired()
    }

    // == Reads ==
    /// Returns a clone of the value for `key`. Expiry is not checked here;
    /// see [`ExpiryStore::get`].
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.read().get(key).cloned()
    }

    /// Checks whether `key` is present, expired or not.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.read().contains_key(key)
    }

    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Number of entries that currently carry a TTL.
    pub fn ttl_len(&self) -> usize {
        self.read().ttl_len()
    }

    /// Unix timestamp (seconds) of the earliest expiry, or None.
    pub fn next_expiry_time(&self) -> Option<i64> {
        self.read().next_expiry_time()
    }

    /// Visits entries under the read lock until `visit` returns `false`.
    pub fn iterate<F>(&self, visit: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        self.read().iterate(visit);
    }

    // == Stats ==
    /// Returns a snapshot of current statistics.
    pub fn stats(&self) -> CacheStats {
        self.read().stats()
    }

    /// Current time according to the cache's clock.
    pub fn now(&self) -> SystemTime {
        self.read().clock().now()
    }

    // == Run Reaper ==
    /// Evicts expired entries until `shutdown` resolves, using the default
    /// one-second fallback interval. Intended to be spawned as a task.
    pub async fn run_reaper<S, F>(&self, shutdown: S, on_evicted: F)
    where
        S: Future<Output = ()>,
        F: FnMut(K, V) -> bool,
    {
        run_reaper(self.clone(), FALLBACK_INTERVAL, shutdown, on_evicted).await;
    }
}
