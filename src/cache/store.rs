//! Expiry Store Module
//!
//! Single-threaded cache engine: a HashMap of values paired with an indexed
//! min-heap of `(expiry, key)` records for the entries that carry a TTL.
//!
//! Reads never consult the clock. An expired entry stays readable until an
//! eviction pass reclaims it: entries are at-least-eventually evicted, not
//! necessarily invisible the instant their TTL elapses.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use crate::cache::{CacheStats, IndexedMinHeap};
use crate::clock::{unix_seconds, Clock, SystemClock};

// == Expiry Store ==
/// Key/value storage with optional per-entry expiry. Not thread-safe on its
/// own; see [`crate::cache::Cache`] for the shared wrapper.
#[derive(Debug)]
pub struct ExpiryStore<K, V, C = SystemClock> {
    /// Key-value storage
    entries: HashMap<K, V>,
    /// One `(expiry, key)` record per key that has a TTL
    heap: IndexedMinHeap<i64, K>,
    /// Earliest expiry in the heap, None = no TTL entries
    next_expiry: Option<i64>,
    /// Eviction counters
    stats: CacheStats,
    /// Time source for computing and checking expiry
    clock: C,
}

impl<K, V> ExpiryStore<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
{
    // == Constructor ==
    /// Creates an empty store driven by the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<K, V> Default for ExpiryStore<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C> ExpiryStore<K, V, C>
where
    K: Eq + Hash + Clone,
    C: Clock,
{
    /// Creates an empty store driven by a custom clock.
    pub fn with_clock(clock: C) -> Self {
        Self {
            entries: HashMap::new(),
            heap: IndexedMinHeap::new(),
            next_expiry: None,
            stats: CacheStats::new(),
            clock,
        }
    }

    // == Set ==
    /// Inserts or overwrites a value without touching expiry.
    ///
    /// A TTL previously set for `key` stays in force: overwriting the value
    /// does not make the entry permanent.
    pub fn set(&mut self, key: K, value: V) {
        self.entries.insert(key, value);
    }

    // == Set With TTL ==
    /// Inserts or overwrites a value that expires `ttl` from now.
    ///
    /// Any previous expiry record for `key` is replaced, so a key never has
    /// more than one record in the heap.
    pub fn set_with_ttl(&mut self, key: K, value: V, ttl: Duration) {
        let expiry = self
            .clock
            .now()
            .checked_add(ttl)
            .map(unix_seconds)
            .unwrap_or(i64::MAX);

        self.heap.remove(&key);
        self.heap.push(expiry, key.clone());
        self.refresh_next_expiry();

        self.entries.insert(key, value);
    }

    // == Get ==
    /// Returns the value for `key` without checking its expiry.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key)
    }

    // == Contains ==
    /// Checks whether `key` is present, expired or not.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    // == Remove ==
    /// Deletes the value and its expiry record. Returns whether the key existed.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if self.entries.remove(key).is_none() {
            return false;
        }
        if self.heap.remove(key).is_some() {
            self.refresh_next_expiry();
        }
        true
    }

    // == Length ==
    /// Returns the current number of entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == TTL Length ==
    /// Number of entries that currently carry a TTL.
    pub fn ttl_len(&self) -> usize {
        self.heap.len()
    }

    // == Next Expiry ==
    /// Unix timestamp (seconds) of the earliest expiry, or None if no entry
    /// has a TTL.
    pub fn next_expiry_time(&self) -> Option<i64> {
        self.next_expiry
    }

    // == Evict ==
    /// Removes every entry whose expiry is at or before the current second.
    ///
    /// `on_evicted` receives each removed pair and returns `false` to stop
    /// the pass early; the remaining expired entries are left for the next
    /// pass. Returns the number of entries removed.
    pub fn evict<F>(&mut self, mut on_evicted: F) -> usize
    where
        F: FnMut(K, V) -> bool,
    {
        let Some(next_expiry) = self.next_expiry else {
            return 0;
        };

        let now = unix_seconds(self.clock.now());
        if now < next_expiry {
            return 0;
        }

        let mut evicted = 0;
        while let Some((&expiry, _)) = self.heap.peek() {
            if expiry > now {
                break;
            }
            let Some((_, key)) = self.heap.pop() else {
                break;
            };
            let Some(value) = self.entries.remove(&key) else {
                continue;
            };
            evicted += 1;
            if !on_evicted(key, value) {
                break;
            }
        }

        self.refresh_next_expiry();
        self.stats.record_pass(evicted);
        evicted
    }

    // == Purge Expired ==
    /// Runs a full eviction pass with no callback.
    pub fn purge_expired(&mut self) -> usize {
        self.evict(|_, _| true)
    }

    // == Iterate ==
    /// Visits entries in unspecified order until `visit` returns `false`.
    ///
    /// Expired entries that have not been evicted yet are visited too.
    pub fn iterate<F>(&self, mut visit: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        for (key, value) in &self.entries {
            if !visit(key, value) {
                return;
            }
        }
    }

    // == Stats ==
    /// Returns a snapshot of current statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            total_entries: self.entries.len(),
            ttl_entries: self.heap.len(),
            next_expiry: self.next_expiry,
            ..self.stats.clone()
        }
    }

    /// The clock this store reads expiry times from.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn refresh_next_expiry(&mut self) {
        self.next_expiry = self.heap.peek().map(|(&expiry, _)| expiry);
    }

    #[cfg(test)]
    pub(crate) fn heap_is_consistent(&self) -> bool {
        self.heap.is_consistent()
    }
}
