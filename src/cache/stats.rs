//! Cache Statistics Module
//!
//! Point-in-time snapshot of cache size and expiration activity.

use serde::Serialize;

// == Cache Stats ==
/// Snapshot of cache size and eviction counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Current number of entries in the cache
    pub total_entries: usize,
    /// Entries currently carrying a TTL
    pub ttl_entries: usize,
    /// Unix timestamp (seconds) of the earliest expiry, None = no TTL entries
    pub next_expiry: Option<i64>,
    /// Entries removed by eviction passes since creation
    pub evicted: u64,
    /// Eviction passes that reached the heap
    pub eviction_passes: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == TTL Ratio ==
    /// Fraction of entries that carry a TTL, or 0.0 for an empty cache.
    pub fn ttl_ratio(&self) -> f64 {
        if self.total_entries == 0 {
            0.0
        } else {
            self.ttl_entries as f64 / self.total_entries as f64
        }
    }

    // == Record Pass ==
    /// Records one eviction pass that removed `evicted` entries.
    pub fn record_pass(&mut self, evicted: usize) {
        self.eviction_passes += 1;
        self.evicted += evicted as u64;
    }
}
