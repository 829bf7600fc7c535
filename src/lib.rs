//! Expiry Cache - An in-memory key/value cache with per-entry TTL
//!
//! Expiry is tracked in an indexed min-heap; a background reaper sleeps
//! until the next deadline and evicts what has expired.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{Cache, CacheStats, ExpiryStore, IndexedMinHeap};
pub use clock::{Clock, MockClock, SystemClock};
pub use config::Config;
pub use tasks::{run_reaper, spawn_reaper, FALLBACK_INTERVAL};
