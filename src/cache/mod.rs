//! Cache Module
//!
//! In-memory key/value storage with optional per-entry TTL. Expiry is
//! tracked in an indexed min-heap so eviction only touches expired entries.

mod heap;
mod stats;
mod store;
mod sync;


// Re-export public types
pub use heap::IndexedMinHeap;
pub use stats::CacheStats;
pub use store::ExpiryStore;
pub use sync::Cache;
