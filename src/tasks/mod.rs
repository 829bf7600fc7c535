//! Background Tasks Module
//!
//! Contains background tasks that run alongside a cache.
//!
//! # Tasks
//! - Expiry reaper: sleeps until the next expiry and evicts expired entries

mod reaper;

pub use reaper::{run_reaper, spawn_reaper, wait_duration, FALLBACK_INTERVAL};
