//! Clock Module
//!
//! Time source used by the cache to compute and check expiry timestamps.
//! Production code uses [`SystemClock`]; tests inject a [`MockClock`].

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

// == Clock Trait ==
/// Source of the current wall-clock time.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> SystemTime;
}

// == System Clock ==
/// Reads the operating system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

// == Mock Clock ==
/// Manually driven clock for deterministic tests.
///
/// Clones share the same instant: keep one handle in the test and hand
/// another to the cache, then `advance` it to simulate elapsed time.
#[derive(Debug, Clone)]
pub struct MockClock {
    now: Arc<Mutex<SystemTime>>,
}

impl MockClock {
    /// Creates a clock frozen at `start`.
    pub fn new(start: SystemTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Creates a clock frozen at the given Unix timestamp in seconds.
    pub fn at_unix(secs: u64) -> Self {
        Self::new(UNIX_EPOCH + Duration::from_secs(secs))
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }

    /// Jumps the clock to an absolute instant.
    pub fn set(&self, to: SystemTime) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = to;
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new(UNIX_EPOCH)
    }
}

impl Clock for MockClock {
    fn now(&self) -> SystemTime {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// == Utility Functions ==
/// Whole seconds since the Unix epoch, rounded down (towards negative
/// infinity), so half a second before the epoch is `-1`.
pub fn unix_seconds(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(since) => since.as_secs() as i64,
        Err(err) => {
            let before = err.duration();
            let secs = -(before.as_secs() as i64);
            if before.subsec_nanos() > 0 {
                secs - 1
            } else {
                secs
            }
        }
    }
}

/// Converts a Unix timestamp in seconds back into a `SystemTime`.
///
/// Returns None when the platform cannot represent the instant.
pub fn from_unix_seconds(secs: i64) -> Option<SystemTime> {
    let offset = Duration::from_secs(secs.unsigned_abs());
    if secs >= 0 {
        UNIX_EPOCH.checked_add(offset)
    } else {
        UNIX_EPOCH.checked_sub(offset)
    }
}
