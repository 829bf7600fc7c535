//! Configuration Module
//!
//! Loads reaper and demo settings from environment variables.

use std::env;
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Runtime configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Reaper fallback interval in seconds
    pub reaper_fallback_secs: u64,
    /// TTL in seconds given to the demo binary's expiring entry
    pub demo_ttl_secs: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `REAPER_FALLBACK_SECS` - Reaper fallback interval (default: 1, must be > 0)
    /// - `DEMO_TTL_SECS` - TTL of the demo entry (default: 2)
    ///
    /// Unset variables fall back to their defaults; set but malformed ones
    /// are rejected.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let reaper_fallback_secs =
            read_var("REAPER_FALLBACK_SECS")?.unwrap_or(defaults.reaper_fallback_secs);
        if reaper_fallback_secs == 0 {
            return Err(ConfigError::Zero {
                var: "REAPER_FALLBACK_SECS",
            });
        }

        Ok(Self {
            reaper_fallback_secs,
            demo_ttl_secs: read_var("DEMO_TTL_SECS")?.unwrap_or(defaults.demo_ttl_secs),
        })
    }

    /// Reaper fallback interval as a `Duration`.
    pub fn reaper_fallback(&self) -> Duration {
        Duration::from_secs(self.reaper_fallback_secs)
    }

    /// Demo entry TTL as a `Duration`.
    pub fn demo_ttl(&self) -> Duration {
        Duration::from_secs(self.demo_ttl_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reaper_fallback_secs: 1,
            demo_ttl_secs: 2,
        }
    }
}

fn read_var(var: &'static str) -> Result<Option<u64>> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { var, value }),
        Err(_) => Ok(None),
    }
}
