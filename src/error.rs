//! Error types for the cache crate
//!
//! Cache operations are total and report misses through `Option`/`bool`.
//! The only fallible surface is loading configuration.

use thiserror::Error;

// == Config Error Enum ==
/// Errors raised while reading configuration from the environment.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Variable is set but does not parse as the expected type
    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },

    /// Variable parsed but is outside the accepted range
    #[error("{var} must be greater than zero")]
    Zero { var: &'static str },
}

// == Result Type Alias ==
/// Convenience Result type for configuration loading.
pub type Result<T> = std::result::Result<T, ConfigError>;
