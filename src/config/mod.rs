//! Configuration APIs for ringfifo
//!
//! Growable queues can be sized and memory-capped through a
//! [`RingQueueConfig`]. Configurations are validated, can be read from
//! environment variables and round-trip through JSON files.
//!
//! # Preset Configurations
//!
//! ```rust
//! use ringfifo::config::{Config, RingQueueConfig};
//!
//! // Pre-sized queue without a memory ceiling
//! let config = RingQueueConfig::performance_preset();
//!
//! // Lazily allocated queue capped at 16 MiB
//! let config = RingQueueConfig::memory_preset();
//! ```
//!
//! # Environment Initialization
//!
//! ```rust
//! use ringfifo::config::{Config, RingQueueConfig};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Reads RINGFIFO_QUEUE_INITIAL_CAPACITY and RINGFIFO_QUEUE_MEMORY_LIMIT
//! let config = RingQueueConfig::from_env()?;
//!
//! // Same variables under a custom prefix
//! let config = RingQueueConfig::from_env_with_prefix("MYAPP_")?;
//! # Ok(())
//! # }
//! ```

use crate::error::Result;
use std::env;
use std::fmt;
use std::path::Path;

pub mod queue;

#[cfg(test)]
mod tests;

pub use queue::RingQueueConfig;

/// Environment variable prefix used by [`Config::from_env`]
pub const DEFAULT_ENV_PREFIX: &str = "RINGFIFO_";

/// Common configuration trait providing validation, environment initialization,
/// and preset management functionality.
pub trait Config: Clone + fmt::Debug {
    /// Validate the configuration for correctness and consistency.
    fn validate(&self) -> Result<()>;

    /// Initialize configuration from environment variables.
    ///
    /// Variables use the format `RINGFIFO_{COMPONENT}_{FIELD}`, for example
    /// `RINGFIFO_QUEUE_INITIAL_CAPACITY=1024`. Unset or unparsable variables
    /// keep their default value.
    fn from_env() -> Result<Self>
    where
        Self: Default,
    {
        Self::from_env_with_prefix(DEFAULT_ENV_PREFIX)
    }

    /// Initialize configuration from environment variables with a custom prefix.
    fn from_env_with_prefix(prefix: &str) -> Result<Self>
    where
        Self: Default;

    /// Get a performance-optimized preset configuration.
    fn performance_preset() -> Self;

    /// Get a memory-optimized preset configuration.
    fn memory_preset() -> Self;

    /// Get a real-time preset configuration.
    ///
    /// Suited to latency-sensitive users that want allocation up front and a
    /// bounded footprint.
    fn realtime_preset() -> Self;

    /// Get a balanced preset configuration.
    fn balanced_preset() -> Self
    where
        Self: Default,
    {
        Self::default()
    }

    /// Save configuration to a file as pretty-printed JSON.
    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()>;

    /// Load and validate configuration from a JSON file.
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self>;
}

/// Utility function to parse environment variable with fallback to default.
///
/// # Returns
///
/// The parsed value, or `default` if the variable is unset or unparsable.
pub fn parse_env_var<T>(var_name: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    env::var(var_name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}
