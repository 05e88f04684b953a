//! Growable queue configuration.

use super::{Config, parse_env_var};
use crate::error::{Result, RingError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Sizing and memory budget for a growable ring queue
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingQueueConfig {
    /// Minimum number of slots allocated up front (rounded up to a power of
    /// two, 0 allocates lazily)
    pub initial_capacity: usize,
    /// Maximum number of bytes the queue's storage may occupy
    pub memory_limit: Option<usize>,
}

impl RingQueueConfig {
    /// Set the initial capacity
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    /// Set the memory limit (`None` removes it)
    pub fn with_memory_limit(mut self, memory_limit: Option<usize>) -> Self {
        self.memory_limit = memory_limit;
        self
    }

    /// Capacity a queue built from this configuration starts with
    ///
    /// Returns `None` if the rounded capacity is not representable.
    pub fn effective_capacity(&self) -> Option<usize> {
        match self.initial_capacity {
            0 => Some(0),
            n => n.checked_next_power_of_two(),
        }
    }
}

impl Config for RingQueueConfig {
    fn validate(&self) -> Result<()> {
        if self.effective_capacity().is_none() {
            return Err(RingError::configuration(format!(
                "initial_capacity {} cannot be rounded up to a power of two",
                self.initial_capacity
            )));
        }
        if self.memory_limit == Some(0) {
            return Err(RingError::configuration(
                "memory_limit must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    fn from_env_with_prefix(prefix: &str) -> Result<Self> {
        let defaults = Self::default();
        // 0 means unlimited in the environment
        let limit = parse_env_var(
            &format!("{}QUEUE_MEMORY_LIMIT", prefix),
            defaults.memory_limit.unwrap_or(0),
        );
        let config = Self {
            initial_capacity: parse_env_var(
                &format!("{}QUEUE_INITIAL_CAPACITY", prefix),
                defaults.initial_capacity,
            ),
            memory_limit: (limit > 0).then_some(limit),
        };
        config.validate()?;
        Ok(config)
    }

    fn performance_preset() -> Self {
        Self {
            initial_capacity: 1024,
            memory_limit: None,
        }
    }

    fn memory_preset() -> Self {
        Self {
            initial_capacity: 0,
            memory_limit: Some(16 * 1024 * 1024),
        }
    }

    fn realtime_preset() -> Self {
        Self {
            initial_capacity: 4096,
            memory_limit: Some(64 * 1024 * 1024),
        }
    }

    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self).map_err(|e| {
            RingError::configuration(format!("Failed to serialize queue config: {}", e))
        })?;
        std::fs::write(path, serialized).map_err(|e| {
            RingError::configuration(format!("Failed to write queue config file: {}", e))
        })?;
        Ok(())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RingError::configuration(format!("Failed to read queue config file: {}", e))
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            RingError::configuration(format!("Failed to parse queue config file: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }
}
