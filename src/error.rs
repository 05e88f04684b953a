//! Error handling for the ringfifo library
//!
//! Every fallible queue operation reports one of these variants. Failures are
//! side-effect free: a queue that returns an error is left exactly as it was
//! before the call.

use thiserror::Error;

/// Main error type for the ringfifo library
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RingError {
    /// Insertion would exceed the hard limit of a fixed-capacity queue
    #[error("Capacity exceeded: capacity {capacity}, requested {requested} more")]
    CapacityExceeded {
        /// Total capacity of the queue
        capacity: usize,
        /// Number of elements the caller tried to insert
        requested: usize,
    },

    /// The allocator could not satisfy a grow or initial-allocation request
    #[error("Allocation failed: requested {size} bytes")]
    AllocationFailure {
        /// Number of bytes requested
        size: usize,
    },

    /// The required capacity is not representable
    #[error("Capacity overflow: {requested} elements cannot be represented")]
    CapacityOverflow {
        /// Number of elements asked for, or the total that would have been
        /// required when that total itself is representable
        requested: usize,
    },

    /// Configuration or parameter errors
    #[error("Invalid configuration: {message}")]
    Configuration {
        /// Configuration error message
        message: String,
    },
}

impl RingError {
    /// Create a capacity exceeded error
    pub fn capacity_exceeded(capacity: usize, requested: usize) -> Self {
        Self::CapacityExceeded {
            capacity,
            requested,
        }
    }

    /// Create an allocation failure error
    pub fn allocation_failure(size: usize) -> Self {
        Self::AllocationFailure { size }
    }

    /// Create a capacity overflow error
    pub fn capacity_overflow(requested: usize) -> Self {
        Self::CapacityOverflow { requested }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error
    ///
    /// A full fixed queue or an exhausted allocator may succeed on a later
    /// attempt. Overflow and configuration errors will not.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::CapacityExceeded { .. } => true,
            Self::AllocationFailure { .. } => true,
            Self::CapacityOverflow { .. } => false,
            Self::Configuration { .. } => false,
        }
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::CapacityExceeded { .. } => "capacity",
            Self::AllocationFailure { .. } => "memory",
            Self::CapacityOverflow { .. } => "overflow",
            Self::Configuration { .. } => "config",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, RingError>;
