//! # ringfifo: Ring-Buffer FIFO Queues
//!
//! This crate provides first-in-first-out queues backed by a circular buffer,
//! in two variants sharing one indexing algorithm:
//!
//! - **[`FixedRingQueue<T, N>`]**: inline storage of `N` slots fixed at compile
//!   time, never allocates, rejects insertions past `N`
//! - **[`GrowableRingQueue<T, A>`]**: power-of-two storage obtained from a
//!   [`RingAllocator`], grown lazily and never shrunk
//!
//! Bulk transfers (`enqueue_many`, `dequeue_into`, `copy_into`) move at most
//! two contiguous runs, and bulk insertion is all-or-nothing.
//!
//! ## Quick Start
//!
//! ```rust
//! use ringfifo::{FixedRingQueue, GrowableRingQueue};
//!
//! let mut fixed: FixedRingQueue<u32, 6> = FixedRingQueue::new();
//! fixed.enqueue_many(&[1, 2, 3, 4]).unwrap();
//!
//! let mut out = [0; 2];
//! assert_eq!(fixed.dequeue_into(&mut out), 2);
//! assert_eq!(out, [1, 2]);
//!
//! let mut growable = GrowableRingQueue::new();
//! for i in 0..3 {
//!     growable.enqueue(i).unwrap();
//! }
//! assert_eq!(growable.capacity(), 4);
//! assert_eq!(growable.peek_front(), Some(&0));
//! ```
//!
//! ## Memory Budgets
//!
//! ```rust
//! use ringfifo::{BoundedAllocator, GrowableRingQueue, RingError};
//!
//! let mut queue: GrowableRingQueue<u64, BoundedAllocator> =
//!     GrowableRingQueue::new_in(BoundedAllocator::with_limit(64));
//! for i in 0..8 {
//!     queue.enqueue(i).unwrap();
//! }
//! assert!(matches!(queue.enqueue(8), Err(RingError::AllocationFailure { .. })));
//! assert_eq!(queue.len(), 8);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod config;
pub mod containers;
pub mod error;
pub mod memory;

// Re-export core types
pub use config::{Config, RingQueueConfig};
pub use containers::{
    Direction, FixedRingQueue, GrowableRingQueue, Iter, RingIndexer, RingQueueStats,
};
pub use error::{Result, RingError};
pub use memory::{BoundedAllocator, RingAllocator, SystemAllocator};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library (currently only logs the version)
pub fn init() {
    log::debug!("Initializing ringfifo v{}", VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info() {
        init();
        assert!(VERSION.contains('.'));
        let parts: Vec<&str> = VERSION.split('.').collect();
        assert!(parts.len() >= 2);
    }

    #[test]
    fn test_re_exports() -> Result<()> {
        let mut fixed: FixedRingQueue<i32, 2> = FixedRingQueue::new();
        fixed.enqueue(1)?;

        let mut growable: GrowableRingQueue<i32> = GrowableRingQueue::new();
        growable.enqueue(1)?;
        assert_eq!(fixed.peek_front(), growable.peek_front());

        assert!(std::any::type_name::<Result<()>>().contains("RingError"));
        Ok(())
    }
}
