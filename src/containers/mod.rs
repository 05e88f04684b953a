//! Ring buffer FIFO queues
//!
//! - [`FixedRingQueue`]: inline storage, capacity fixed by a const generic
//! - [`GrowableRingQueue`]: allocator-backed power-of-two storage that grows
//!   on demand and never shrinks
//!
//! Both variants share the index arithmetic of [`RingIndexer`].

pub mod fixed_ring_queue;
pub mod growable_ring_queue;
pub mod ring_indexer;

pub use fixed_ring_queue::FixedRingQueue;
pub use growable_ring_queue::{GrowableRingQueue, RingQueueStats};
pub use ring_indexer::{Direction, Iter, RingIndexer};
