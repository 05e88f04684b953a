//! Memory providers for growable ring storage
//!
//! Growable queues are generic over a [`RingAllocator`]. Two providers ship
//! with the crate: [`SystemAllocator`], which forwards to the global allocator,
//! and [`BoundedAllocator`], which adds a hard byte budget.

pub mod allocator;
pub mod bounded;

// Re-export main types
pub use allocator::{CACHE_LINE_SIZE, RingAllocator, SystemAllocator, layout_for};
pub use bounded::BoundedAllocator;
