//! Byte-budgeted allocator
//!
//! Wraps [`SystemAllocator`] with an optional hard limit on the number of bytes
//! held at once. Requests that would cross the limit fail with
//! `RingError::AllocationFailure` before the global allocator is consulted,
//! which gives growable queues a predictable memory ceiling.

use super::allocator::{RingAllocator, SystemAllocator, layout_for};
use crate::error::{Result, RingError};
use std::ptr::NonNull;

/// Allocator enforcing an optional memory budget
#[derive(Debug, Default)]
pub struct BoundedAllocator {
    inner: SystemAllocator,
    limit: Option<usize>,
    in_use: usize,
    peak: usize,
}

impl BoundedAllocator {
    /// Creates an allocator that refuses to hold more than `limit` bytes
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Creates an allocator without a budget
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Configured byte limit, if any
    #[inline]
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Bytes currently held through this allocator
    #[inline]
    pub fn in_use(&self) -> usize {
        self.in_use
    }

    /// Highest number of bytes held at once
    #[inline]
    pub fn peak(&self) -> usize {
        self.peak
    }

    /// Bytes still available under the limit (`None` when unbounded)
    pub fn remaining(&self) -> Option<usize> {
        self.limit.map(|limit| limit.saturating_sub(self.in_use))
    }

    /// Checks that swapping `old_bytes` for `new_bytes` stays within budget
    fn admit(&self, old_bytes: usize, new_bytes: usize) -> Result<()> {
        let Some(limit) = self.limit else {
            return Ok(());
        };

        let after = self.in_use - old_bytes + new_bytes;
        if after > limit {
            log::warn!(
                "Memory budget exhausted: {} bytes requested, {} of {} bytes in use",
                new_bytes,
                self.in_use,
                limit
            );
            return Err(RingError::allocation_failure(new_bytes));
        }
        Ok(())
    }

    fn commit(&mut self, old_bytes: usize, new_bytes: usize) {
        self.in_use = self.in_use - old_bytes + new_bytes;
        self.peak = self.peak.max(self.in_use);
    }
}

/// A clone starts with a fresh budget of the same limit.
///
/// Blocks are owned by whoever allocated them, so the clone must not inherit
/// the original's accounting.
impl Clone for BoundedAllocator {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner,
            limit: self.limit,
            in_use: 0,
            peak: 0,
        }
    }
}

impl RingAllocator for BoundedAllocator {
    fn allocate<T>(&mut self, count: usize) -> Result<NonNull<T>> {
        let bytes = layout_for::<T>(count)?.size();
        self.admit(0, bytes)?;

        let block = self.inner.allocate(count)?;
        self.commit(0, bytes);
        Ok(block)
    }

    unsafe fn resize<T>(
        &mut self,
        block: NonNull<T>,
        old_count: usize,
        new_count: usize,
    ) -> Result<NonNull<T>> {
        let old_bytes = layout_for::<T>(old_count)?.size();
        let new_bytes = layout_for::<T>(new_count)?.size();
        self.admit(old_bytes, new_bytes)?;

        // SAFETY: forwarded caller contract
        let block = unsafe { self.inner.resize(block, old_count, new_count)? };
        self.commit(old_bytes, new_bytes);
        Ok(block)
    }

    unsafe fn release<T>(&mut self, block: NonNull<T>, count: usize) {
        let bytes = layout_for::<T>(count).map(|layout| layout.size()).unwrap_or(0);

        // SAFETY: forwarded caller contract
        unsafe { self.inner.release(block, count) };
        self.in_use = self.in_use.saturating_sub(bytes);
    }
}
