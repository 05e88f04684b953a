//! Allocator capability consumed by growable ring storage
//!
//! The queue never decides how memory is obtained. It only asks an allocator
//! for a block of `count` slots, for that block to be resized, and finally
//! for it to be released.

use crate::error::{Result, RingError};
use std::alloc::{Layout, alloc, dealloc, realloc};
use std::mem::{align_of, size_of};
use std::ptr::NonNull;

/// Cache line size on most modern processors (64 bytes)
pub const CACHE_LINE_SIZE: usize = 64;

/// Memory provider for ring storage
///
/// Blocks are typed arrays of `count` slots. The allocator never initializes
/// or drops slot contents.
///
/// # Safety contract
///
/// `resize` and `release` may only be called with a block returned by this
/// allocator together with the slot count it was last allocated or resized
/// to.
pub trait RingAllocator {
    /// Allocate an uninitialized block of `count` slots
    ///
    /// # Errors
    ///
    /// Returns `RingError::CapacityOverflow` if the byte size is not
    /// representable and `RingError::AllocationFailure` if memory could not
    /// be obtained.
    fn allocate<T>(&mut self, count: usize) -> Result<NonNull<T>>;

    /// Resize `block` from `old_count` to `new_count` slots
    ///
    /// The first `min(old_count, new_count)` slots keep their contents. On
    /// error the original block is untouched and still owned by the caller.
    ///
    /// # Safety
    ///
    /// `block` must have been produced by this allocator for `old_count`
    /// slots of `T` and must not have been released.
    unsafe fn resize<T>(
        &mut self,
        block: NonNull<T>,
        old_count: usize,
        new_count: usize,
    ) -> Result<NonNull<T>>;

    /// Release a block of `count` slots
    ///
    /// # Safety
    ///
    /// `block` must have been produced by this allocator for `count` slots of
    /// `T`. It must not be used afterwards.
    unsafe fn release<T>(&mut self, block: NonNull<T>, count: usize);
}

/// Creates the cache-aligned layout used for `count` slots of `T`
///
/// # Errors
///
/// Returns `RingError::CapacityOverflow` if the total size overflows or
/// exceeds `isize::MAX` once padded to the alignment.
pub fn layout_for<T>(count: usize) -> Result<Layout> {
    let size = size_of::<T>()
        .checked_mul(count)
        .ok_or_else(|| RingError::capacity_overflow(count))?;
    let align = align_of::<T>().max(CACHE_LINE_SIZE);
    Layout::from_size_align(size, align).map_err(|_| RingError::capacity_overflow(count))
}

/// Global-allocator backed provider
///
/// Uses `std::alloc` with cache-line aligned layouts. Zero-sized requests
/// (zero slots or zero-sized `T`) never touch the global allocator and are
/// served by a dangling, well-aligned pointer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemAllocator;

impl RingAllocator for SystemAllocator {
    fn allocate<T>(&mut self, count: usize) -> Result<NonNull<T>> {
        let layout = layout_for::<T>(count)?;
        if layout.size() == 0 {
            return Ok(NonNull::dangling());
        }

        // SAFETY: layout has a non-zero size
        let ptr = unsafe { alloc(layout) };
        NonNull::new(ptr.cast::<T>()).ok_or_else(|| RingError::allocation_failure(layout.size()))
    }

    unsafe fn resize<T>(
        &mut self,
        block: NonNull<T>,
        old_count: usize,
        new_count: usize,
    ) -> Result<NonNull<T>> {
        let old_layout = layout_for::<T>(old_count)?;
        let new_layout = layout_for::<T>(new_count)?;

        if old_layout.size() == 0 {
            return self.allocate(new_count);
        }
        if new_layout.size() == 0 {
            // SAFETY: caller guarantees block belongs to us with old_count slots
            unsafe { self.release(block, old_count) };
            return Ok(NonNull::dangling());
        }

        // SAFETY: block was allocated with old_layout, the new size is non-zero
        // and was validated against the same alignment by layout_for
        let ptr = unsafe { realloc(block.as_ptr().cast::<u8>(), old_layout, new_layout.size()) };
        NonNull::new(ptr.cast::<T>()).ok_or_else(|| RingError::allocation_failure(new_layout.size()))
    }

    unsafe fn release<T>(&mut self, block: NonNull<T>, count: usize) {
        let Ok(layout) = layout_for::<T>(count) else {
            return;
        };
        if layout.size() == 0 {
            return;
        }

        // SAFETY: caller guarantees block was allocated with this layout
        unsafe { dealloc(block.as_ptr().cast::<u8>(), layout) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_is_cache_aligned() -> Result<()> {
        let layout = layout_for::<u32>(10)?;
        assert_eq!(layout.size(), 40);
        assert_eq!(layout.align(), CACHE_LINE_SIZE);

        #[repr(align(128))]
        struct Wide(#[allow(dead_code)] u8);
        assert_eq!(layout_for::<Wide>(1)?.align(), 128);
        Ok(())
    }

    #[test]
    fn test_layout_overflow() {
        assert_eq!(
            layout_for::<u64>(usize::MAX),
            Err(RingError::capacity_overflow(usize::MAX))
        );
        assert!(matches!(
            layout_for::<u8>(isize::MAX as usize),
            Err(RingError::CapacityOverflow { .. })
        ));
    }

    #[test]
    fn test_allocate_resize_release() -> Result<()> {
        let mut allocator = SystemAllocator;
        let block = allocator.allocate::<u64>(4)?;

        unsafe {
            for i in 0..4 {
                block.as_ptr().add(i).write(i as u64 * 11);
            }

            let grown = allocator.resize(block, 4, 16)?;
            for i in 0..4 {
                assert_eq!(grown.as_ptr().add(i).read(), i as u64 * 11);
            }
            assert_eq!(grown.as_ptr() as usize % CACHE_LINE_SIZE, 0);

            allocator.release(grown, 16);
        }
        Ok(())
    }

    #[test]
    fn test_zero_sized_requests() -> Result<()> {
        let mut allocator = SystemAllocator;

        let empty = allocator.allocate::<u32>(0)?;
        assert_eq!(empty, NonNull::dangling());

        let units = allocator.allocate::<()>(1_000)?;
        unsafe {
            let grown = allocator.resize(units, 1_000, 4_000)?;
            allocator.release(grown, 4_000);

            let from_empty = allocator.resize(empty, 0, 8)?;
            allocator.release(from_empty, 8);
        }
        Ok(())
    }
}
