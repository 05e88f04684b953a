//! Growable ring queue
//!
//! The backing block always holds a power-of-two number of slots (or none at
//! all) and is obtained from a [`RingAllocator`]. Inserting past the current
//! capacity grows the block in place through `RingAllocator::resize`; the
//! queue never shrinks.

use super::ring_indexer::{self, Iter, RingIndexer};
use crate::config::{Config, RingQueueConfig};
use crate::error::{Result, RingError};
use crate::memory::{BoundedAllocator, RingAllocator, SystemAllocator};
use std::fmt;
use std::marker::PhantomData;
use std::mem::{MaybeUninit, size_of};
use std::ptr::{self, NonNull};
use std::slice;

/// Automatically growing FIFO queue with power-of-two capacity
///
/// # Growth
///
/// When `k` more elements do not fit, the capacity becomes the smallest power
/// of two holding `len + k` elements. The existing block is resized, which
/// keeps every element at its physical offset. If the stored elements wrapped
/// around the old end, only the wrapped prefix `[0, back)` is copied to
/// `[old_capacity, old_capacity + back)`, which makes the run from `front`
/// contiguous again. Nothing else moves.
///
/// # Performance Characteristics
///
/// - **O(1) amortized enqueue**, O(capacity) only when growing
/// - **O(1) dequeue/peek/discard** with bitmask wrapping instead of modulo
/// - **Failure atomicity**: an allocation failure leaves the queue untouched
///
/// # Examples
///
/// ```rust
/// use ringfifo::GrowableRingQueue;
///
/// let mut queue = GrowableRingQueue::new();
/// assert_eq!(queue.capacity(), 0);
///
/// for i in 0..100 {
///     queue.enqueue(i)?;
/// }
///
/// assert_eq!(queue.len(), 100);
/// assert_eq!(queue.capacity(), 128);
/// assert_eq!(queue.dequeue(), Some(0));
/// # Ok::<(), ringfifo::RingError>(())
/// ```
pub struct GrowableRingQueue<T, A: RingAllocator = SystemAllocator> {
    /// Block of `ring.capacity()` slots, dangling while the capacity is 0
    buffer: NonNull<T>,
    /// Front/back bookkeeping
    ring: RingIndexer,
    /// Memory provider owning `buffer`
    allocator: A,
    /// Number of completed grow operations
    grow_count: usize,
    _marker: PhantomData<T>,
}

impl<T> GrowableRingQueue<T> {
    /// Creates an empty queue without allocating
    pub fn new() -> Self {
        Self::new_in(SystemAllocator)
    }

    /// Creates an empty queue able to hold at least `capacity` elements
    ///
    /// The capacity is rounded up to a power of two. A capacity of 0 does not
    /// allocate.
    ///
    /// # Errors
    ///
    /// Returns `RingError::AllocationFailure` or `RingError::CapacityOverflow`
    /// if the initial block cannot be obtained.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ringfifo::GrowableRingQueue;
    ///
    /// let queue: GrowableRingQueue<i32> = GrowableRingQueue::with_capacity(5)?;
    /// assert_eq!(queue.capacity(), 8);
    /// # Ok::<(), ringfifo::RingError>(())
    /// ```
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::with_capacity_in(capacity, SystemAllocator)
    }
}

impl<T> GrowableRingQueue<T, BoundedAllocator> {
    /// Creates a queue from a validated [`RingQueueConfig`]
    ///
    /// The queue is backed by a [`BoundedAllocator`] enforcing the configured
    /// memory limit and is pre-grown to the configured initial capacity.
    ///
    /// # Errors
    ///
    /// Returns `RingError::Configuration` for an invalid configuration, or the
    /// allocation error of the initial grow.
    pub fn from_config(config: &RingQueueConfig) -> Result<Self> {
        config.validate()?;

        let allocator = match config.memory_limit {
            Some(limit) => BoundedAllocator::with_limit(limit),
            None => BoundedAllocator::unbounded(),
        };
        Self::with_capacity_in(config.initial_capacity, allocator)
    }
}

impl<T, A: RingAllocator> GrowableRingQueue<T, A> {
    /// Creates an empty queue using `allocator`, without allocating
    pub fn new_in(allocator: A) -> Self {
        Self {
            buffer: NonNull::dangling(),
            ring: RingIndexer::new(0),
            allocator,
            grow_count: 0,
            _marker: PhantomData,
        }
    }

    /// Creates an empty queue using `allocator`, pre-grown to hold at least
    /// `capacity` elements
    ///
    /// # Errors
    ///
    /// See [`GrowableRingQueue::with_capacity`].
    pub fn with_capacity_in(capacity: usize, allocator: A) -> Result<Self> {
        let mut queue = Self::new_in(allocator);
        if capacity > 0 {
            queue.grow_for(capacity)?;
        }
        Ok(queue)
    }

    /// Returns the current capacity of the queue
    #[inline]
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// Returns the current number of elements in the queue
    #[inline]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Returns true if the queue is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Returns the allocator backing this queue
    #[inline]
    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    fn slots(&self) -> &[MaybeUninit<T>] {
        // SAFETY: buffer holds ring.capacity() slots (dangling and empty when
        // the capacity is 0)
        unsafe { slice::from_raw_parts(self.buffer.as_ptr().cast(), self.ring.capacity()) }
    }

    fn parts_mut(&mut self) -> (&mut [MaybeUninit<T>], &mut RingIndexer) {
        // SAFETY: see slots(); the slice and the indexer are disjoint fields
        let slots = unsafe {
            slice::from_raw_parts_mut(self.buffer.as_ptr().cast(), self.ring.capacity())
        };
        (slots, &mut self.ring)
    }

    /// Reserves capacity for at least `additional` more elements
    ///
    /// # Errors
    ///
    /// Returns `RingError::AllocationFailure` or `RingError::CapacityOverflow`
    /// if growing fails. The queue is unchanged in that case.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        if additional <= self.ring.free() {
            return Ok(());
        }
        self.grow_for(additional)
    }

    /// Grows the block so that `additional` more elements fit
    #[cold]
    #[inline(never)]
    fn grow_for(&mut self, additional: usize) -> Result<()> {
        let len = self.ring.len();
        let required = len
            .checked_add(additional)
            .ok_or_else(|| RingError::capacity_overflow(additional))?;
        let new_capacity = required
            .max(1)
            .checked_next_power_of_two()
            .ok_or_else(|| RingError::capacity_overflow(required))?;

        let old_capacity = self.ring.capacity();
        if new_capacity <= old_capacity {
            return Ok(());
        }

        if old_capacity == 0 {
            self.buffer = self
                .allocator
                .allocate::<T>(new_capacity)
                .inspect_err(|e| {
                    log::warn!(
                        "Ring queue could not obtain {} slots ({}): {}",
                        new_capacity,
                        e.category(),
                        e
                    )
                })?;
        } else {
            // SAFETY: buffer was obtained from this allocator for old_capacity slots
            self.buffer = unsafe { self.allocator.resize(self.buffer, old_capacity, new_capacity) }
                .inspect_err(|e| {
                    log::warn!(
                        "Ring queue could not grow from {} to {} slots ({}): {}",
                        old_capacity,
                        new_capacity,
                        e.category(),
                        e
                    )
                })?;

            if self.ring.front() + len > old_capacity {
                let wrapped = self.ring.back();
                // SAFETY: [0, wrapped) is initialized. wrapped <= front <
                // old_capacity and new_capacity >= 2 * old_capacity, so the
                // destination [old_capacity, old_capacity + wrapped) lies in
                // the freshly added, unused part of the block.
                unsafe {
                    let base = self.buffer.as_ptr();
                    ptr::copy_nonoverlapping(base, base.add(old_capacity), wrapped);
                }
            }
        }

        self.ring.rebase(new_capacity);
        self.grow_count += 1;
        log::debug!(
            "Ring queue grew from {} to {} slots ({} bytes per slot, {} elements)",
            old_capacity,
            new_capacity,
            size_of::<T>(),
            len
        );
        Ok(())
    }

    /// Adds an element to the back of the queue, growing if needed
    ///
    /// # Errors
    ///
    /// Returns `RingError::AllocationFailure` or `RingError::CapacityOverflow`
    /// if growing fails. The queue is unchanged and `item` is dropped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ringfifo::GrowableRingQueue;
    ///
    /// let mut queue = GrowableRingQueue::new();
    /// queue.enqueue(11)?;
    /// queue.enqueue(22)?;
    /// queue.enqueue(33)?;
    ///
    /// assert_eq!(queue.capacity(), 4);
    /// # Ok::<(), ringfifo::RingError>(())
    /// ```
    #[inline]
    pub fn enqueue(&mut self, item: T) -> Result<()> {
        if self.ring.is_full() {
            self.grow_for(1)?;
        }

        // SAFETY: the back slot is vacant and inside the block
        unsafe { self.buffer.as_ptr().add(self.ring.back()).write(item) };
        self.ring.advance_back(1);
        Ok(())
    }

    /// Adds every element of `source` to the back, preserving their order
    ///
    /// Grows once if needed. Either all elements are inserted or none are.
    ///
    /// # Errors
    ///
    /// Returns `RingError::AllocationFailure` or `RingError::CapacityOverflow`
    /// if growing fails. The queue is unchanged in that case.
    pub fn enqueue_many(&mut self, source: &[T]) -> Result<()>
    where
        T: Clone,
    {
        if source.len() > self.ring.free() {
            self.grow_for(source.len())?;
        }

        let (slots, ring) = self.parts_mut();
        ring_indexer::import_cloned(slots, ring, source);
        Ok(())
    }

    /// Removes and returns the element at the front of the queue
    #[inline]
    pub fn dequeue(&mut self) -> Option<T> {
        if self.ring.is_empty() {
            return None;
        }

        let front = self.ring.front();
        self.ring.advance_front(1);
        // SAFETY: the slot was occupied and is no longer part of the ring
        Some(unsafe { self.buffer.as_ptr().add(front).read() })
    }

    /// Moves up to `dest.len()` elements from the front into `dest`
    ///
    /// Returns `min(dest.len(), self.len())`.
    pub fn dequeue_into(&mut self, dest: &mut [T]) -> usize {
        let (slots, ring) = self.parts_mut();
        // SAFETY: ring describes slots
        unsafe { ring_indexer::export_moved(slots, ring, dest) }
    }

    /// Returns a reference to the front element without removing it
    pub fn peek_front(&self) -> Option<&T> {
        if self.ring.is_empty() {
            return None;
        }

        // SAFETY: the front slot is occupied
        Some(unsafe { &*self.buffer.as_ptr().add(self.ring.front()) })
    }

    /// Returns a reference to the most recently inserted element
    pub fn peek_back(&self) -> Option<&T> {
        let last = self.ring.last()?;

        // SAFETY: the last slot is occupied
        Some(unsafe { &*self.buffer.as_ptr().add(last) })
    }

    /// Clones up to `dest.len()` elements from the front into `dest` without
    /// removing them. Returns the number copied.
    pub fn copy_into(&self, dest: &mut [T]) -> usize
    where
        T: Clone,
    {
        // SAFETY: ring describes slots
        unsafe { ring_indexer::export_cloned(self.slots(), &self.ring, 0, dest) }
    }

    /// Removes up to `n` elements from the front without returning them
    ///
    /// Returns `min(n, self.len())`. The capacity is kept.
    pub fn discard(&mut self, n: usize) -> usize {
        let (slots, ring) = self.parts_mut();
        // SAFETY: ring describes slots
        unsafe { ring_indexer::drop_front(slots, ring, n) }
    }

    /// Removes all elements, keeping the capacity
    pub fn clear(&mut self) {
        self.discard(self.ring.len());
        self.ring.reset();
    }

    /// Returns the stored elements as two slices in FIFO order
    pub fn as_slices(&self) -> (&[T], &[T]) {
        // SAFETY: ring describes slots
        unsafe { ring_indexer::as_slices(self.slots(), &self.ring) }
    }

    /// Returns a front-to-back iterator
    pub fn iter(&self) -> Iter<'_, T> {
        let (head, tail) = self.as_slices();
        Iter::new(head, tail)
    }

    /// Get statistics for monitoring
    pub fn stats(&self) -> RingQueueStats {
        let capacity = self.ring.capacity();
        RingQueueStats {
            capacity,
            length: self.ring.len(),
            utilization: if capacity > 0 {
                self.ring.len() as f64 / capacity as f64
            } else {
                0.0
            },
            front_index: self.ring.front(),
            back_index: self.ring.back(),
            grow_count: self.grow_count,
        }
    }

    /// Clones the queue, reporting allocation failures instead of panicking
    ///
    /// # Errors
    ///
    /// Returns the allocation error of the new block.
    pub fn try_clone(&self) -> Result<Self>
    where
        T: Clone,
        A: Clone,
    {
        let mut queue = Self::with_capacity_in(self.len(), self.allocator.clone())?;
        let (head, tail) = self.as_slices();
        let (slots, ring) = queue.parts_mut();
        ring_indexer::import_cloned(slots, ring, head);
        ring_indexer::import_cloned(slots, ring, tail);
        Ok(queue)
    }
}

/// Statistics for GrowableRingQueue
#[derive(Debug, Clone, PartialEq)]
pub struct RingQueueStats {
    /// Number of slots in the block
    pub capacity: usize,
    /// Number of stored elements
    pub length: usize,
    /// `length / capacity`, 0 when nothing is allocated
    pub utilization: f64,
    /// Physical index of the front element
    pub front_index: usize,
    /// Physical index of the next write
    pub back_index: usize,
    /// Completed grow operations
    pub grow_count: usize,
}

impl<T, A: RingAllocator + Default> Default for GrowableRingQueue<T, A> {
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<T, A: RingAllocator> Drop for GrowableRingQueue<T, A> {
    fn drop(&mut self) {
        // Clear all elements first (calls destructors)
        self.clear();

        let capacity = self.ring.capacity();
        if capacity > 0 {
            // SAFETY: buffer was obtained from this allocator for capacity slots
            // and is released exactly once here
            unsafe { self.allocator.release(self.buffer, capacity) };
        }
    }
}

impl<T: Clone, A: RingAllocator + Clone> Clone for GrowableRingQueue<T, A> {
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(queue) => queue,
            Err(e) => panic!("failed to clone GrowableRingQueue: {}", e),
        }
    }
}

impl<T: fmt::Debug, A: RingAllocator> fmt::Debug for GrowableRingQueue<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq, A: RingAllocator> PartialEq for GrowableRingQueue<T, A> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq, A: RingAllocator> Eq for GrowableRingQueue<T, A> {}

impl<'a, T, A: RingAllocator> IntoIterator for &'a GrowableRingQueue<T, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// SAFETY: the queue owns its block exclusively; sending it sends the elements
// and the allocator
unsafe impl<T: Send, A: RingAllocator + Send> Send for GrowableRingQueue<T, A> {}

// SAFETY: shared access only hands out &T; every mutation needs &mut self
unsafe impl<T: Sync, A: RingAllocator + Sync> Sync for GrowableRingQueue<T, A> {}
