//! Fixed-capacity ring queue
//!
//! Storage is an inline array of `N` slots owned for the queue's whole
//! lifetime, so the queue never allocates. Insertions beyond `N` elements are
//! rejected with `RingError::CapacityExceeded`.

use super::ring_indexer::{self, Iter, RingIndexer};
use crate::error::{Result, RingError};
use std::fmt;
use std::mem::MaybeUninit;

/// Fixed-size FIFO queue with compile-time capacity
///
/// The capacity is part of the type through the const generic `N`.
/// Power-of-two capacities wrap indices with a bitmask, any other capacity
/// with a modulo.
///
/// # Performance Characteristics
///
/// - **O(1) enqueue/dequeue/peek/discard** with no allocation
/// - **O(n) bulk transfers** done as at most two contiguous runs
/// - **All-or-nothing bulk insert**: a rejected `enqueue_many` leaves the
///   queue untouched
///
/// # Examples
///
/// ```rust
/// use ringfifo::FixedRingQueue;
///
/// let mut queue: FixedRingQueue<i32, 3> = FixedRingQueue::new();
/// queue.enqueue(11)?;
/// queue.enqueue_many(&[22, 33])?;
/// assert!(queue.enqueue(44).is_err());
///
/// assert_eq!(queue.dequeue(), Some(11));
/// assert_eq!(queue.peek_front(), Some(&22));
/// # Ok::<(), ringfifo::RingError>(())
/// ```
///
/// A zero capacity is rejected when the queue is instantiated:
///
/// ```compile_fail
/// use ringfifo::FixedRingQueue;
///
/// let queue: FixedRingQueue<u8, 0> = FixedRingQueue::new();
/// ```
pub struct FixedRingQueue<T, const N: usize> {
    /// Ring buffer storage
    buffer: [MaybeUninit<T>; N],
    /// Front/back bookkeeping
    ring: RingIndexer,
}

impl<T, const N: usize> FixedRingQueue<T, N> {
    /// Creates a new empty queue with capacity `N`
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ringfifo::FixedRingQueue;
    ///
    /// let queue: FixedRingQueue<i32, 16> = FixedRingQueue::new();
    /// assert_eq!(queue.len(), 0);
    /// assert_eq!(queue.capacity(), 16);
    /// ```
    pub fn new() -> Self {
        const { assert!(N > 0, "FixedRingQueue capacity must be greater than zero") };

        Self {
            buffer: [const { MaybeUninit::uninit() }; N],
            ring: RingIndexer::new(N),
        }
    }

    /// Returns the capacity of the queue
    #[inline]
    pub fn capacity(&self) -> usize {
        N
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

    /// Returns true if the queue is full
    #[inline]
    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }

    /// Number of elements that can still be inserted
    #[inline]
    pub fn free_capacity(&self) -> usize {
        self.ring.free()
    }

    /// Adds an element to the back of the queue
    ///
    /// # Errors
    ///
    /// Returns `RingError::CapacityExceeded` if the queue is full. The queue is
    /// unchanged and `item` is dropped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ringfifo::FixedRingQueue;
    ///
    /// let mut queue: FixedRingQueue<i32, 8> = FixedRingQueue::new();
    /// queue.enqueue(42)?;
    /// queue.enqueue(84)?;
    ///
    /// assert_eq!(queue.len(), 2);
    /// # Ok::<(), ringfifo::RingError>(())
    /// ```
    pub fn enqueue(&mut self, item: T) -> Result<()> {
        if self.ring.is_full() {
            return Err(RingError::capacity_exceeded(N, 1));
        }

        self.buffer[self.ring.back()].write(item);
        self.ring.advance_back(1);
        Ok(())
    }

    /// Adds every element of `source` to the back, preserving their order
    ///
    /// Either all elements are inserted or none are. An empty `source` is a
    /// successful no-op.
    ///
    /// # Errors
    ///
    /// Returns `RingError::CapacityExceeded` if `source` is longer than the
    /// free capacity.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ringfifo::FixedRingQueue;
    ///
    /// let mut queue: FixedRingQueue<i32, 4> = FixedRingQueue::new();
    /// queue.enqueue_many(&[1, 2, 3])?;
    /// assert!(queue.enqueue_many(&[4, 5]).is_err());
    /// assert_eq!(queue.len(), 3);
    /// # Ok::<(), ringfifo::RingError>(())
    /// ```
    pub fn enqueue_many(&mut self, source: &[T]) -> Result<()>
    where
        T: Clone,
    {
        if source.len() > self.ring.free() {
            return Err(RingError::capacity_exceeded(N, source.len()));
        }

        ring_indexer::import_cloned(&mut self.buffer, &mut self.ring, source);
        Ok(())
    }

    /// Removes and returns the element at the front of the queue
    ///
    /// # Returns
    ///
    /// `Some(T)` if the queue is not empty, `None` otherwise
    pub fn dequeue(&mut self) -> Option<T> {
        if self.ring.is_empty() {
            return None;
        }

        let front = self.ring.front();
        self.ring.advance_front(1);
        // SAFETY: the slot was occupied and is no longer part of the ring
        Some(unsafe { self.buffer[front].assume_init_read() })
    }

    /// Moves up to `dest.len()` elements from the front into `dest`
    ///
    /// Returns the number of elements moved, which is
    /// `min(dest.len(), self.len())`. Slots of `dest` past that count are left
    /// untouched.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ringfifo::FixedRingQueue;
    ///
    /// let mut queue: FixedRingQueue<i32, 6> = FixedRingQueue::new();
    /// queue.enqueue_many(&[1, 2, 3, 4])?;
    ///
    /// let mut out = [0; 2];
    /// assert_eq!(queue.dequeue_into(&mut out), 2);
    /// assert_eq!(out, [1, 2]);
    /// # Ok::<(), ringfifo::RingError>(())
    /// ```
    pub fn dequeue_into(&mut self, dest: &mut [T]) -> usize {
        // SAFETY: self.ring describes self.buffer
        unsafe { ring_indexer::export_moved(&mut self.buffer, &mut self.ring, dest) }
    }

    /// Returns a reference to the front element without removing it
    pub fn peek_front(&self) -> Option<&T> {
        if self.ring.is_empty() {
            return None;
        }

        // SAFETY: the front slot is occupied
        Some(unsafe { self.buffer[self.ring.front()].assume_init_ref() })
    }

    /// Returns a reference to the most recently inserted element
    pub fn peek_back(&self) -> Option<&T> {
        let last = self.ring.last()?;

        // SAFETY: the last slot is occupied
        Some(unsafe { self.buffer[last].assume_init_ref() })
    }

    /// Clones up to `dest.len()` elements from the front into `dest` without
    /// removing them. Returns the number copied.
    pub fn copy_into(&self, dest: &mut [T]) -> usize
    where
        T: Clone,
    {
        // SAFETY: self.ring describes self.buffer
        unsafe { ring_indexer::export_cloned(&self.buffer, &self.ring, 0, dest) }
    }

    /// Removes up to `n` elements from the front without returning them
    ///
    /// Returns the number of elements removed, `min(n, self.len())`.
    pub fn discard(&mut self, n: usize) -> usize {
        // SAFETY: self.ring describes self.buffer
        unsafe { ring_indexer::drop_front(&mut self.buffer, &mut self.ring, n) }
    }

    /// Removes all elements
    pub fn clear(&mut self) {
        self.discard(self.ring.len());
        self.ring.reset();
    }

    /// Returns the stored elements as two slices in FIFO order
    ///
    /// The second slice is non-empty only when the elements wrap around the
    /// end of the buffer.
    pub fn as_slices(&self) -> (&[T], &[T]) {
        // SAFETY: self.ring describes self.buffer
        unsafe { ring_indexer::as_slices(&self.buffer, &self.ring) }
    }

    /// Returns a front-to-back iterator
    pub fn iter(&self) -> Iter<'_, T> {
        let (head, tail) = self.as_slices();
        Iter::new(head, tail)
    }
}

impl<T, const N: usize> Default for FixedRingQueue<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> Drop for FixedRingQueue<T, N> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T: Clone, const N: usize> Clone for FixedRingQueue<T, N> {
    fn clone(&self) -> Self {
        let mut queue = Self::new();
        let (head, tail) = self.as_slices();
        ring_indexer::import_cloned(&mut queue.buffer, &mut queue.ring, head);
        ring_indexer::import_cloned(&mut queue.buffer, &mut queue.ring, tail);
        queue
    }
}

impl<T: fmt::Debug, const N: usize> fmt::Debug for FixedRingQueue<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq, const N: usize> PartialEq for FixedRingQueue<T, N> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq, const N: usize> Eq for FixedRingQueue<T, N> {}

impl<'a, T, const N: usize> IntoIterator for &'a FixedRingQueue<T, N> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn contents<T: Clone + Default, const N: usize>(queue: &FixedRingQueue<T, N>) -> Vec<T> {
        let mut out = vec![T::default(); N];
        let n = queue.copy_into(&mut out);
        out.truncate(n);
        out
    }

    #[test]
    fn test_new_queue() {
        let queue: FixedRingQueue<i32, 8> = FixedRingQueue::new();
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.capacity(), 8);
        assert!(queue.is_empty());
        assert!(!queue.is_full());
    }

    #[test]
    fn test_capacity_exceeded_leaves_state() -> Result<()> {
        let mut queue: FixedRingQueue<i32, 3> = FixedRingQueue::new();
        queue.enqueue(11)?;
        queue.enqueue(22)?;
        queue.enqueue(33)?;
        assert_eq!(contents(&queue), vec![11, 22, 33]);

        assert_eq!(queue.enqueue(44), Err(RingError::capacity_exceeded(3, 1)));
        assert_eq!(queue.len(), 3);
        assert_eq!(contents(&queue), vec![11, 22, 33]);
        Ok(())
    }

    #[test]
    fn test_bulk_wraps_to_capacity() -> Result<()> {
        let mut queue: FixedRingQueue<i32, 6> = FixedRingQueue::new();
        queue.enqueue_many(&[1, 2, 3, 4])?;
        assert_eq!(queue.len(), 4);

        let mut out = [0; 2];
        assert_eq!(queue.dequeue_into(&mut out), 2);
        assert_eq!(out, [1, 2]);
        assert_eq!(contents(&queue), vec![3, 4]);

        queue.enqueue_many(&[5, 6, 7, 8])?;
        assert_eq!(queue.len(), 6);
        assert!(queue.is_full());
        let (head, tail) = queue.as_slices();
        assert_eq!(head, &[3, 4, 5, 6]);
        assert_eq!(tail, &[7, 8]);
        assert_eq!(contents(&queue), vec![3, 4, 5, 6, 7, 8]);
        Ok(())
    }

    #[test]
    fn test_enqueue_many_all_or_nothing() -> Result<()> {
        let mut queue: FixedRingQueue<i32, 5> = FixedRingQueue::new();
        queue.enqueue_many(&[1, 2, 3])?;
        queue.discard(2);

        let before = queue.ring;
        assert_eq!(
            queue.enqueue_many(&[4, 5, 6, 7, 8]),
            Err(RingError::capacity_exceeded(5, 5))
        );
        assert_eq!(queue.ring, before);
        assert_eq!(contents(&queue), vec![3]);

        queue.enqueue_many(&[])?;
        assert_eq!(queue.ring, before);
        Ok(())
    }

    #[test]
    fn test_empty_queue_operations() {
        let mut queue: FixedRingQueue<i32, 4> = FixedRingQueue::new();
        let before = queue.ring;

        assert_eq!(queue.dequeue(), None);
        assert_eq!(queue.peek_front(), None);
        assert_eq!(queue.peek_back(), None);
        assert_eq!(queue.discard(1), 0);
        assert_eq!(queue.dequeue_into(&mut [0; 3]), 0);
        assert_eq!(queue.copy_into(&mut [0; 3]), 0);
        assert_eq!(queue.ring, before);
    }

    #[test]
    fn test_discard_partial() -> Result<()> {
        let mut queue: FixedRingQueue<i32, 5> = FixedRingQueue::new();
        queue.enqueue_many(&[1, 2, 3, 4, 5])?;

        assert_eq!(queue.discard(2), 2);
        assert_eq!(contents(&queue), vec![3, 4, 5]);
        assert_eq!(queue.discard(10), 3);
        assert!(queue.is_empty());
        Ok(())
    }

    #[test]
    fn test_undersized_and_oversized_destinations() -> Result<()> {
        let mut queue: FixedRingQueue<i32, 4> = FixedRingQueue::new();
        queue.enqueue_many(&[7, 8, 9])?;

        let mut small = [0; 1];
        assert_eq!(queue.copy_into(&mut small), 1);
        assert_eq!(small, [7]);

        let mut large = [-1; 6];
        assert_eq!(queue.dequeue_into(&mut large), 3);
        assert_eq!(large, [7, 8, 9, -1, -1, -1]);
        assert!(queue.is_empty());
        Ok(())
    }

    #[test]
    fn test_front_back_after_wrap() -> Result<()> {
        let mut queue: FixedRingQueue<i32, 3> = FixedRingQueue::new();
        queue.enqueue_many(&[1, 2, 3])?;
        queue.dequeue();
        queue.dequeue();
        queue.enqueue(4)?;

        assert_eq!(queue.peek_front(), Some(&3));
        assert_eq!(queue.peek_back(), Some(&4));
        assert_eq!(queue.iter().rev().copied().collect::<Vec<_>>(), vec![4, 3]);
        Ok(())
    }

    #[test]
    fn test_power_of_two_and_modulo_paths_agree() -> Result<()> {
        let mut pow2: FixedRingQueue<usize, 8> = FixedRingQueue::new();
        let mut odd: FixedRingQueue<usize, 7> = FixedRingQueue::new();
        assert!(pow2.ring.is_power_of_two());
        assert!(!odd.ring.is_power_of_two());

        for round in 0..20 {
            let batch: Vec<usize> = (round * 5..round * 5 + 5).collect();
            pow2.enqueue_many(&batch)?;
            odd.enqueue_many(&batch)?;

            let mut a = [0; 5];
            let mut b = [0; 5];
            assert_eq!(pow2.dequeue_into(&mut a), 5);
            assert_eq!(odd.dequeue_into(&mut b), 5);
            assert_eq!(a, b);
            assert_eq!(a.to_vec(), batch);
        }
        Ok(())
    }

    #[derive(Clone, Default)]
    struct Tracked(Rc<Cell<usize>>);

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_elements_dropped_once() -> Result<()> {
        let drops = Rc::new(Cell::new(0));
        {
            let mut queue: FixedRingQueue<Tracked, 4> = FixedRingQueue::new();
            for _ in 0..4 {
                queue.enqueue(Tracked(drops.clone()))?;
            }
            assert!(queue.enqueue(Tracked(drops.clone())).is_err());
            assert_eq!(drops.get(), 1);

            assert_eq!(queue.discard(1), 1);
            assert_eq!(drops.get(), 2);

            drop(queue.dequeue());
            assert_eq!(drops.get(), 3);
        }
        assert_eq!(drops.get(), 5);
        Ok(())
    }

    #[test]
    fn test_clone_and_equality() -> Result<()> {
        let mut queue: FixedRingQueue<i32, 4> = FixedRingQueue::new();
        queue.enqueue_many(&[1, 2, 3, 4])?;
        queue.discard(3);
        queue.enqueue_many(&[5, 6])?;

        let cloned = queue.clone();
        assert_eq!(queue, cloned);
        assert_eq!(format!("{:?}", cloned), "[4, 5, 6]");
        Ok(())
    }
}
