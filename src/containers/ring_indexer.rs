//! Ring buffer index arithmetic shared by both queue variants
//!
//! [`RingIndexer`] owns the `front`/`back`/`len` bookkeeping of a ring of
//! `capacity` slots. The free functions at the bottom of this module move
//! elements between a slot array and caller slices; every transfer touches at
//! most two contiguous runs, `[start, capacity)` followed by `[0, remainder)`.

use std::iter::FusedIterator;
use std::mem::MaybeUninit;
use std::ops::Range;
use std::ptr;
use std::slice;

/// Stepping direction for [`RingIndexer::relative`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards higher indices, wrapping to 0 after `capacity - 1`
    Forward,
    /// Towards lower indices, wrapping to `capacity - 1` before 0
    Backward,
}

/// Front/back bookkeeping for a ring of `capacity` slots
///
/// Power-of-two capacities wrap with a bitmask, every other capacity uses a
/// true modulo. Capacity 0 is allowed only as the "no storage yet" state of a
/// growable queue; no index is ever computed against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingIndexer {
    capacity: usize,
    /// `capacity - 1` when capacity is a power of two
    mask: Option<usize>,
    front: usize,
    back: usize,
    len: usize,
}

impl RingIndexer {
    /// Creates an empty indexer for `capacity` slots
    pub const fn new(capacity: usize) -> Self {
        Self {
            capacity,
            mask: Self::mask_for(capacity),
            front: 0,
            back: 0,
            len: 0,
        }
    }

    const fn mask_for(capacity: usize) -> Option<usize> {
        if capacity.is_power_of_two() {
            Some(capacity - 1)
        } else {
            None
        }
    }

    /// Number of slots in the ring
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Index of the next element to remove
    #[inline]
    pub fn front(&self) -> usize {
        self.front
    }

    /// Index where the next element will be written
    #[inline]
    pub fn back(&self) -> usize {
        self.back
    }

    /// Number of occupied slots
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no slot is occupied
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True when every slot is occupied (always true for capacity 0)
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity
    }

    /// Number of vacant slots
    #[inline]
    pub fn free(&self) -> usize {
        self.capacity - self.len
    }

    /// True when wrapping uses the bitmask path
    #[inline]
    pub fn is_power_of_two(&self) -> bool {
        self.mask.is_some()
    }

    #[inline(always)]
    fn wrap(&self, index: usize) -> usize {
        match self.mask {
            Some(mask) => index & mask,
            None => index % self.capacity,
        }
    }

    /// Returns `(base ± step) mod capacity`
    ///
    /// Backward stepping is computed as forward stepping by
    /// `capacity - step`, so no intermediate value goes negative.
    /// `base` must be a valid index and `step` at most `capacity`.
    #[inline]
    pub fn relative(&self, base: usize, step: usize, direction: Direction) -> usize {
        debug_assert!(base < self.capacity, "base {} outside ring of {}", base, self.capacity);
        debug_assert!(step <= self.capacity, "step {} larger than ring of {}", step, self.capacity);

        match direction {
            Direction::Forward => self.wrap(base + step),
            Direction::Backward => self.wrap(base + (self.capacity - step)),
        }
    }

    /// Physical runs covered by `n` slots starting at `start`
    ///
    /// The second run is empty unless the slots cross the end of the ring.
    pub fn segments(&self, start: usize, n: usize) -> (Range<usize>, Range<usize>) {
        if n == 0 {
            return (0..0, 0..0);
        }
        debug_assert!(start < self.capacity && n <= self.capacity);

        let first = (self.capacity - start).min(n);
        (start..start + first, 0..n - first)
    }

    /// Runs holding `n` elements beginning `offset` elements after `front`
    pub fn occupied(&self, offset: usize, n: usize) -> (Range<usize>, Range<usize>) {
        if n == 0 {
            return (0..0, 0..0);
        }
        assert!(
            offset + n <= self.len,
            "range {}..{} outside {} stored elements",
            offset,
            offset + n,
            self.len
        );
        self.segments(self.relative(self.front, offset, Direction::Forward), n)
    }

    /// Runs of the next `n` vacant slots starting at `back`
    pub fn vacant(&self, n: usize) -> (Range<usize>, Range<usize>) {
        assert!(n <= self.free(), "{} slots requested, {} free", n, self.free());
        self.segments(self.back, n)
    }

    /// Index of the most recently inserted element
    pub fn last(&self) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        Some(self.relative(self.back, 1, Direction::Backward))
    }

    /// Marks `n` elements at the front as removed
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds the number of stored elements.
    pub fn advance_front(&mut self, n: usize) {
        assert!(
            n <= self.len,
            "cannot remove {} elements from a ring holding {}",
            n,
            self.len
        );
        if n == 0 {
            return;
        }
        self.front = self.relative(self.front, n, Direction::Forward);
        self.len -= n;
    }

    /// Marks `n` slots at the back as filled
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds the number of vacant slots.
    pub fn advance_back(&mut self, n: usize) {
        assert!(n <= self.free(), "cannot add {} elements with {} free", n, self.free());
        if n == 0 {
            return;
        }
        self.back = self.relative(self.back, n, Direction::Forward);
        self.len += n;
    }

    /// Forgets all elements and rewinds both indices to 0
    pub fn reset(&mut self) {
        self.front = 0;
        self.back = 0;
        self.len = 0;
    }

    /// Switches to a larger power-of-two capacity after the storage grew
    ///
    /// `front` keeps its physical position, `back` is recomputed as
    /// `(front + len) mod new_capacity`. The caller is responsible for having
    /// made the occupied run contiguous from `front` in the new storage.
    pub fn rebase(&mut self, new_capacity: usize) {
        assert!(
            new_capacity.is_power_of_two() && new_capacity >= self.capacity,
            "cannot rebase a ring of {} onto {} slots",
            self.capacity,
            new_capacity
        );
        self.capacity = new_capacity;
        self.mask = Self::mask_for(new_capacity);
        self.back = self.wrap(self.front + self.len);
    }
}

/// Views initialized slots as values
///
/// # Safety
///
/// Every slot in `slots` must be initialized.
#[inline]
unsafe fn assume_init<T>(slots: &[MaybeUninit<T>]) -> &[T] {
    // SAFETY: MaybeUninit<T> is layout-compatible with T and the caller
    // guarantees initialization
    unsafe { slice::from_raw_parts(slots.as_ptr().cast::<T>(), slots.len()) }
}

/// Mutable counterpart of [`assume_init`]
///
/// # Safety
///
/// Every slot in `slots` must be initialized.
#[inline]
unsafe fn assume_init_mut<T>(slots: &mut [MaybeUninit<T>]) -> &mut [T] {
    // SAFETY: see assume_init
    unsafe { slice::from_raw_parts_mut(slots.as_mut_ptr().cast::<T>(), slots.len()) }
}

/// Returns the stored elements as two slices in FIFO order
///
/// # Safety
///
/// `slots` must be the storage described by `ring`, with every occupied slot
/// initialized.
pub(crate) unsafe fn as_slices<'a, T>(
    slots: &'a [MaybeUninit<T>],
    ring: &RingIndexer,
) -> (&'a [T], &'a [T]) {
    let (head, tail) = ring.occupied(0, ring.len());
    // SAFETY: occupied runs are initialized per the caller contract
    unsafe { (assume_init(&slots[head]), assume_init(&slots[tail])) }
}

/// Clones up to `dest.len()` elements, starting `offset` elements after the
/// front, into `dest` without removing them. Returns the number copied.
///
/// # Safety
///
/// Same contract as [`as_slices`].
pub(crate) unsafe fn export_cloned<T: Clone>(
    slots: &[MaybeUninit<T>],
    ring: &RingIndexer,
    offset: usize,
    dest: &mut [T],
) -> usize {
    let n = dest.len().min(ring.len().saturating_sub(offset));
    if n == 0 {
        return 0;
    }

    let (head, tail) = ring.occupied(offset, n);
    let (dest_head, dest_tail) = dest[..n].split_at_mut(head.len());
    // SAFETY: occupied runs are initialized per the caller contract
    unsafe {
        dest_head.clone_from_slice(assume_init(&slots[head]));
        dest_tail.clone_from_slice(assume_init(&slots[tail]));
    }
    n
}

/// Moves up to `dest.len()` elements from the front into `dest`, dropping
/// the values `dest` previously held. Returns the number moved.
///
/// # Safety
///
/// Same contract as [`as_slices`].
pub(crate) unsafe fn export_moved<T>(
    slots: &mut [MaybeUninit<T>],
    ring: &mut RingIndexer,
    dest: &mut [T],
) -> usize {
    let n = dest.len().min(ring.len());
    if n == 0 {
        return 0;
    }

    let (head, tail) = ring.occupied(0, n);
    // Released before reading so a panicking destructor in `dest` can only
    // leak the remaining values, never expose them twice.
    ring.advance_front(n);

    let moved = slots[head].iter().chain(slots[tail].iter());
    for (out, slot) in dest.iter_mut().zip(moved) {
        // SAFETY: each occupied slot is read exactly once and is no longer
        // part of the ring
        *out = unsafe { slot.assume_init_read() };
    }
    n
}

/// Clones all of `src` into the vacant slots at the back and commits them
///
/// # Panics
///
/// Panics if `src` does not fit in the free slots; callers check first.
pub(crate) fn import_cloned<T: Clone>(
    slots: &mut [MaybeUninit<T>],
    ring: &mut RingIndexer,
    src: &[T],
) {
    if src.is_empty() {
        return;
    }

    let (head, tail) = ring.vacant(src.len());
    let (src_head, src_tail) = src.split_at(head.len());
    for (slot, item) in slots[head].iter_mut().zip(src_head) {
        slot.write(item.clone());
    }
    for (slot, item) in slots[tail].iter_mut().zip(src_tail) {
        slot.write(item.clone());
    }

    // Only now do the new elements become visible
    ring.advance_back(src.len());
}

/// Drops up to `n` elements from the front. Returns the number dropped.
///
/// # Safety
///
/// Same contract as [`as_slices`].
pub(crate) unsafe fn drop_front<T>(
    slots: &mut [MaybeUninit<T>],
    ring: &mut RingIndexer,
    n: usize,
) -> usize {
    let n = n.min(ring.len());
    if n == 0 {
        return 0;
    }

    let (head, tail) = ring.occupied(0, n);
    ring.advance_front(n);

    // SAFETY: the runs were occupied and have just been detached from the ring
    unsafe {
        ptr::drop_in_place(assume_init_mut(&mut slots[head]));
        ptr::drop_in_place(assume_init_mut(&mut slots[tail]));
    }
    n
}

/// Front-to-back iterator over a ring queue
///
/// Created by `iter()` on either queue variant.
#[derive(Debug, Clone)]
pub struct Iter<'a, T> {
    head: slice::Iter<'a, T>,
    tail: slice::Iter<'a, T>,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(head: &'a [T], tail: &'a [T]) -> Self {
        Self {
            head: head.iter(),
            tail: tail.iter(),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.head.next().or_else(|| self.tail.next())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.head.len() + self.tail.len();
        (remaining, Some(remaining))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.tail.next_back().or_else(|| self.head.next_back())
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}
