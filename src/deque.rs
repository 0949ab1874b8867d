use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops::{Bound, Index, IndexMut, RangeBounds};

use allocator_api2::alloc::{Allocator, Global};

use crate::block_map::INITIAL_MAP_CAPACITY;
use crate::cursor::{Cursor, CursorMut};
use crate::error::DequeError;
use crate::iter::{IntoIter, Iter, IterMut};
use crate::memory::handle_error;
use crate::storage::SegmentedStorage;

/// A double-ended queue over segmented, block-indexed storage.
///
/// Elements live in fixed blocks of [`BLOCK_SIZE`](crate::BLOCK_SIZE) slots
/// reached through a block map. Pushing and popping at either end is amortized
/// O(1) and never moves existing elements; indexing is O(1). Block memory comes
/// from the allocator `A`.
pub struct Deque<T, A: Allocator = Global> {
    storage: SegmentedStorage<T, A>,
}

impl<T> Deque<T> {
    /// Creates an empty deque using the global allocator.
    ///
    /// # Panics
    ///
    /// Aborts through `handle_alloc_error` if the first block cannot be allocated.
    #[must_use]
    pub fn new() -> Self {
        Self::new_in(Global)
    }

    /// Creates an empty deque whose block map starts with `map_capacity` slots.
    ///
    /// The same capacity is restored by `clear()`.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::InvalidConfiguration` if `map_capacity` is 0, or
    /// `DequeError::AllocationFailed` if the map or the first block cannot be allocated.
    pub fn with_map_capacity(map_capacity: usize) -> Result<Self, DequeError> {
        Self::with_map_capacity_in(map_capacity, Global)
    }
}

impl<T, A: Allocator> Deque<T, A> {
    /// Creates an empty deque that allocates blocks from `alloc`.
    ///
    /// # Panics
    ///
    /// Aborts through `handle_alloc_error` if the first block cannot be allocated.
    #[must_use]
    pub fn new_in(alloc: A) -> Self {
        Self::try_new_in(alloc).unwrap_or_else(|err| handle_error(err))
    }

    /// Creates an empty deque that allocates blocks from `alloc`.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::AllocationFailed` if the map or the first block cannot be allocated.
    pub fn try_new_in(alloc: A) -> Result<Self, DequeError> {
        Self::with_map_capacity_in(INITIAL_MAP_CAPACITY, alloc)
    }

    /// # Errors
    ///
    /// See [`Deque::with_map_capacity`].
    pub fn with_map_capacity_in(map_capacity: usize, alloc: A) -> Result<Self, DequeError> {
        Ok(Self {
            storage: SegmentedStorage::new(map_capacity, alloc)?,
        })
    }

    // --- Inspection ---

    #[must_use]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Number of slots in the block map.
    #[must_use]
    pub fn map_capacity(&self) -> usize {
        self.storage.map_capacity()
    }

    /// Number of blocks currently allocated, including spare ones kept after pops.
    #[must_use]
    pub fn allocated_blocks(&self) -> usize {
        self.storage.allocated_blocks()
    }

    #[must_use]
    pub fn allocator(&self) -> &A {
        self.storage.allocator()
    }

    // --- Element access ---

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.storage.get(index)
    }

    #[must_use]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.storage.get_mut(index)
    }

    /// Bounds-checked access to the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::IndexOutOfBounds` if `index >= len()`.
    pub fn at(&self, index: usize) -> Result<&T, DequeError> {
        let length = self.len();
        self.storage
            .get(index)
            .ok_or(DequeError::IndexOutOfBounds { index, length })
    }

    /// # Errors
    ///
    /// Returns `DequeError::IndexOutOfBounds` if `index >= len()`.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, DequeError> {
        let length = self.len();
        self.storage
            .get_mut(index)
            .ok_or(DequeError::IndexOutOfBounds { index, length })
    }

    /// # Errors
    ///
    /// Returns `DequeError::EmptyDeque` if the deque is empty.
    pub fn front(&self) -> Result<&T, DequeError> {
        self.storage.get(0).ok_or(DequeError::EmptyDeque)
    }

    /// # Errors
    ///
    /// Returns `DequeError::EmptyDeque` if the deque is empty.
    pub fn front_mut(&mut self) -> Result<&mut T, DequeError> {
        self.storage.get_mut(0).ok_or(DequeError::EmptyDeque)
    }

    /// # Errors
    ///
    /// Returns `DequeError::EmptyDeque` if the deque is empty.
    pub fn back(&self) -> Result<&T, DequeError> {
        let last = self.len().checked_sub(1).ok_or(DequeError::EmptyDeque)?;
        self.storage.get(last).ok_or(DequeError::EmptyDeque)
    }

    /// # Errors
    ///
    /// Returns `DequeError::EmptyDeque` if the deque is empty.
    pub fn back_mut(&mut self) -> Result<&mut T, DequeError> {
        let last = self.len().checked_sub(1).ok_or(DequeError::EmptyDeque)?;
        self.storage.get_mut(last).ok_or(DequeError::EmptyDeque)
    }

    // --- End operations ---

    /// Appends an element to the back.
    ///
    /// On error the deque is unchanged apart from possibly larger map capacity.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::AllocationFailed` if a block or a larger map cannot be allocated.
    pub fn push_back(&mut self, value: T) -> Result<(), DequeError> {
        self.storage.push_back(value)
    }

    /// Prepends an element to the front.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::AllocationFailed` if a block or a larger map cannot be allocated.
    pub fn push_front(&mut self, value: T) -> Result<(), DequeError> {
        self.storage.push_front(value)
    }

    /// Removes and returns the last element. Blocks are kept for reuse.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::EmptyDeque` if the deque is empty.
    pub fn pop_back(&mut self) -> Result<T, DequeError> {
        self.storage.pop_back()
    }

    /// Removes and returns the first element. Blocks are kept for reuse.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::EmptyDeque` if the deque is empty.
    pub fn pop_front(&mut self) -> Result<T, DequeError> {
        self.storage.pop_front()
    }

    // --- Positional operations ---

    /// Inserts `value` at `index` and returns the index where it now lives,
    /// which is always `index`.
    ///
    /// Elements on the shorter side of `index` move by one; `index == len()` is
    /// a plain `push_back` and `index == 0` a plain `push_front`.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::IndexOutOfBounds` if `index > len()`, or an allocation error.
    pub fn insert(&mut self, index: usize, value: T) -> Result<usize, DequeError> {
        self.storage.insert(index, value)
    }

    /// Drops the element at `index` and returns `index`, which now names the
    /// element that followed it (or equals `len()` if the last one was erased).
    ///
    /// # Errors
    ///
    /// Returns `DequeError::IndexOutOfBounds` if `index >= len()`.
    pub fn erase(&mut self, index: usize) -> Result<usize, DequeError> {
        self.storage.remove(index).map(|_| index)
    }

    /// Removes and returns the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::IndexOutOfBounds` if `index >= len()`.
    pub fn remove(&mut self, index: usize) -> Result<T, DequeError> {
        self.storage.remove(index)
    }

    /// Drops every element in `range` and returns the range start.
    ///
    /// An empty range is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::InvalidRange` if the range is reversed or ends past `len()`.
    pub fn erase_range<R>(&mut self, range: R) -> Result<usize, DequeError>
    where
        R: RangeBounds<usize>,
    {
        let (first, last) = self.resolve_range(&range)?;
        self.storage.erase_range(first, last)
    }

    fn resolve_range<R>(&self, range: &R) -> Result<(usize, usize), DequeError>
    where
        R: RangeBounds<usize>,
    {
        let length = self.len();
        let first = match range.start_bound() {
            Bound::Included(&start) => Some(start),
            Bound::Excluded(&start) => start.checked_add(1),
            Bound::Unbounded => Some(0),
        };
        let last = match range.end_bound() {
            Bound::Included(&end) => end.checked_add(1),
            Bound::Excluded(&end) => Some(end),
            Bound::Unbounded => Some(length),
        };
        match (first, last) {
            (Some(first), Some(last)) => Ok((first, last)),
            _ => Err(DequeError::InvalidRange {
                start: first.unwrap_or(usize::MAX),
                end: last.unwrap_or(usize::MAX),
                length,
            }),
        }
    }

    // --- Bulk operations ---

    /// Shrinks to `count` elements, or grows by appending values from `fill`.
    ///
    /// # Errors
    ///
    /// Returns the first allocation error; the elements appended before it stay.
    pub fn resize_with<F>(&mut self, count: usize, fill: F) -> Result<(), DequeError>
    where
        F: FnMut() -> T,
    {
        self.storage.resize_with(count, fill)
    }

    /// Shrinks to `count` elements, or grows with clones of `value`.
    ///
    /// # Errors
    ///
    /// Returns the first allocation error; the elements appended before it stay.
    pub fn resize(&mut self, count: usize, value: T) -> Result<(), DequeError>
    where
        T: Clone,
    {
        self.storage.resize_with(count, || value.clone())
    }

    /// Shrinks to `count` elements, or grows with `T::default()`.
    ///
    /// # Errors
    ///
    /// Returns the first allocation error; the elements appended before it stay.
    pub fn resize_default(&mut self, count: usize) -> Result<(), DequeError>
    where
        T: Default,
    {
        self.storage.resize_with(count, T::default)
    }

    /// Drops elements from the back until at most `count` remain.
    pub fn truncate(&mut self, count: usize) {
        self.storage.truncate(count);
    }

    /// Replaces the contents with `count` clones of `value`.
    ///
    /// # Errors
    ///
    /// Returns the first allocation error; the elements appended before it stay.
    pub fn assign(&mut self, count: usize, value: T) -> Result<(), DequeError>
    where
        T: Clone,
    {
        self.storage.clear();
        self.storage.resize_with(count, || value.clone())
    }

    /// Replaces the contents with the items of `iter`.
    ///
    /// # Errors
    ///
    /// Returns the first allocation error; the items appended before it stay.
    pub fn assign_iter<I>(&mut self, iter: I) -> Result<(), DequeError>
    where
        I: IntoIterator<Item = T>,
    {
        self.storage.clear();
        self.storage.extend_back(iter)
    }

    /// Replaces the contents with a deep copy of `source` (copy-and-swap).
    ///
    /// # Errors
    ///
    /// Returns an allocation error; `self` is untouched in that case.
    pub fn assign_from(&mut self, source: &Self) -> Result<(), DequeError>
    where
        T: Clone,
        A: Clone,
    {
        let mut copy = source.try_clone()?;
        self.swap(&mut copy);
        Ok(())
    }

    /// Appends every item of `iter` in order.
    ///
    /// # Errors
    ///
    /// Returns the first allocation error; the items appended before it stay.
    pub fn try_extend<I>(&mut self, iter: I) -> Result<(), DequeError>
    where
        I: IntoIterator<Item = T>,
    {
        self.storage.extend_back(iter)
    }

    /// Drops every element front to back and returns the block map to its
    /// initial capacity, keeping a single block for reuse.
    pub fn clear(&mut self) {
        self.storage.clear();
    }

    /// Frees spare blocks outside the occupied range. The map capacity is kept.
    pub fn shrink_to_fit(&mut self) {
        self.storage.shrink_to_fit();
    }

    /// Exchanges the contents of two deques in O(1).
    ///
    /// Indices are not tied to contents: after the swap, index `i` of `self`
    /// names what index `i` of `other` named before.
    pub fn swap(&mut self, other: &mut Self) {
        self.storage.swap(&mut other.storage);
    }

    /// Deep copy with the same map configuration and a clone of the allocator.
    ///
    /// # Errors
    ///
    /// Returns an allocation error.
    pub fn try_clone(&self) -> Result<Self, DequeError>
    where
        T: Clone,
        A: Clone,
    {
        Ok(Self {
            storage: self.storage.try_clone()?,
        })
    }

    // --- Iteration ---

    pub fn iter(&self) -> Iter<'_, T, A> {
        Iter::new(&self.storage)
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T, A> {
        IterMut::new(&mut self.storage)
    }

    /// Returns an iterator from the back to the front.
    pub fn iter_rev(&self) -> core::iter::Rev<Iter<'_, T, A>> {
        self.iter().rev()
    }

    /// Cursor at index 0.
    #[must_use]
    pub fn begin(&self) -> Cursor<'_, T, A> {
        Cursor::new(&self.storage, 0)
    }

    /// Cursor at index `len()`, one past the last element.
    #[must_use]
    pub fn end(&self) -> Cursor<'_, T, A> {
        Cursor::new(&self.storage, self.len())
    }

    #[must_use]
    pub fn cursor_at(&self, index: usize) -> Cursor<'_, T, A> {
        Cursor::new(&self.storage, index)
    }

    #[must_use]
    pub fn begin_mut(&mut self) -> CursorMut<'_, T, A> {
        CursorMut::new(&mut self.storage, 0)
    }

    #[must_use]
    pub fn end_mut(&mut self) -> CursorMut<'_, T, A> {
        let index = self.len();
        CursorMut::new(&mut self.storage, index)
    }

    #[must_use]
    pub fn cursor_mut_at(&mut self, index: usize) -> CursorMut<'_, T, A> {
        CursorMut::new(&mut self.storage, index)
    }
}

impl<T> Default for Deque<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug, A: Allocator> fmt::Debug for Deque<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Clone, A: Allocator + Clone> Clone for Deque<T, A> {
    fn clone(&self) -> Self {
        self.try_clone().unwrap_or_else(|err| handle_error(err))
    }

    fn clone_from(&mut self, source: &Self) {
        let mut copy = source.clone();
        self.swap(&mut copy);
    }
}

impl<T: PartialEq, A: Allocator> PartialEq for Deque<T, A> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq, A: Allocator> Eq for Deque<T, A> {}

impl<T: PartialOrd, A: Allocator> PartialOrd for Deque<T, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord, A: Allocator> Ord for Deque<T, A> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: Hash, A: Allocator> Hash for Deque<T, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for value in self {
            value.hash(state);
        }
    }
}

impl<T, A: Allocator> Index<usize> for Deque<T, A> {
    type Output = T;

    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    fn index(&self, index: usize) -> &T {
        match self.storage.get(index) {
            Some(value) => value,
            None => panic!(
                "Index {} out of bounds for deque of length {}",
                index,
                self.len()
            ),
        }
    }
}

impl<T, A: Allocator> IndexMut<usize> for Deque<T, A> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        let length = self.len();
        match self.storage.get_mut(index) {
            Some(value) => value,
            None => panic!("Index {index} out of bounds for deque of length {length}"),
        }
    }
}

impl<T, A: Allocator> Extend<T> for Deque<T, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        if let Err(err) = self.storage.extend_back(iter) {
            handle_error(err);
        }
    }
}

impl<'a, T: Copy + 'a, A: Allocator> Extend<&'a T> for Deque<T, A> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T> FromIterator<T> for Deque<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut deque = Self::new();
        deque.extend(iter);
        deque
    }
}

impl<T> From<Vec<T>> for Deque<T> {
    fn from(values: Vec<T>) -> Self {
        values.into_iter().collect()
    }
}

impl<T, const N: usize> From<[T; N]> for Deque<T> {
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

impl<T, A: Allocator> IntoIterator for Deque<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}

impl<'a, T, A: Allocator> IntoIterator for &'a Deque<T, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, A: Allocator> IntoIterator for &'a mut Deque<T, A> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
