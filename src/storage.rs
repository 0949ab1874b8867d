use core::marker::PhantomData;
use core::ptr::{self, NonNull};

use allocator_api2::alloc::{Allocator, Global};

use crate::block_map::BlockMap;
use crate::error::DequeError;
use crate::memory::{MemoryAdapter, BLOCK_SIZE};

/// A `(block, offset)` cursor into the segmented space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Position {
    pub(crate) block: usize,
    pub(crate) offset: usize,
}

impl Position {
    fn advanced(self) -> Self {
        if self.offset + 1 == BLOCK_SIZE {
            Self {
                block: self.block + 1,
                offset: 0,
            }
        } else {
            Self {
                block: self.block,
                offset: self.offset + 1,
            }
        }
    }

    fn retreated(self) -> Self {
        if self.offset == 0 {
            Self {
                block: self.block - 1,
                offset: BLOCK_SIZE - 1,
            }
        } else {
            Self {
                block: self.block,
                offset: self.offset - 1,
            }
        }
    }
}

/// Segmented storage engine behind `Deque`.
///
/// Live elements occupy the half-open range `[start, finish)`. `finish` is
/// always normalized (`offset < BLOCK_SIZE`) and always names a valid map slot,
/// although the block under it may not be allocated until the next `push_back`.
/// Element `i` lives at `start.block + (start.offset + i) / BLOCK_SIZE`, offset
/// `(start.offset + i) % BLOCK_SIZE`.
pub(crate) struct SegmentedStorage<T, A: Allocator = Global> {
    map: BlockMap<T, A>,
    start: Position,
    finish: Position,
    len: usize,
    _marker: PhantomData<T>,
}

// Safe: the storage exclusively owns its blocks and elements, like `Vec<T, A>`
unsafe impl<T: Send, A: Allocator + Send> Send for SegmentedStorage<T, A> {}
unsafe impl<T: Sync, A: Allocator + Sync> Sync for SegmentedStorage<T, A> {}

impl<T, A: Allocator> SegmentedStorage<T, A> {
    /// Creates an empty engine whose cursors sit in the middle of the central block.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::InvalidConfiguration` for a zero `map_capacity`, or
    /// `DequeError::AllocationFailed` if the map or the central block cannot be allocated.
    pub(crate) fn new(map_capacity: usize, alloc: A) -> Result<Self, DequeError> {
        let map = BlockMap::new(map_capacity, alloc)?;
        let start = Self::central_position(&map);
        Ok(Self {
            map,
            start,
            finish: start,
            len: 0,
            _marker: PhantomData,
        })
    }

    fn central_position(map: &BlockMap<T, A>) -> Position {
        Position {
            block: map.center(),
            offset: BLOCK_SIZE / 2,
        }
    }

    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub(crate) fn map_capacity(&self) -> usize {
        self.map.capacity()
    }

    #[must_use]
    pub(crate) fn allocated_blocks(&self) -> usize {
        self.map.allocated_blocks()
    }

    pub(crate) fn allocator(&self) -> &A {
        self.map.allocator()
    }

    fn locate(&self, index: usize) -> Position {
        let absolute = self.start.offset + index;
        Position {
            block: self.start.block + absolute / BLOCK_SIZE,
            offset: absolute % BLOCK_SIZE,
        }
    }

    /// Pointer to the live element at logical `index`, or `None` past the end.
    pub(crate) fn slot_ptr(&self, index: usize) -> Option<NonNull<T>> {
        if index >= self.len {
            return None;
        }
        let position = self.locate(index);
        self.map.element(position.block, position.offset)
    }

    #[must_use]
    pub(crate) fn get(&self, index: usize) -> Option<&T> {
        // Safe: slot_ptr only returns slots inside [start, finish), which are live
        self.slot_ptr(index).map(|slot| unsafe { &*slot.as_ptr() })
    }

    #[must_use]
    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        // Safe: as in `get`, and `&mut self` guarantees exclusive access
        self.slot_ptr(index).map(|slot| unsafe { &mut *slot.as_ptr() })
    }

    /// Re-bases both cursors after the block map moved the active range.
    fn grow_map(&mut self, at_front: bool) -> Result<(), DequeError> {
        let span = self.finish.block - self.start.block;
        let first = self
            .map
            .grow_if_needed(self.start.block, self.finish.block, at_front)?;
        self.start.block = first;
        self.finish.block = first + span;
        Ok(())
    }

    /// Appends `value` after the last element.
    ///
    /// Map growth and block allocation happen before the element is written, so
    /// on error the cursors and length are unchanged.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::AllocationFailed` or `DequeError::CapacityOverflow`.
    pub(crate) fn push_back(&mut self, value: T) -> Result<(), DequeError> {
        // Advancing past the last slot of the block must land inside the map.
        if self.finish.offset + 1 == BLOCK_SIZE {
            self.grow_map(false)?;
        }
        let target = self.finish;
        let slot = self.map.ensure_element(target.block, target.offset)?;
        // Safe: `target` is one past the last live element, so the slot is vacant
        unsafe { MemoryAdapter::<T, A>::construct(slot, value) };
        self.finish = target.advanced();
        self.len += 1;
        Ok(())
    }

    /// Prepends `value` before the first element.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::AllocationFailed` or `DequeError::CapacityOverflow`.
    pub(crate) fn push_front(&mut self, value: T) -> Result<(), DequeError> {
        if self.start.offset == 0 {
            self.grow_map(true)?;
        }
        let target = self.start.retreated();
        let slot = self.map.ensure_element(target.block, target.offset)?;
        // Safe: `target` is just before the first live element, so the slot is vacant
        unsafe { MemoryAdapter::<T, A>::construct(slot, value) };
        self.start = target;
        self.len += 1;
        Ok(())
    }

    /// Retracts `finish` over the last element and returns its now-dead slot.
    fn detach_back(&mut self) -> Option<NonNull<T>> {
        let slot = self.slot_ptr(self.len.checked_sub(1)?)?;
        self.finish = self.finish.retreated();
        self.len -= 1;
        if self.len == 0 {
            self.start = self.finish;
        }
        Some(slot)
    }

    /// Advances `start` over the first element and returns its now-dead slot.
    fn detach_front(&mut self) -> Option<NonNull<T>> {
        let slot = self.slot_ptr(0)?;
        self.start = self.start.advanced();
        self.len -= 1;
        if self.len == 0 {
            self.finish = self.start;
        }
        Some(slot)
    }

    /// # Errors
    ///
    /// Returns `DequeError::EmptyDeque` if there is no element to remove.
    pub(crate) fn pop_back(&mut self) -> Result<T, DequeError> {
        let slot = self.detach_back().ok_or(DequeError::EmptyDeque)?;
        // Safe: the slot held the last live element and is no longer tracked
        Ok(unsafe { MemoryAdapter::<T, A>::take(slot) })
    }

    /// # Errors
    ///
    /// Returns `DequeError::EmptyDeque` if there is no element to remove.
    pub(crate) fn pop_front(&mut self) -> Result<T, DequeError> {
        let slot = self.detach_front().ok_or(DequeError::EmptyDeque)?;
        // Safe: the slot held the first live element and is no longer tracked
        Ok(unsafe { MemoryAdapter::<T, A>::take(slot) })
    }

    fn destroy_back(&mut self) {
        if let Some(slot) = self.detach_back() {
            // Safe: the slot held a live element and is no longer tracked
            unsafe { MemoryAdapter::<T, A>::destroy(slot) };
        }
    }

    fn destroy_front(&mut self) {
        if let Some(slot) = self.detach_front() {
            // Safe: the slot held a live element and is no longer tracked
            unsafe { MemoryAdapter::<T, A>::destroy(slot) };
        }
    }

    /// Exchanges two live elements by moving them; out-of-range indices are ignored.
    pub(crate) fn swap_elements(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        if let (Some(first), Some(second)) = (self.slot_ptr(a), self.slot_ptr(b)) {
            // Safe: distinct live slots never overlap
            unsafe { ptr::swap_nonoverlapping(first.as_ptr(), second.as_ptr(), 1) };
        }
    }

    /// Inserts `value` so that it ends up at `index`, shifting the shorter side.
    ///
    /// `index == len` is exactly `push_back` and `index == 0` is exactly
    /// `push_front`. Returns `index`.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::IndexOutOfBounds` if `index > len`, or an allocation error.
    pub(crate) fn insert(&mut self, index: usize, value: T) -> Result<usize, DequeError> {
        if index > self.len {
            return Err(DequeError::IndexOutOfBounds {
                index,
                length: self.len,
            });
        }

        if index < self.len - index {
            self.push_front(value)?;
            for i in 0..index {
                self.swap_elements(i, i + 1);
            }
        } else {
            self.push_back(value)?;
            for i in (index..self.len - 1).rev() {
                self.swap_elements(i, i + 1);
            }
        }
        Ok(index)
    }

    /// Removes and returns the element at `index`, shifting the shorter side.
    ///
    /// Removing the last or first element is exactly `pop_back` or `pop_front`.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::IndexOutOfBounds` if `index >= len`.
    pub(crate) fn remove(&mut self, index: usize) -> Result<T, DequeError> {
        if index >= self.len {
            return Err(DequeError::IndexOutOfBounds {
                index,
                length: self.len,
            });
        }

        if index < self.len - 1 - index {
            for i in (0..index).rev() {
                self.swap_elements(i, i + 1);
            }
            self.pop_front()
        } else {
            for i in index..self.len - 1 {
                self.swap_elements(i, i + 1);
            }
            self.pop_back()
        }
    }

    /// Drops the elements in `[first, last)` and closes the gap. Returns `first`.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::InvalidRange` unless `first <= last <= len`.
    pub(crate) fn erase_range(&mut self, first: usize, last: usize) -> Result<usize, DequeError> {
        if first > last || last > self.len {
            return Err(DequeError::InvalidRange {
                start: first,
                end: last,
                length: self.len,
            });
        }

        let count = last - first;
        if count == 0 {
            return Ok(first);
        }

        if first < self.len - last {
            for i in (0..first).rev() {
                self.swap_elements(i, i + count);
            }
            for _ in 0..count {
                self.destroy_front();
            }
        } else {
            for i in first..self.len - count {
                self.swap_elements(i, i + count);
            }
            for _ in 0..count {
                self.destroy_back();
            }
        }
        Ok(first)
    }

    /// Drops elements from the back until at most `count` remain.
    pub(crate) fn truncate(&mut self, count: usize) {
        while self.len > count {
            self.destroy_back();
        }
    }

    /// Shrinks to `count` or grows by appending values from `fill`, one at a time.
    ///
    /// # Errors
    ///
    /// Returns the first push error; the elements appended so far stay in place.
    pub(crate) fn resize_with<F>(&mut self, count: usize, mut fill: F) -> Result<(), DequeError>
    where
        F: FnMut() -> T,
    {
        self.truncate(count);
        while self.len < count {
            self.push_back(fill())?;
        }
        Ok(())
    }

    /// Appends every item of `iter` in order.
    ///
    /// # Errors
    ///
    /// Returns the first push error; the items appended so far stay in place.
    pub(crate) fn extend_back<I>(&mut self, iter: I) -> Result<(), DequeError>
    where
        I: IntoIterator<Item = T>,
    {
        for value in iter {
            self.push_back(value)?;
        }
        Ok(())
    }

    /// Drops every element front to back, then resets the map to its initial shape.
    ///
    /// If the central block cannot be re-allocated the deque stays empty and
    /// usable; the next push allocates it.
    pub(crate) fn clear(&mut self) {
        while self.len > 0 {
            self.destroy_front();
        }
        if let Err(err) = self.map.reset(self.start.block) {
            tracing::warn!(%err, "central block not restored on clear");
        }
        self.start = Self::central_position(&self.map);
        self.finish = self.start;
    }

    /// Releases blocks outside the active range. Returns how many were freed.
    pub(crate) fn shrink_to_fit(&mut self) -> usize {
        let released = self.map.release_outside(self.start.block, self.finish.block);
        tracing::trace!(released, "spare blocks released");
        released
    }

    /// Exchanges the complete state of two engines without touching any element.
    pub(crate) fn swap(&mut self, other: &mut Self) {
        core::mem::swap(&mut self.map, &mut other.map);
        core::mem::swap(&mut self.start, &mut other.start);
        core::mem::swap(&mut self.finish, &mut other.finish);
        core::mem::swap(&mut self.len, &mut other.len);
    }

    /// Deep copy into a fresh engine sharing the configuration and a clone of the allocator.
    ///
    /// # Errors
    ///
    /// Returns an allocation error; the partial copy is dropped.
    pub(crate) fn try_clone(&self) -> Result<Self, DequeError>
    where
        T: Clone,
        A: Clone,
    {
        let mut copy = Self::new(self.map.initial_capacity(), self.allocator().clone())?;
        for index in 0..self.len {
            if let Some(value) = self.get(index) {
                copy.push_back(value.clone())?;
            }
        }
        Ok(copy)
    }
}

impl<T, A: Allocator> Drop for SegmentedStorage<T, A> {
    fn drop(&mut self) {
        while self.len > 0 {
            self.destroy_front();
        }
    }
}
