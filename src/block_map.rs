use core::alloc::Layout;
use core::ptr::NonNull;

use allocator_api2::alloc::Allocator;

use crate::error::DequeError;
use crate::memory::{MemoryAdapter, BLOCK_SIZE};

/// Number of map slots a default-constructed deque starts with.
pub const INITIAL_MAP_CAPACITY: usize = 8;

/// Owned handle to one block of `BLOCK_SIZE` slots.
///
/// Neither `Copy` nor `Clone`: a block lives in exactly one map slot
/// and leaves it only by moving to another slot or by being released.
struct Block<T> {
    base: NonNull<T>,
    layout: Layout,
}

impl<T> Block<T> {
    fn slot(&self, offset: usize) -> NonNull<T> {
        debug_assert!(offset < BLOCK_SIZE);
        // Safe: offset < BLOCK_SIZE keeps the pointer inside the block allocation
        unsafe {
            NonNull::new_unchecked(self.base.as_ptr().add(offset))
        }
    }
}

fn empty_slots<T>(capacity: usize) -> Result<Vec<Option<Block<T>>>, DequeError> {
    let mut slots = Vec::new();
    slots.try_reserve_exact(capacity).map_err(|_| {
        match Layout::array::<Option<Block<T>>>(capacity) {
            Ok(layout) => DequeError::AllocationFailed { layout },
            Err(_) => DequeError::CapacityOverflow,
        }
    })?;
    slots.resize_with(capacity, || None);
    Ok(slots)
}

/// Indirection array of block slots.
///
/// Every slot index below `capacity()` is valid; a slot is either empty or owns
/// one block. The slot array itself uses the global allocator, blocks use `A`.
pub(crate) struct BlockMap<T, A: Allocator> {
    slots: Vec<Option<Block<T>>>,
    initial_capacity: usize,
    memory: MemoryAdapter<T, A>,
}

impl<T, A: Allocator> BlockMap<T, A> {
    /// Creates a map of `initial_capacity` slots with the central block allocated.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::InvalidConfiguration` if `initial_capacity` is 0, or
    /// `DequeError::AllocationFailed` if the map or the central block cannot be allocated.
    pub(crate) fn new(initial_capacity: usize, alloc: A) -> Result<Self, DequeError> {
        if initial_capacity == 0 {
            return Err(DequeError::InvalidConfiguration {
                parameter: "map_capacity",
                value: initial_capacity,
            });
        }

        let mut map = Self {
            slots: empty_slots(initial_capacity)?,
            initial_capacity,
            memory: MemoryAdapter::new(alloc),
        };
        map.ensure_allocated(map.center())?;
        Ok(map)
    }

    #[must_use]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub(crate) fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }

    #[must_use]
    pub(crate) fn center(&self) -> usize {
        self.slots.len() / 2
    }

    #[must_use]
    pub(crate) fn allocated_blocks(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub(crate) fn allocator(&self) -> &A {
        self.memory.allocator()
    }

    /// Guarantees that slot `index` owns a block and returns its base pointer.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::IndexOutOfBounds` for a slot past the capacity, or
    /// `DequeError::AllocationFailed` if a new block cannot be allocated.
    pub(crate) fn ensure_allocated(&mut self, index: usize) -> Result<NonNull<T>, DequeError> {
        let capacity = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(DequeError::IndexOutOfBounds {
                index,
                length: capacity,
            })?;
        if let Some(block) = slot {
            return Ok(block.base);
        }
        let (base, layout) = self.memory.allocate_block()?;
        *slot = Some(Block { base, layout });
        Ok(base)
    }

    /// Like `ensure_allocated`, but returns the pointer to `offset` inside the block.
    pub(crate) fn ensure_element(
        &mut self,
        index: usize,
        offset: usize,
    ) -> Result<NonNull<T>, DequeError> {
        self.ensure_allocated(index)?;
        self.element(index, offset)
            .ok_or(DequeError::IndexOutOfBounds {
                index,
                length: self.slots.len(),
            })
    }

    /// Pointer to `offset` inside block `index`, or `None` if that slot owns no block.
    #[must_use]
    pub(crate) fn element(&self, index: usize, offset: usize) -> Option<NonNull<T>> {
        self.slots
            .get(index)?
            .as_ref()
            .map(|block| block.slot(offset))
    }

    /// Grows the map if the active block range `[first, last]` has no room in
    /// the requested direction.
    ///
    /// The active blocks move, in order and without touching their elements, to
    /// a window centered in a map of at least twice the capacity, or in a map of
    /// the same capacity when fewer than half of the slots are in use. Blocks
    /// outside the active range are released. Returns the new index of `first`, which is
    /// `first` itself when no growth was needed.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::AllocationFailed` or `DequeError::CapacityOverflow`;
    /// the map is unchanged in both cases.
    pub(crate) fn grow_if_needed(
        &mut self,
        first: usize,
        last: usize,
        at_front: bool,
    ) -> Result<usize, DequeError> {
        debug_assert!(first <= last && last < self.slots.len());
        let old_capacity = self.slots.len();
        let has_room = if at_front {
            first > 0
        } else {
            last + 1 < old_capacity
        };
        if has_room {
            return Ok(first);
        }

        let used = last - first + 1;
        // A map that is less than half full is re-centered at its current size.
        let new_capacity = if 2 * (used + 1) < old_capacity {
            old_capacity
        } else {
            old_capacity
                .checked_mul(2)
                .ok_or(DequeError::CapacityOverflow)?
                .max(used + 2)
        };
        let new_slots = match empty_slots(new_capacity) {
            Ok(slots) => slots,
            Err(err) => {
                tracing::warn!(old_capacity, new_capacity, "block map growth failed");
                return Err(err);
            }
        };
        let new_first = (new_capacity - used) / 2;

        let old_slots = core::mem::replace(&mut self.slots, new_slots);
        let mut spare = 0usize;
        for (index, slot) in old_slots.into_iter().enumerate() {
            if (first..=last).contains(&index) {
                self.slots[new_first + index - first] = slot;
            } else if let Some(block) = slot {
                self.release(block);
                spare += 1;
            }
        }

        tracing::debug!(
            old_capacity,
            new_capacity,
            spare_released = spare,
            "block map rebuilt"
        );
        Ok(new_first)
    }

    /// Rebuilds the map at its initial capacity with exactly one block in the
    /// central slot.
    ///
    /// The block in slot `keep` is preferred; any other allocated block is used if
    /// that slot is empty, and a fresh block is allocated if the map holds none.
    /// Must only be called when no slot holds a live element.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::AllocationFailed` if a fresh central block is needed
    /// and cannot be allocated. The map is still reset, with an empty central slot.
    pub(crate) fn reset(&mut self, keep: usize) -> Result<(), DequeError> {
        let old_capacity = self.slots.len();
        let mut kept = self.slots.get_mut(keep).and_then(Option::take);
        for slot in &mut self.slots {
            if let Some(block) = slot.take() {
                if kept.is_none() {
                    kept = Some(block);
                } else {
                    // Safe: the caller destroyed every live element before resetting
                    unsafe {
                        self.memory.deallocate_block(block.base, block.layout);
                    }
                }
            }
        }

        self.slots.clear();
        self.slots.resize_with(self.initial_capacity, || None);
        self.slots.shrink_to(self.initial_capacity);
        let center = self.center();
        self.slots[center] = kept;

        tracing::debug!(
            old_capacity,
            new_capacity = self.initial_capacity,
            "block map reset"
        );
        self.ensure_allocated(center).map(|_| ())
    }

    /// Releases every block outside `[first, last]`. Returns how many were freed.
    pub(crate) fn release_outside(&mut self, first: usize, last: usize) -> usize {
        let mut released = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if (first..=last).contains(&index) {
                continue;
            }
            if let Some(block) = slot.take() {
                // Safe: blocks outside the active range hold no live elements
                unsafe {
                    self.memory.deallocate_block(block.base, block.layout);
                }
                released += 1;
            }
        }
        released
    }

    fn release(&self, block: Block<T>) {
        // Safe: released blocks come from this adapter and hold no live elements
        unsafe {
            self.memory.deallocate_block(block.base, block.layout);
        }
    }
}

impl<T, A: Allocator> Drop for BlockMap<T, A> {
    fn drop(&mut self) {
        for slot in &mut self.slots {
            if let Some(block) = slot.take() {
                // Safe: the storage engine destroys all elements before its map drops
                unsafe {
                    self.memory.deallocate_block(block.base, block.layout);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use allocator_api2::alloc::Global;

    fn map(capacity: usize) -> BlockMap<u32, Global> {
        BlockMap::new(capacity, Global).unwrap()
    }

    #[test]
    fn test_new_allocates_central_block() {
        let map = map(INITIAL_MAP_CAPACITY);
        assert_eq!(map.capacity(), 8);
        assert_eq!(map.center(), 4);
        assert_eq!(map.allocated_blocks(), 1);
        assert!(map.element(4, 0).is_some());
        assert!(map.element(3, 0).is_none());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = BlockMap::<u32, Global>::new(0, Global);
        assert_eq!(
            result.err(),
            Some(DequeError::InvalidConfiguration {
                parameter: "map_capacity",
                value: 0
            })
        );
    }

    #[test]
    fn test_ensure_allocated_is_idempotent() {
        let mut map = map(8);
        let first = map.ensure_allocated(5).unwrap();
        let second = map.ensure_allocated(5).unwrap();
        assert_eq!(first, second);
        assert_eq!(map.allocated_blocks(), 2);
    }

    #[test]
    fn test_ensure_allocated_out_of_range() {
        let mut map = map(4);
        assert_eq!(
            map.ensure_allocated(4),
            Err(DequeError::IndexOutOfBounds {
                index: 4,
                length: 4
            })
        );
    }

    #[test]
    fn test_no_growth_with_room() {
        let mut map = map(8);
        assert_eq!(map.grow_if_needed(3, 5, false).unwrap(), 3);
        assert_eq!(map.grow_if_needed(3, 5, true).unwrap(), 3);
        assert_eq!(map.capacity(), 8);
    }

    #[test]
    fn test_grow_at_back_recenters_and_keeps_blocks() {
        let mut map = map(8);
        let mut bases = Vec::new();
        for index in 4..8 {
            bases.push(map.ensure_allocated(index).unwrap());
        }

        let new_first = map.grow_if_needed(4, 7, false).unwrap();
        assert_eq!(map.capacity(), 16);
        assert_eq!(new_first, 6);
        for (i, base) in bases.iter().enumerate() {
            assert_eq!(map.element(new_first + i, 0), Some(*base));
        }
        assert_eq!(map.allocated_blocks(), 4);
    }

    #[test]
    fn test_grow_at_front_releases_spare_blocks() {
        let mut map = map(8);
        let base = map.ensure_allocated(0).unwrap();
        map.ensure_allocated(6).unwrap();

        let new_first = map.grow_if_needed(0, 0, true).unwrap();
        assert!(new_first > 0);
        assert_eq!(map.element(new_first, 0), Some(base));
        // the central block and slot 6 were outside the active range
        assert_eq!(map.allocated_blocks(), 1);
    }

    #[test]
    fn test_sparse_map_recenters_without_growing() {
        let mut map = map(16);
        let base = map.ensure_allocated(15).unwrap();

        let new_first = map.grow_if_needed(15, 15, false).unwrap();
        assert_eq!(map.capacity(), 16);
        assert_eq!(new_first, 7);
        assert_eq!(map.element(new_first, 0), Some(base));
    }

    #[test]
    fn test_grow_single_slot_map() {
        let mut map = map(1);
        let new_first = map.grow_if_needed(0, 0, true).unwrap();
        assert!(new_first >= 1);
        assert!(new_first + 1 < map.capacity());
    }

    #[test]
    fn test_reset_keeps_one_block() {
        let mut map = map(8);
        let kept = map.ensure_allocated(6).unwrap();
        map.ensure_allocated(7).unwrap();
        map.grow_if_needed(4, 7, false).unwrap();
        assert_eq!(map.capacity(), 16);

        let keep = (0..map.capacity())
            .find(|&index| map.element(index, 0) == Some(kept))
            .unwrap();
        map.reset(keep).unwrap();
        assert_eq!(map.capacity(), 8);
        assert_eq!(map.allocated_blocks(), 1);
        assert_eq!(map.element(map.center(), 0), Some(kept));
    }

    #[test]
    fn test_reset_of_empty_map_allocates_central_block() {
        let mut map = map(8);
        map.ensure_allocated(5).unwrap();
        // an empty range that sits past every allocated block
        assert_eq!(map.release_outside(6, 6), 2);
        assert_eq!(map.allocated_blocks(), 0);

        map.reset(6).unwrap();
        assert_eq!(map.capacity(), 8);
        assert_eq!(map.allocated_blocks(), 1);
        assert!(map.element(map.center(), 0).is_some());
    }

    #[test]
    fn test_release_outside() {
        let mut map = map(8);
        for index in 0..8 {
            map.ensure_allocated(index).unwrap();
        }
        assert_eq!(map.release_outside(2, 4), 5);
        assert_eq!(map.allocated_blocks(), 3);
        assert_eq!(map.capacity(), 8);
    }
}
