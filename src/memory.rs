use core::alloc::Layout;
use core::marker::PhantomData;
use core::ptr::{self, NonNull};

use allocator_api2::alloc::Allocator;

use crate::error::DequeError;

/// Number of element slots in every block.
pub const BLOCK_SIZE: usize = 64;

/// Raw block memory and element lifecycle on top of a pluggable allocator.
///
/// The adapter never tracks which slots are live; that is the storage engine's
/// job. It only pairs every block allocation with the layout used to release it.
pub(crate) struct MemoryAdapter<T, A: Allocator> {
    alloc: A,
    _marker: PhantomData<T>,
}

impl<T, A: Allocator> MemoryAdapter<T, A> {
    pub(crate) fn new(alloc: A) -> Self {
        Self {
            alloc,
            _marker: PhantomData,
        }
    }

    pub(crate) fn allocator(&self) -> &A {
        &self.alloc
    }

    pub(crate) fn block_layout() -> Result<Layout, DequeError> {
        Layout::array::<T>(BLOCK_SIZE).map_err(|_| DequeError::CapacityOverflow)
    }

    /// Allocates uninitialized memory for one block.
    ///
    /// Returns the block together with the layout it must be released with.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::AllocationFailed` if the allocator refuses the request.
    pub(crate) fn allocate_block(&self) -> Result<(NonNull<T>, Layout), DequeError> {
        let layout = Self::block_layout()?;
        match self.alloc.allocate(layout) {
            Ok(block) => {
                tracing::trace!(bytes = layout.size(), "block allocated");
                Ok((block.cast::<T>(), layout))
            }
            Err(_) => {
                tracing::warn!(bytes = layout.size(), "block allocation failed");
                Err(DequeError::AllocationFailed { layout })
            }
        }
    }

    /// Returns a block to the allocator.
    ///
    /// # Safety
    ///
    /// `block` must come from `allocate_block` on this adapter together with
    /// `layout`, must not have been released already, and must hold no live elements.
    pub(crate) unsafe fn deallocate_block(&self, block: NonNull<T>, layout: Layout) {
        self.alloc.deallocate(block.cast::<u8>(), layout);
        tracing::trace!(bytes = layout.size(), "block released");
    }

    /// # Safety
    ///
    /// `slot` must point into a block of this adapter and must not hold a live element.
    pub(crate) unsafe fn construct(slot: NonNull<T>, value: T) {
        slot.as_ptr().write(value);
    }

    /// # Safety
    ///
    /// `slot` must hold a live element, which is dead afterwards.
    pub(crate) unsafe fn destroy(slot: NonNull<T>) {
        ptr::drop_in_place(slot.as_ptr());
    }

    /// Moves the element out of `slot`.
    ///
    /// # Safety
    ///
    /// `slot` must hold a live element, which is dead afterwards.
    pub(crate) unsafe fn take(slot: NonNull<T>) -> T {
        slot.as_ptr().read()
    }
}

/// Aborts the way std collections do when an infallible entry point hits a failure.
pub(crate) fn handle_error(err: DequeError) -> ! {
    match err {
        DequeError::AllocationFailed { layout } => std::alloc::handle_alloc_error(layout),
        other => panic!("{other}"),
    }
}
