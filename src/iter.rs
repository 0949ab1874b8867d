use core::iter::FusedIterator;
use core::marker::PhantomData;

use allocator_api2::alloc::{Allocator, Global};

use crate::deque::Deque;
use crate::storage::SegmentedStorage;

/// Iterator over shared references to the elements of a `Deque`
///
/// Walks logical indices `[front, back)`; reverse iteration comes from
/// `DoubleEndedIterator`. This iterator implements `Clone`.
pub struct Iter<'a, T, A: Allocator = Global> {
    storage: &'a SegmentedStorage<T, A>,
    front: usize,
    back: usize,
}

impl<'a, T, A: Allocator> Iter<'a, T, A> {
    pub(crate) fn new(storage: &'a SegmentedStorage<T, A>) -> Self {
        Self {
            storage,
            front: 0,
            back: storage.len(),
        }
    }
}

impl<T, A: Allocator> Clone for Iter<'_, T, A> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage,
            front: self.front,
            back: self.back,
        }
    }
}

impl<'a, T, A: Allocator> Iterator for Iter<'a, T, A> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        let item = self.storage.get(self.front);
        self.front += 1;
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.front = self.front.saturating_add(n).min(self.back);
        self.next()
    }
}

impl<T, A: Allocator> DoubleEndedIterator for Iter<'_, T, A> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        self.storage.get(self.back)
    }
}

impl<T, A: Allocator> ExactSizeIterator for Iter<'_, T, A> {}

impl<T, A: Allocator> FusedIterator for Iter<'_, T, A> {}

/// Iterator over mutable references to the elements of a `Deque`
pub struct IterMut<'a, T, A: Allocator = Global> {
    // Created from a `&mut` borrow held for 'a; elements are reached through
    // block pointers, never through this reference.
    storage: &'a SegmentedStorage<T, A>,
    front: usize,
    back: usize,
    _marker: PhantomData<&'a mut T>,
}

impl<'a, T, A: Allocator> IterMut<'a, T, A> {
    pub(crate) fn new(storage: &'a mut SegmentedStorage<T, A>) -> Self {
        let back = storage.len();
        Self {
            storage,
            front: 0,
            back,
            _marker: PhantomData,
        }
    }
}

impl<'a, T, A: Allocator> Iterator for IterMut<'a, T, A> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        let slot = self.storage.slot_ptr(self.front)?;
        self.front += 1;
        // Safe: every index in [front, back) is yielded at most once, so the
        // returned references never alias
        Some(unsafe { &mut *slot.as_ptr() })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<T, A: Allocator> DoubleEndedIterator for IterMut<'_, T, A> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        let slot = self.storage.slot_ptr(self.back)?;
        // Safe: see `next`
        Some(unsafe { &mut *slot.as_ptr() })
    }
}

impl<T, A: Allocator> ExactSizeIterator for IterMut<'_, T, A> {}

impl<T, A: Allocator> FusedIterator for IterMut<'_, T, A> {}

/// Owning iterator over the elements of a `Deque`
pub struct IntoIter<T, A: Allocator = Global> {
    inner: Deque<T, A>,
}

impl<T, A: Allocator> IntoIter<T, A> {
    pub(crate) fn new(inner: Deque<T, A>) -> Self {
        Self { inner }
    }
}

impl<T, A: Allocator> Iterator for IntoIter<T, A> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.pop_front().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.inner.len();
        (remaining, Some(remaining))
    }
}

impl<T, A: Allocator> DoubleEndedIterator for IntoIter<T, A> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.pop_back().ok()
    }
}

impl<T, A: Allocator> ExactSizeIterator for IntoIter<T, A> {}

impl<T, A: Allocator> FusedIterator for IntoIter<T, A> {}
