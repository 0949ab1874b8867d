use core::cmp::Ordering;
use core::fmt;
use core::ops::{Add, AddAssign, Sub, SubAssign};

use allocator_api2::alloc::{Allocator, Global};

use crate::error::DequeError;
use crate::storage::SegmentedStorage;

/// Read-only random-access position in a `Deque`.
///
/// A cursor is a deque reference plus a logical index, not a pointer into a
/// block, so arithmetic never needs to know about block boundaries. It may
/// point anywhere, including before the first element or at `len()`;
/// dereferencing such a position yields `None`.
///
/// Two cursors are equal when they borrow the same deque and hold the same
/// index. Cursors over different deques are unordered.
pub struct Cursor<'a, T, A: Allocator = Global> {
    storage: &'a SegmentedStorage<T, A>,
    index: usize,
}

impl<'a, T, A: Allocator> Cursor<'a, T, A> {
    pub(crate) fn new(storage: &'a SegmentedStorage<T, A>, index: usize) -> Self {
        Self { storage, index }
    }

    /// Logical index this cursor denotes.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Element under the cursor, or `None` outside `[0, len)`.
    #[must_use]
    pub fn get(&self) -> Option<&'a T> {
        self.storage.get(self.index)
    }

    /// Element `n` positions away, the equivalent of `*(cursor + n)`.
    #[must_use]
    pub fn at(&self, n: isize) -> Option<&'a T> {
        (*self + n).get()
    }

    pub fn move_next(&mut self) {
        *self += 1;
    }

    pub fn move_prev(&mut self) {
        *self -= 1;
    }

    /// Signed distance `self - other`.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn offset_from(&self, other: &Self) -> isize {
        (self.index as isize).wrapping_sub(other.index as isize)
    }

    fn same_deque(&self, other: &Self) -> bool {
        core::ptr::eq(self.storage, other.storage)
    }
}

impl<T, A: Allocator> Clone for Cursor<'_, T, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, A: Allocator> Copy for Cursor<'_, T, A> {}

impl<T, A: Allocator> fmt::Debug for Cursor<'_, T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("index", &self.index)
            .field("len", &self.storage.len())
            .finish()
    }
}

impl<T, A: Allocator> PartialEq for Cursor<'_, T, A> {
    fn eq(&self, other: &Self) -> bool {
        self.same_deque(other) && self.index == other.index
    }
}

impl<T, A: Allocator> Eq for Cursor<'_, T, A> {}

impl<T, A: Allocator> PartialOrd for Cursor<'_, T, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.same_deque(other) {
            Some(self.index.cmp(&other.index))
        } else {
            None
        }
    }
}

impl<T, A: Allocator> AddAssign<isize> for Cursor<'_, T, A> {
    fn add_assign(&mut self, n: isize) {
        self.index = self.index.wrapping_add_signed(n);
    }
}

impl<T, A: Allocator> SubAssign<isize> for Cursor<'_, T, A> {
    fn sub_assign(&mut self, n: isize) {
        self.index = self.index.wrapping_add_signed(n.wrapping_neg());
    }
}

impl<T, A: Allocator> Add<isize> for Cursor<'_, T, A> {
    type Output = Self;

    fn add(mut self, n: isize) -> Self {
        self += n;
        self
    }
}

impl<T, A: Allocator> Sub<isize> for Cursor<'_, T, A> {
    type Output = Self;

    fn sub(mut self, n: isize) -> Self {
        self -= n;
        self
    }
}

impl<T, A: Allocator> Sub for Cursor<'_, T, A> {
    type Output = isize;

    fn sub(self, other: Self) -> isize {
        self.offset_from(&other)
    }
}

/// Mutable random-access position in a `Deque`.
///
/// Holds the deque exclusively, so nothing else can shift elements under it.
/// Converts into a read-only [`Cursor`] with `From` or [`CursorMut::as_cursor`];
/// there is no conversion in the other direction.
pub struct CursorMut<'a, T, A: Allocator = Global> {
    storage: &'a mut SegmentedStorage<T, A>,
    index: usize,
}

impl<'a, T, A: Allocator> CursorMut<'a, T, A> {
    pub(crate) fn new(storage: &'a mut SegmentedStorage<T, A>, index: usize) -> Self {
        Self { storage, index }
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn get(&self) -> Option<&T> {
        self.storage.get(self.index)
    }

    #[must_use]
    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.storage.get_mut(self.index)
    }

    #[must_use]
    pub fn at(&self, n: isize) -> Option<&T> {
        self.storage.get(self.index.wrapping_add_signed(n))
    }

    #[must_use]
    pub fn at_mut(&mut self, n: isize) -> Option<&mut T> {
        self.storage.get_mut(self.index.wrapping_add_signed(n))
    }

    pub fn move_next(&mut self) {
        *self += 1;
    }

    pub fn move_prev(&mut self) {
        *self -= 1;
    }

    /// Read-only view of the same position.
    #[must_use]
    pub fn as_cursor(&self) -> Cursor<'_, T, A> {
        Cursor::new(&*self.storage, self.index)
    }

    /// Inserts `value` at the cursor; the cursor then points at the new element.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::IndexOutOfBounds` if the cursor is past `len()`, or an
    /// allocation error.
    pub fn insert(&mut self, value: T) -> Result<(), DequeError> {
        self.index = self.storage.insert(self.index, value)?;
        Ok(())
    }

    /// Removes the element under the cursor; the cursor then points at the
    /// element that followed it, or at `len()` if it was the last one.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::IndexOutOfBounds` if the cursor is not on an element.
    pub fn remove(&mut self) -> Result<T, DequeError> {
        self.storage.remove(self.index)
    }
}

impl<'a, T, A: Allocator> From<CursorMut<'a, T, A>> for Cursor<'a, T, A> {
    fn from(cursor: CursorMut<'a, T, A>) -> Self {
        let CursorMut { storage, index } = cursor;
        Cursor::new(storage, index)
    }
}

impl<T, A: Allocator> fmt::Debug for CursorMut<'_, T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorMut")
            .field("index", &self.index)
            .field("len", &self.storage.len())
            .finish()
    }
}

impl<T, A: Allocator> AddAssign<isize> for CursorMut<'_, T, A> {
    fn add_assign(&mut self, n: isize) {
        self.index = self.index.wrapping_add_signed(n);
    }
}

impl<T, A: Allocator> SubAssign<isize> for CursorMut<'_, T, A> {
    fn sub_assign(&mut self, n: isize) {
        self.index = self.index.wrapping_add_signed(n.wrapping_neg());
    }
}

impl<T, A: Allocator> Add<isize> for CursorMut<'_, T, A> {
    type Output = Self;

    fn add(mut self, n: isize) -> Self {
        self += n;
        self
    }
}

impl<T, A: Allocator> Sub<isize> for CursorMut<'_, T, A> {
    type Output = Self;

    fn sub(mut self, n: isize) -> Self {
        self -= n;
        self
    }
}
