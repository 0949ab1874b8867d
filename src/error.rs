use core::alloc::Layout;

use thiserror::Error;

/// Error types for `Deque` operations
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum DequeError {
    /// Index is beyond the current deque length
    #[error("Index out of bounds: index {index} is beyond deque length {length}")]
    IndexOutOfBounds {
        /// Index that was accessed
        index: usize,
        /// Current length of the deque
        length: usize,
    },
    /// Range bounds are reversed or extend past the end of the deque
    #[error("Invalid range: {start}..{end} for deque of length {length}")]
    InvalidRange {
        /// First index of the range
        start: usize,
        /// One past the last index of the range
        end: usize,
        /// Current length of the deque
        length: usize,
    },
    /// Operation requires at least one element
    #[error("Operation on empty deque")]
    EmptyDeque,
    /// The allocator could not provide memory for a block or the block map
    #[error("Allocation failed: {} bytes with alignment {}", .layout.size(), .layout.align())]
    AllocationFailed {
        /// Layout of the failed request
        layout: Layout,
    },
    /// A size computation overflowed `usize`
    #[error("Capacity overflow")]
    CapacityOverflow,
    /// Invalid construction parameter
    #[error("Invalid configuration: {parameter} = {value}")]
    InvalidConfiguration {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value
        value: usize,
    },
}
