//! `Deque`: a double-ended queue over segmented, block-indexed storage.
//!
//! Elements are stored in fixed-size blocks of [`BLOCK_SIZE`] slots. A block map
//! (a vector of block pointers) addresses the blocks, and the occupied range is
//! kept near the center of the map so that both ends can grow. Existing
//! elements never move when either end grows; only the map is rebuilt.
//!
//! Storage layout: [map slot 0][map slot 1]...[map slot N-1]
//! Each slot is empty or owns one block of `BLOCK_SIZE` element slots.
//! Logical index `i` lives at block `start.block + (start.offset + i) / BLOCK_SIZE`,
//! offset `(start.offset + i) % BLOCK_SIZE`.
//!
//! # Performance Characteristics
//!
//! ## Time Complexity
//! - `push_back()`, `push_front()`: amortized O(1), existing elements never move
//! - `pop_back()`, `pop_front()`: O(1), blocks are kept for reuse
//! - `get()`, `at()`, indexing: O(1) - two divisions and a map lookup
//! - `insert()`, `erase()`: O(min(i, len - i)) - the shorter side is shifted
//! - `clear()`: O(n) - drops elements, then resets the map
//! - `swap()`: O(1)
//!
//! ## Space Complexity
//! - At most `len / BLOCK_SIZE + 2` blocks in use, plus spare blocks left by pops
//! - The map doubles when an end runs out of slots and never shrinks except on `clear()`
//!
//! # Error Handling
//!
//! Fallible operations return [`DequeError`]:
//!
//! ```
//! # use segdeque::{Deque, DequeError};
//! let mut deque: Deque<i32> = Deque::new();
//!
//! assert_eq!(deque.pop_back(), Err(DequeError::EmptyDeque));
//! assert!(deque.front().is_err());
//!
//! deque.push_back(1).unwrap();
//! assert_eq!(
//!     deque.at(5),
//!     Err(DequeError::IndexOutOfBounds { index: 5, length: 1 })
//! );
//! ```
//!
//! Trait-based conveniences (`Extend`, `FromIterator`, `Clone`) cannot return
//! errors and abort through `handle_alloc_error` when the allocator fails.
//!
//! # Double-Ended Interface
//!
//! ```
//! # use segdeque::Deque;
//! let mut deque = Deque::new();
//!
//! deque.push_back(2).unwrap();
//! deque.push_back(3).unwrap();
//! deque.push_front(1).unwrap();
//!
//! assert_eq!(deque.front(), Ok(&1));
//! assert_eq!(deque.back(), Ok(&3));
//! assert_eq!(deque[1], 2);
//!
//! assert_eq!(deque.pop_front(), Ok(1));
//! assert_eq!(deque.pop_back(), Ok(3));
//! assert_eq!(deque.len(), 1);
//! ```
//!
//! # Positional Operations
//!
//! ```
//! # use segdeque::Deque;
//! let mut deque: Deque<i32> = (0..10).collect();
//!
//! assert_eq!(deque.insert(5, 100), Ok(5));
//! assert_eq!(deque[5], 100);
//! assert_eq!(deque.erase(5), Ok(5));
//! assert_eq!(deque.erase_range(2..4), Ok(2));
//!
//! let remaining: Vec<_> = deque.iter().copied().collect();
//! assert_eq!(remaining, vec![0, 1, 4, 5, 6, 7, 8, 9]);
//! ```
//!
//! # Cursors
//!
//! A [`Cursor`] is a random-access position: a borrowed deque plus a logical
//! index. The borrow rules out mutating the deque while a cursor is alive, so a
//! position that must survive a mutation is kept as an index and turned back
//! into a cursor with [`Deque::cursor_at`].
//!
//! ```
//! # use segdeque::Deque;
//! let deque: Deque<i32> = (0..200).collect();
//!
//! let mut cursor = deque.begin();
//! cursor += 150;
//! assert_eq!(cursor.get(), Some(&150));
//! assert_eq!(cursor.at(-50), Some(&100));
//! assert_eq!(deque.end() - cursor, 50);
//! assert!(deque.begin() < cursor);
//! ```
//!
//! # Allocators
//!
//! Block memory comes from an [`allocator_api2`] allocator, `Global` by default:
//!
//! ```
//! # use segdeque::Deque;
//! use segdeque::allocator_api2::alloc::Global;
//!
//! let mut deque: Deque<u64> = Deque::new_in(Global);
//! deque.extend(0..1000);
//! assert!(deque.allocated_blocks() <= 1000 / segdeque::BLOCK_SIZE + 2);
//! ```
//!
//! # Logging
//!
//! Map growth and reset are reported with `tracing` at debug level, block
//! allocation and release at trace level, and allocator failures at warn level.

mod block_map;
mod cursor;
mod deque;
mod error;
mod iter;
mod memory;
mod storage;

// Re-export public types and traits
pub use allocator_api2;
pub use block_map::INITIAL_MAP_CAPACITY;
pub use cursor::{Cursor, CursorMut};
pub use deque::Deque;
pub use error::DequeError;
pub use iter::{IntoIter, Iter, IterMut};
pub use memory::BLOCK_SIZE;
