//! # growring - auto-growing ring buffer
//!
//! A generic circular buffer for queueing sequential items (packets, log
//! records, samples) where insertion order matters and the memory footprint
//! should stay bounded until more room is genuinely needed.
//!
//! ## Design
//!
//! - Contiguous backing store, 8 slots by default
//! - Two counter-tagged cursors: `tail` (oldest live element) and `head`
//!   (next free slot), each holding a wrapped index and a logical counter
//! - Length and ordering come from counter subtraction, so "empty" and
//!   "full" never look alike and ordering survives counter wraparound
//! - Insertion into a full buffer doubles capacity and re-linearizes the
//!   live elements; capacity never shrinks except on explicit reset
//! - O(1) push, pop at either end, and lookup by logical counter or offset
//! - Single-threaded; no internal locking
//!
//! ## Example
//!
//! ```
//! use growring::{RingBuffer, RingBufferError};
//!
//! let mut rb = RingBuffer::new();
//! for seq in 0..19u32 {
//!     rb.push(seq).unwrap();
//! }
//! assert_eq!(rb.capacity(), 32);
//! assert_eq!(rb.length(), 19);
//!
//! // Consume the oldest five
//! for expected in 0..5 {
//!     assert_eq!(rb.pop_oldest(), Ok(expected));
//! }
//! assert_eq!(rb.oldest(), Ok(&5));
//!
//! // Logical counters keep naming the same element across growth
//! let tail = rb.tail_counter();
//! assert_eq!(rb.at(tail), Ok(&5));
//! assert!(matches!(rb.at(tail - 1), Err(RingBufferError::OutOfRange { .. })));
//! ```

#![warn(missing_docs)]

mod config;
mod cursor;
mod error;
mod ring_buffer;

pub use config::{CorruptionPolicy, RingBufferConfig};
pub use cursor::{Cursor, IntoIter, Iter, IterMut};
pub use error::{PushError, Result, RingBufferError};
pub use ring_buffer::{
    counter_cmp, RingBuffer, DEFAULT_CAPACITY, MAX_CAPACITY, MIN_CAPACITY, RECOVERY_CAPACITY,
};
