use std::collections::TryReserveError;
use std::fmt;

use thiserror::Error;

/// Result alias used by every fallible ring buffer operation.
pub type Result<T> = std::result::Result<T, RingBufferError>;

/// Failure causes for ring buffer operations.
///
/// A failed operation never leaves the buffer partially mutated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RingBufferError {
    /// Read or remove on a buffer with no live elements
    #[error("ring buffer is empty")]
    EmptyBuffer,

    /// Logical counter (or offset) does not name a live element
    #[error("logical counter {counter} is outside the live range [{tail}, {head})")]
    OutOfRange {
        /// Requested logical counter
        counter: u64,
        /// Tail counter at the time of the request
        tail: u64,
        /// Head counter at the time of the request
        head: u64,
    },

    /// Growth target would truncate live data, shrink the buffer, or leave capacity bounds
    #[error("invalid capacity target {target}: must be at least {floor} and within [{min}, {max}]")]
    InvalidTarget {
        /// Requested capacity
        target: usize,
        /// Smallest acceptable target for the current state
        floor: usize,
        /// Lower capacity bound
        min: usize,
        /// Upper capacity bound
        max: usize,
    },

    /// Backing storage could not be allocated
    #[error("failed to allocate storage for {requested} slots")]
    AllocationFailure {
        /// Slot count that was requested
        requested: usize,
        /// Allocator error
        #[source]
        source: TryReserveError,
    },

    /// Counter distance left the valid window
    #[error("counter state corrupted (tail {tail}, head {head})")]
    CorruptedState {
        /// Tail counter observed
        tail: u64,
        /// Head counter observed
        head: u64,
    },
}

/// Rejected insertion. Hands the item back so ownership is never lost.
#[derive(Error)]
#[error("push rejected: {error}")]
pub struct PushError<T> {
    item: T,
    #[source]
    error: RingBufferError,
}

impl<T> PushError<T> {
    pub(crate) fn new(item: T, error: RingBufferError) -> Self {
        Self { item, error }
    }

    /// The cause of the rejection
    pub fn error(&self) -> &RingBufferError {
        &self.error
    }

    /// Recover the item that could not be inserted
    pub fn into_inner(self) -> T {
        self.item
    }

    /// Split into the item and the cause
    pub fn into_parts(self) -> (T, RingBufferError) {
        (self.item, self.error)
    }
}

impl<T> fmt::Debug for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushError")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<T> From<PushError<T>> for RingBufferError {
    fn from(err: PushError<T>) -> Self {
        err.error
    }
}
