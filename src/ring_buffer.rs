use std::cmp::Ordering as CounterOrdering;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, trace, warn};

use crate::config::{CorruptionPolicy, RingBufferConfig};
use crate::cursor::{Cursor, IntoIter, Iter, IterMut};
use crate::error::{PushError, Result, RingBufferError};

/// Smallest supported capacity, also the floor applied at construction
pub const MIN_CAPACITY: usize = 8;

/// Largest supported capacity. A counter distance above this is treated as corruption.
pub const MAX_CAPACITY: usize = usize::MAX / 2 - 1;

/// Capacity used by [`RingBuffer::new`]
pub const DEFAULT_CAPACITY: usize = 8;

/// Capacity of the fresh buffer installed by a reset
pub const RECOVERY_CAPACITY: usize = 128;

static NEXT_BUFFER_ID: AtomicU64 = AtomicU64::new(1);

/// Order two logical counters, tolerating wraparound of the counter type.
///
/// `a` is greater than `b` when it is ahead of `b` by at most `MAX_CAPACITY`
/// steps; a larger forward distance means `a` wrapped and is actually behind.
pub fn counter_cmp(a: u64, b: u64) -> CounterOrdering {
    let distance = a.wrapping_sub(b);
    if distance == 0 {
        CounterOrdering::Equal
    } else if distance <= MAX_CAPACITY as u64 {
        CounterOrdering::Greater
    } else {
        CounterOrdering::Less
    }
}

/// Physical slot paired with the logical counter that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Position {
    pub(crate) index: usize,
    pub(crate) counter: u64,
}

impl Position {
    const ORIGIN: Position = Position {
        index: 0,
        counter: 0,
    };

    fn advance(&mut self, capacity: usize) {
        self.counter = self.counter.wrapping_add(1);
        self.index = (self.index + 1) % capacity;
    }

    fn retreat(&mut self, capacity: usize) {
        self.counter = self.counter.wrapping_sub(1);
        self.index = (self.index + capacity - 1) % capacity;
    }
}

/// Auto-growing circular buffer.
///
/// Elements are appended at the head and live until removed from either
/// end. When an insertion finds no free slot the storage doubles and the
/// live elements are re-linearized oldest first. Capacity never shrinks
/// except through an explicit [`reset`](RingBuffer::reset).
///
/// Both cursors carry a wrapped slot index and an ever-increasing logical
/// counter; element count and ordering are always derived from the counters.
///
/// References returned by the accessors borrow the buffer, so they cannot
/// outlive the next push, pop, grow, clear or reset. Use a [`Cursor`] to
/// remember a position across mutations.
///
/// Not synchronized; wrap it in a lock to share it across threads.
pub struct RingBuffer<T> {
    id: u64,
    epoch: u64,
    storage: Vec<Option<T>>,
    /// Oldest live element
    tail: Position,
    /// Next slot to write
    head: Position,
    policy: CorruptionPolicy,
}

impl<T> RingBuffer<T> {
    /// Create an empty buffer with the default configuration
    pub fn new() -> Self {
        Self::with_config(RingBufferConfig::default())
    }

    /// Create an empty buffer with `capacity` slots, clamped to
    /// `[MIN_CAPACITY, MAX_CAPACITY]`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_config(RingBufferConfig::new().initial_capacity(capacity))
    }

    /// Create an empty buffer from a configuration.
    ///
    /// Allocation failure here aborts like any `Vec` allocation; use
    /// [`try_with_config`](RingBuffer::try_with_config) to observe it.
    pub fn with_config(config: RingBufferConfig) -> Self {
        let capacity = Self::clamped_capacity(&config);
        let mut storage = Vec::with_capacity(capacity);
        storage.resize_with(capacity, || None);
        Self::from_parts(storage, config.corruption_policy)
    }

    /// Create an empty buffer, reporting allocation failure as an error
    pub fn try_with_config(config: RingBufferConfig) -> Result<Self> {
        let capacity = Self::clamped_capacity(&config);
        let storage = Self::allocate(capacity)?;
        Ok(Self::from_parts(storage, config.corruption_policy))
    }

    fn clamped_capacity(config: &RingBufferConfig) -> usize {
        let capacity = config.effective_capacity();
        if capacity != config.initial_capacity {
            trace!(
                requested = config.initial_capacity,
                capacity,
                "initial capacity clamped"
            );
        }
        capacity
    }

    fn from_parts(storage: Vec<Option<T>>, policy: CorruptionPolicy) -> Self {
        Self {
            id: NEXT_BUFFER_ID.fetch_add(1, Ordering::Relaxed),
            epoch: 0,
            storage,
            tail: Position::ORIGIN,
            head: Position::ORIGIN,
            policy,
        }
    }

    fn allocate(capacity: usize) -> Result<Vec<Option<T>>> {
        let mut storage = Vec::new();
        storage
            .try_reserve_exact(capacity)
            .map_err(|source| RingBufferError::AllocationFailure {
                requested: capacity,
                source,
            })?;
        storage.resize_with(capacity, || None);
        Ok(storage)
    }

    /// Allocated slot count (not the element count)
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Number of live elements.
    ///
    /// Reports 0 when the counters are corrupted. Under
    /// [`CorruptionPolicy::Reset`] the next mutating call then replaces the
    /// storage with an empty buffer of `RECOVERY_CAPACITY`.
    pub fn length(&self) -> usize {
        self.try_length().unwrap_or(0)
    }

    /// Number of live elements, or `CorruptedState` if the counter
    /// distance left the valid window.
    pub fn try_length(&self) -> Result<usize> {
        let span = self.head.counter.wrapping_sub(self.tail.counter);
        if span > MAX_CAPACITY as u64 || span > self.capacity() as u64 {
            return Err(self.corrupted());
        }
        Ok(span as usize)
    }

    /// Free slots before the next insertion triggers growth
    pub fn free(&self) -> usize {
        self.capacity() - self.length()
    }

    /// True when no elements are live
    pub fn is_empty(&self) -> bool {
        self.length() == 0
    }

    /// True when the next push will grow the storage
    pub fn is_full(&self) -> bool {
        self.free() == 0
    }

    /// Logical counter of the oldest live element
    pub fn tail_counter(&self) -> u64 {
        self.tail.counter
    }

    /// Logical counter the next pushed element will receive
    pub fn head_counter(&self) -> u64 {
        self.head.counter
    }

    /// Active corruption policy
    pub fn corruption_policy(&self) -> CorruptionPolicy {
        self.policy
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn epoch(&self) -> u64 {
        self.epoch
    }

    fn corrupted(&self) -> RingBufferError {
        RingBufferError::CorruptedState {
            tail: self.tail.counter,
            head: self.head.counter,
        }
    }

    /// Live length for read-only paths. Under `Reset` a corrupted buffer reads as empty.
    fn live_len(&self) -> Result<usize> {
        match self.try_length() {
            Ok(len) => Ok(len),
            Err(err) => match self.policy {
                CorruptionPolicy::Reset => Ok(0),
                CorruptionPolicy::Report => Err(err),
            },
        }
    }

    /// Live length for mutating paths, repairing the buffer under `Reset`.
    fn checked_len(&mut self) -> Result<usize> {
        match self.try_length() {
            Ok(len) => Ok(len),
            Err(err) => {
                warn!(
                    tail = self.tail.counter,
                    head = self.head.counter,
                    policy = ?self.policy,
                    "ring buffer counters corrupted"
                );
                match self.policy {
                    CorruptionPolicy::Reset => {
                        self.reset()?;
                        Ok(0)
                    }
                    CorruptionPolicy::Report => Err(err),
                }
            }
        }
    }

    /// Physical slot of the element `offset` places after the oldest
    fn physical(&self, offset: usize) -> usize {
        (self.tail.index + offset) % self.capacity()
    }

    fn slot(&self, index: usize) -> Result<&T> {
        self.storage[index].as_ref().ok_or_else(|| self.corrupted())
    }

    fn slot_mut(&mut self, index: usize) -> Result<&mut T> {
        let err = self.corrupted();
        self.storage[index].as_mut().ok_or(err)
    }

    fn out_of_range(&self, counter: u64) -> RingBufferError {
        RingBufferError::OutOfRange {
            counter,
            tail: self.tail.counter,
            head: self.head.counter,
        }
    }

    /// Offset from the oldest element of a live logical counter
    fn offset_of(&self, counter: u64) -> Result<usize> {
        let len = self.live_len()?;
        let offset = counter.wrapping_sub(self.tail.counter);
        if offset < len as u64 {
            Ok(offset as usize)
        } else {
            Err(self.out_of_range(counter))
        }
    }

    fn checked_offset(&self, offset: usize) -> Result<usize> {
        let len = self.live_len()?;
        if offset < len {
            Ok(self.physical(offset))
        } else {
            Err(self.out_of_range(self.tail.counter.wrapping_add(offset as u64)))
        }
    }

    /// Reallocate to `new_capacity` slots, moving live elements to the front
    /// of the new storage in logical order. Counters are unchanged.
    ///
    /// Fails with `InvalidTarget` when the target is below the current
    /// capacity or length, or outside `[MIN_CAPACITY, MAX_CAPACITY]`. The
    /// buffer is untouched on failure.
    pub fn grow(&mut self, new_capacity: usize) -> Result<()> {
        let len = self.checked_len()?;
        let old_capacity = self.capacity();
        let floor = len.max(old_capacity);
        if new_capacity < floor || !(MIN_CAPACITY..=MAX_CAPACITY).contains(&new_capacity) {
            return Err(RingBufferError::InvalidTarget {
                target: new_capacity,
                floor,
                min: MIN_CAPACITY,
                max: MAX_CAPACITY,
            });
        }

        let mut storage = Self::allocate(new_capacity)?;
        for (offset, slot) in storage.iter_mut().take(len).enumerate() {
            let index = self.physical(offset);
            *slot = self.storage[index].take();
        }

        self.storage = storage;
        self.tail.index = 0;
        self.head.index = len % new_capacity;

        debug!(old_capacity, new_capacity, length = len, "ring buffer grew");
        Ok(())
    }

    /// Append `item` as the newest element, doubling capacity first if the
    /// buffer is full. On failure the item is handed back and nothing changes.
    pub fn push(&mut self, item: T) -> std::result::Result<(), PushError<T>> {
        let len = match self.checked_len() {
            Ok(len) => len,
            Err(err) => return Err(PushError::new(item, err)),
        };

        if len == self.capacity() {
            let target = self.capacity().saturating_mul(2);
            if let Err(err) = self.grow(target) {
                return Err(PushError::new(item, err));
            }
        }

        let capacity = self.capacity();
        self.storage[self.head.index] = Some(item);
        self.head.advance(capacity);
        Ok(())
    }

    /// Remove and return the oldest element
    pub fn pop_oldest(&mut self) -> Result<T> {
        if self.checked_len()? == 0 {
            return Err(RingBufferError::EmptyBuffer);
        }
        let capacity = self.capacity();
        let err = self.corrupted();
        let item = self.storage[self.tail.index].take().ok_or(err)?;
        self.tail.advance(capacity);
        Ok(item)
    }

    /// Remove and return the newest element
    pub fn pop_newest(&mut self) -> Result<T> {
        if self.checked_len()? == 0 {
            return Err(RingBufferError::EmptyBuffer);
        }
        let capacity = self.capacity();
        let mut head = self.head;
        head.retreat(capacity);
        let err = self.corrupted();
        let item = self.storage[head.index].take().ok_or(err)?;
        self.head = head;
        Ok(item)
    }

    /// The longest-resident live element
    pub fn oldest(&self) -> Result<&T> {
        if self.live_len()? == 0 {
            return Err(RingBufferError::EmptyBuffer);
        }
        self.slot(self.tail.index)
    }

    /// Mutable access to the oldest element
    pub fn oldest_mut(&mut self) -> Result<&mut T> {
        if self.live_len()? == 0 {
            return Err(RingBufferError::EmptyBuffer);
        }
        self.slot_mut(self.tail.index)
    }

    /// The most recently pushed live element
    pub fn newest(&self) -> Result<&T> {
        if self.live_len()? == 0 {
            return Err(RingBufferError::EmptyBuffer);
        }
        let capacity = self.capacity();
        self.slot((self.head.index + capacity - 1) % capacity)
    }

    /// Mutable access to the newest element
    pub fn newest_mut(&mut self) -> Result<&mut T> {
        if self.live_len()? == 0 {
            return Err(RingBufferError::EmptyBuffer);
        }
        let capacity = self.capacity();
        self.slot_mut((self.head.index + capacity - 1) % capacity)
    }

    /// Element at an absolute logical counter in `[tail_counter, head_counter)`.
    ///
    /// Membership is decided on counters alone, so it holds whether or not
    /// the live region wraps around the end of the storage.
    pub fn at(&self, counter: u64) -> Result<&T> {
        let offset = self.offset_of(counter)?;
        self.slot(self.physical(offset))
    }

    /// Mutable access by logical counter
    pub fn at_mut(&mut self, counter: u64) -> Result<&mut T> {
        let offset = self.offset_of(counter)?;
        let index = self.physical(offset);
        self.slot_mut(index)
    }

    /// Element `offset` places after the oldest (`0` is the oldest)
    pub fn at_offset(&self, offset: usize) -> Result<&T> {
        let index = self.checked_offset(offset)?;
        self.slot(index)
    }

    /// Mutable access by offset from the oldest
    pub fn at_offset_mut(&mut self, offset: usize) -> Result<&mut T> {
        let index = self.checked_offset(offset)?;
        self.slot_mut(index)
    }

    /// Drop every element. Capacity is kept and the tail catches up to the
    /// head, so earlier counters stay dead. Also repairs corrupted counters.
    pub fn clear(&mut self) {
        match self.try_length() {
            Ok(len) => {
                for offset in 0..len {
                    let index = self.physical(offset);
                    self.storage[index] = None;
                }
            }
            // live range unknown, sweep every slot
            Err(_) => self.storage.iter_mut().for_each(|slot| *slot = None),
        }
        self.tail = self.head;
    }

    /// Replace the storage with an empty buffer of `RECOVERY_CAPACITY` and
    /// restart both counters at zero. Cursors taken before the reset go dead.
    pub fn reset(&mut self) -> Result<()> {
        let storage = Self::allocate(RECOVERY_CAPACITY)?;
        debug!(
            old_capacity = self.capacity(),
            dropped = self.length(),
            "ring buffer reset"
        );
        self.storage = storage;
        self.tail = Position::ORIGIN;
        self.head = Position::ORIGIN;
        self.epoch = self.epoch.wrapping_add(1);
        Ok(())
    }

    /// Borrowing iterator, oldest to newest
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    /// Mutable iterator, oldest to newest
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        let len = self.length();
        let start = self.tail.index;
        let first = len.min(self.capacity() - start);
        let (wrapped, unwrapped) = self.storage.split_at_mut(start);
        IterMut::new(&mut unwrapped[..first], &mut wrapped[..len - first])
    }

    /// Cursor at the oldest element
    pub fn cursor(&self) -> Cursor {
        self.cursor_at(self.tail.counter)
    }

    /// Cursor at an arbitrary logical counter. It is live only while the
    /// counter lies in `[tail_counter, head_counter)`.
    pub fn cursor_at(&self, counter: u64) -> Cursor {
        Cursor::new(self.id, self.epoch, counter)
    }

    /// Append every item, stopping at the first rejection.
    ///
    /// Returns the number of items inserted.
    pub fn try_extend<I>(&mut self, iter: I) -> std::result::Result<usize, PushError<T>>
    where
        I: IntoIterator<Item = T>,
    {
        let mut pushed = 0;
        for item in iter {
            self.push(item)?;
            pushed += 1;
        }
        Ok(pushed)
    }
}

impl<T> Default for RingBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for RingBuffer<T> {
    fn clone(&self) -> Self {
        Self {
            id: NEXT_BUFFER_ID.fetch_add(1, Ordering::Relaxed),
            epoch: 0,
            storage: self.storage.clone(),
            tail: self.tail,
            head: self.head,
            policy: self.policy,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for RingBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity())
            .field("tail", &self.tail)
            .field("head", &self.head)
            .field("items", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

impl<T> Extend<T> for RingBuffer<T> {
    /// # Panics
    /// Panics if growth fails, as `Vec` does on capacity overflow. Use
    /// [`RingBuffer::try_extend`] to get the failure as a [`PushError`].
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        if let Err(err) = self.try_extend(iter) {
            panic!("ring buffer extend failed: {}", err.error());
        }
    }
}

impl<T> FromIterator<T> for RingBuffer<T> {
    /// Collect into a default-configured buffer.
    ///
    /// # Panics
    /// Panics if growth fails. Build with [`RingBuffer::new`] and call
    /// [`RingBuffer::try_extend`] to get the failure as a [`PushError`].
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut buffer = Self::new();
        buffer.extend(iter);
        buffer
    }
}

impl<'a, T> IntoIterator for &'a RingBuffer<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut RingBuffer<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T> IntoIterator for RingBuffer<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}
