//! Iterators and detached positions over a [`RingBuffer`].

use std::iter::{Chain, FusedIterator};
use std::slice;

use crate::error::{Result, RingBufferError};
use crate::ring_buffer::RingBuffer;

/// Borrowing iterator from oldest to newest.
///
/// Walks logical counters and resolves each one against the buffer's
/// current live range, so a position that is no longer live ends the
/// iteration instead of yielding a stale slot.
pub struct Iter<'a, T> {
    buffer: &'a RingBuffer<T>,
    front: u64,
    back: u64,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(buffer: &'a RingBuffer<T>) -> Self {
        let front = buffer.tail_counter();
        Self {
            buffer,
            front,
            back: front.wrapping_add(buffer.length() as u64),
        }
    }

    fn remaining(&self) -> usize {
        self.back.wrapping_sub(self.front) as usize
    }

    fn finish(&mut self) -> Option<&'a T> {
        self.front = self.back;
        None
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        // re-checked against the live range on every step; a dead
        // position fuses the iterator
        match self.buffer.at(self.front) {
            Ok(item) => {
                self.front = self.front.wrapping_add(1);
                Some(item)
            }
            Err(_) => self.finish(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        let counter = self.back.wrapping_sub(1);
        match self.buffer.at(counter) {
            Ok(item) => {
                self.back = counter;
                Some(item)
            }
            Err(_) => self.finish(),
        }
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            buffer: self.buffer,
            front: self.front,
            back: self.back,
        }
    }
}

type SlotIter<'a, T> = Chain<slice::IterMut<'a, Option<T>>, slice::IterMut<'a, Option<T>>>;

/// Mutable iterator from oldest to newest
pub struct IterMut<'a, T> {
    slots: SlotIter<'a, T>,
}

impl<'a, T> IterMut<'a, T> {
    /// `unwrapped` runs from the tail slot to the end of storage, `wrapped`
    /// continues from slot 0.
    pub(crate) fn new(unwrapped: &'a mut [Option<T>], wrapped: &'a mut [Option<T>]) -> Self {
        Self {
            slots: unwrapped.iter_mut().chain(wrapped.iter_mut()),
        }
    }
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        self.slots.next().and_then(Option::as_mut)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.slots.size_hint()
    }
}

impl<T> DoubleEndedIterator for IterMut<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.slots.next_back().and_then(Option::as_mut)
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}

/// Owning iterator that drains the buffer oldest first
pub struct IntoIter<T> {
    buffer: RingBuffer<T>,
}

impl<T> IntoIter<T> {
    pub(crate) fn new(buffer: RingBuffer<T>) -> Self {
        Self { buffer }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.buffer.pop_oldest().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.buffer.length();
        (len, Some(len))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.buffer.pop_newest().ok()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

/// A remembered position in a specific buffer.
///
/// Unlike [`Iter`] a cursor does not borrow the buffer, so the buffer can
/// be pushed to and popped from while the cursor is held. Every access
/// re-checks the position against the buffer's live range; once the
/// element has been popped, the buffer reset, or the cursor is used with
/// a different buffer, access reports `OutOfRange`.
///
/// Two cursors are equal when they point at the same logical position of
/// the same buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cursor {
    buffer_id: u64,
    epoch: u64,
    counter: u64,
}

impl Cursor {
    pub(crate) fn new(buffer_id: u64, epoch: u64, counter: u64) -> Self {
        Self {
            buffer_id,
            epoch,
            counter,
        }
    }

    /// Logical counter this cursor points at
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Step to the next newer position
    pub fn advance(&mut self) {
        self.counter = self.counter.wrapping_add(1);
    }

    /// Step to the next older position
    pub fn retreat(&mut self) {
        self.counter = self.counter.wrapping_sub(1);
    }

    /// True if the cursor was taken from `buffer` and its element is still live
    pub fn is_live<T>(&self, buffer: &RingBuffer<T>) -> bool {
        self.get(buffer).is_ok()
    }

    /// Resolve the cursor against `buffer`
    pub fn get<'a, T>(&self, buffer: &'a RingBuffer<T>) -> Result<&'a T> {
        self.check_binding(buffer)?;
        buffer.at(self.counter)
    }

    /// Resolve the cursor mutably against `buffer`
    pub fn get_mut<'a, T>(&self, buffer: &'a mut RingBuffer<T>) -> Result<&'a mut T> {
        self.check_binding(buffer)?;
        buffer.at_mut(self.counter)
    }

    fn check_binding<T>(&self, buffer: &RingBuffer<T>) -> Result<()> {
        if self.buffer_id != buffer.id() || self.epoch != buffer.epoch() {
            return Err(RingBufferError::OutOfRange {
                counter: self.counter,
                tail: buffer.tail_counter(),
                head: buffer.head_counter(),
            });
        }
        Ok(())
    }
}
