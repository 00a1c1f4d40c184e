use crate::ring_buffer::{DEFAULT_CAPACITY, MAX_CAPACITY, MIN_CAPACITY};

/// What a buffer does when its counters drift outside the valid window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CorruptionPolicy {
    /// Drop all elements and continue with a fresh buffer of `RECOVERY_CAPACITY`
    #[default]
    Reset,
    /// Surface `RingBufferError::CorruptedState` and leave the state untouched
    Report,
}

/// Construction parameters for a [`RingBuffer`](crate::RingBuffer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RingBufferConfig {
    /// Slot count allocated up front. Clamped to `[MIN_CAPACITY, MAX_CAPACITY]`.
    pub initial_capacity: usize,
    /// Handling of corrupted counter state
    pub corruption_policy: CorruptionPolicy,
}

impl Default for RingBufferConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_CAPACITY,
            corruption_policy: CorruptionPolicy::default(),
        }
    }
}

impl RingBufferConfig {
    /// Default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial slot count
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Set the corruption policy
    pub fn corruption_policy(mut self, policy: CorruptionPolicy) -> Self {
        self.corruption_policy = policy;
        self
    }

    /// Initial capacity after clamping to the supported bounds
    pub fn effective_capacity(&self) -> usize {
        self.initial_capacity.clamp(MIN_CAPACITY, MAX_CAPACITY)
    }
}
