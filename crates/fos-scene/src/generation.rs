//! Scene epochs
//!
//! The tree bumps its epoch on every change that can affect paint order,
//! picking indices or emitted transforms. Collection compares epochs
//! instead of consulting global cache counters.

/// Epoch counter - incremented on every scene mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Epoch(u64);

impl Epoch {
    /// Initial epoch (never mutated)
    pub const INITIAL: Self = Epoch(0);

    #[inline]
    pub const fn new(value: u64) -> Self {
        Epoch(value)
    }

    #[inline]
    pub const fn value(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn next(self) -> Self {
        Epoch(self.0.wrapping_add(1))
    }

    /// Check if this epoch is newer than another
    #[inline]
    pub fn is_newer_than(self, other: Self) -> bool {
        // Handle wraparound
        let diff = self.0.wrapping_sub(other.0);
        diff > 0 && diff < u64::MAX / 2
    }
}

impl Default for Epoch {
    fn default() -> Self {
        Self::INITIAL
    }
}
