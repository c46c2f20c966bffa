//! Saturating counters
//!
//! Repository metrics can exceed what a fixed-width integer holds (a blob
//! larger than 4 GiB, say). Instead of wrapping, counters stick at their
//! maximum value and report the overflow to whoever renders them.

use serde::Serialize;
use std::fmt;

/// A `u32` counter that saturates at `u32::MAX`
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(transparent)]
pub struct Count32(u32);

/// A `u64` counter that saturates at `u64::MAX`
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(transparent)]
pub struct Count64(u64);

impl Count32 {
    pub const MAX: Count32 = Count32(u32::MAX);

    pub fn new(n: u64) -> Self {
        Self(u32::try_from(n).unwrap_or(u32::MAX))
    }

    /// Value and whether it has saturated
    pub fn to_u64(self) -> (u64, bool) {
        (u64::from(self.0), self.0 == u32::MAX)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn plus(self, other: Count32) -> Count32 {
        Count32(self.0.saturating_add(other.0))
    }

    pub fn increment(&mut self, other: Count32) {
        *self = self.plus(other);
    }

    /// Raise to `other` if it is larger; returns true if the value changed
    pub fn adjust_max(&mut self, other: Count32) -> bool {
        if other > *self {
            *self = other;
            true
        } else {
            false
        }
    }
}

impl Count64 {
    pub const MAX: Count64 = Count64(u64::MAX);

    pub fn new(n: u64) -> Self {
        Self(n)
    }

    pub fn to_u64(self) -> (u64, bool) {
        (self.0, self.0 == u64::MAX)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    pub fn plus(self, other: Count64) -> Count64 {
        Count64(self.0.saturating_add(other.0))
    }

    pub fn increment(&mut self, other: Count64) {
        *self = self.plus(other);
    }

    pub fn adjust_max(&mut self, other: Count64) -> bool {
        if other > *self {
            *self = other;
            true
        } else {
            false
        }
    }
}

impl From<Count32> for Count64 {
    fn from(c: Count32) -> Self {
        // A saturated 32-bit count stays saturated when widened.
        if c == Count32::MAX {
            Count64::MAX
        } else {
            Count64(u64::from(c.0))
        }
    }
}

impl From<Count32> for u64 {
    fn from(c: Count32) -> Self {
        u64::from(c.0)
    }
}

impl fmt::Display for Count32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for Count64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
