//! Unit types for axis quantities.
//!
//! Keeps step counts, speeds and durations apart in configuration so a speed
//! cannot be handed to a field expecting a distance.

use core::ops::{Add, Neg, Sub};

use serde::Deserialize;

/// Axis position or distance in steps.
///
/// Uses i64 for unlimited range in either direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize)]
#[serde(transparent)]
pub struct Steps(pub i64);

impl Steps {
    /// Create a new Steps value.
    #[inline]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Get absolute value as u64.
    #[inline]
    pub fn abs(self) -> u64 {
        self.0.unsigned_abs()
    }
}

impl Add for Steps {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Steps {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Neg for Steps {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

/// Step rate in steps per second.
///
/// Also used for the ramp increment, which is the speed added on every
/// emitted pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize)]
#[serde(transparent)]
pub struct StepsPerSec(pub u32);

impl StepsPerSec {
    /// Create a new StepsPerSec value.
    #[inline]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Interval between pulses at this rate, rounded to the nearest
    /// microsecond. `None` at zero speed.
    #[inline]
    pub fn interval_us(self) -> Option<u32> {
        if self.0 == 0 {
            None
        } else {
            Some(libm::round(1_000_000.0 / self.0 as f64) as u32)
        }
    }
}

/// Extension trait for creating unit types from primitives.
pub trait UnitExt {
    /// Convert to Steps.
    fn steps(self) -> Steps;
}

impl UnitExt for i64 {
    #[inline]
    fn steps(self) -> Steps {
        Steps(self)
    }
}

/// Extension trait for creating speed units from primitives.
pub trait SpeedExt {
    /// Convert to StepsPerSec.
    fn steps_per_sec(self) -> StepsPerSec;
}

impl SpeedExt for u32 {
    #[inline]
    fn steps_per_sec(self) -> StepsPerSec {
        StepsPerSec(self)
    }
}
