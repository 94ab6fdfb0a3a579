//! Hardware capabilities consumed by the controller.
//!
//! Pins and delays come straight from `embedded-hal` 1.0. The only capability
//! `embedded-hal` lacks is a monotonic microsecond clock, defined here.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

/// Something which reports monotonically non-decreasing time in microseconds.
///
/// The reference point is clock specific (boot, epoch, ...). The same clock
/// must be used for the lifetime of a controller.
pub trait Clock {
    /// Microseconds elapsed since the clock's reference point.
    fn now_us(&self) -> u64;
}

impl<F> Clock for F
where
    F: Fn() -> u64,
{
    fn now_us(&self) -> u64 {
        self()
    }
}

/// Monotonic clock backed by the operating system.
#[cfg(feature = "std")]
#[derive(Debug, Clone, PartialEq)]
pub struct StdClock {
    created_at: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    /// Create a clock whose zero is now.
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self {
            created_at: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Clock for StdClock {
    fn now_us(&self) -> u64 {
        self.created_at.elapsed().as_micros() as u64
    }
}

/// Placeholder for a pin, delay or clock that is not wired.
///
/// Used as the type of optional pins the board does not provide (no enable
/// line, no end switch, ...). The controller never touches an `Unconnected`
/// slot; the trait impls exist only to satisfy the bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unconnected;

impl ErrorType for Unconnected {
    type Error = Infallible;
}

impl OutputPin for Unconnected {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl InputPin for Unconnected {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(false)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

impl DelayNs for Unconnected {
    fn delay_ns(&mut self, _ns: u32) {}
}

impl Clock for Unconnected {
    fn now_us(&self) -> u64 {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    #[test]
    fn test_closure_clock() {
        let t = Cell::new(10u64);
        let clock = || t.get();
        assert_eq!(clock.now_us(), 10);
        t.set(250);
        assert_eq!(clock.now_us(), 250);
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_std_clock_is_monotonic() {
        let clock = StdClock::new();
        let a = clock.now_us();
        let b = clock.now_us();
        assert!(b >= a);
    }
}
