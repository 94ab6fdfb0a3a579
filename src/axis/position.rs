//! Position tracking for a stepper axis.
//!
//! Counts emitted pulses. Stepper motors are open loop, so this is the number
//! of steps commanded since the last zero, not a measured position.

use crate::motion::Direction;

/// Axis position tracker.
///
/// Keeps the absolute position plus per-command counters that are cleared
/// whenever a new command starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    /// Steps from the last established zero.
    absolute: i64,
    /// Signed steps since the current command started.
    relative: i64,
    /// Pulses emitted since the current command started.
    steps_taken: u32,
}

impl Position {
    /// Create a tracker at zero.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tracker at a specific position.
    #[inline]
    pub fn at(steps: i64) -> Self {
        Self {
            absolute: steps,
            ..Self::default()
        }
    }

    /// Steps from the last established zero.
    #[inline]
    pub fn absolute(&self) -> i64 {
        self.absolute
    }

    /// Signed steps since the current command started.
    #[inline]
    pub fn relative(&self) -> i64 {
        self.relative
    }

    /// Pulses emitted since the current command started.
    #[inline]
    pub fn steps_taken(&self) -> u32 {
        self.steps_taken
    }

    /// Position one step further in `direction`.
    #[inline]
    pub fn next(&self, direction: Direction) -> i64 {
        self.absolute.saturating_add(direction.sign())
    }

    /// Record one emitted pulse.
    #[inline]
    pub fn advance(&mut self, direction: Direction) {
        self.absolute = self.absolute.saturating_add(direction.sign());
        self.relative = self.relative.saturating_add(direction.sign());
        self.steps_taken = self.steps_taken.wrapping_add(1);
    }

    /// Clear the per-command counters.
    #[inline]
    pub fn begin_command(&mut self) {
        self.relative = 0;
        self.steps_taken = 0;
    }

    /// Make the current location the zero reference.
    #[inline]
    pub fn zero(&mut self) {
        self.absolute = 0;
    }

    /// Overwrite the absolute position.
    #[inline]
    pub fn set(&mut self, steps: i64) {
        self.absolute = steps;
    }

    /// Steps needed to reach `target` from here, saturating at the `i64`
    /// range.
    #[inline]
    pub fn steps_to(&self, target: i64) -> i64 {
        target.saturating_sub(self.absolute)
    }
}
