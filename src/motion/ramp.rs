//! Speed ramp calculation.
//!
//! Linear acceleration from rest to a cruise speed. Every emitted pulse adds
//! `acceleration` to the current speed until `max_speed` is reached; the
//! interval to the next pulse is `1e6 / current_speed` microseconds.
//!
//! There is no ramp-down: a move ends at cruise speed and the axis stops on
//! the spot. The point where a deceleration would begin is still computed by
//! [`SpeedRamp::decel_step`] so callers can inspect it.

use crate::config::units::StepsPerSec;
use crate::error::{MotionError, Result};

use super::Direction;

/// Runtime state of the speed ramp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeedRamp {
    /// Speed of the last emitted pulse in steps/s.
    current_speed: u32,

    /// Cruise speed in steps/s.
    max_speed: u32,

    /// Speed added per pulse while accelerating.
    acceleration: u32,

    /// Interval before the next pulse in microseconds.
    step_delay_us: u32,
}

impl SpeedRamp {
    /// Create a ramp at rest.
    ///
    /// # Errors
    ///
    /// Returns `MotionError::ZeroSpeed` or `MotionError::ZeroAcceleration`.
    pub fn new(max_speed: u32, acceleration: u32) -> Result<Self> {
        if max_speed == 0 {
            return Err(MotionError::ZeroSpeed.into());
        }
        if acceleration == 0 {
            return Err(MotionError::ZeroAcceleration.into());
        }
        Ok(Self {
            current_speed: 0,
            max_speed,
            acceleration,
            step_delay_us: 0,
        })
    }

    /// Return to rest. The next pulse is due immediately.
    #[inline]
    pub fn reset(&mut self) {
        self.current_speed = 0;
        self.step_delay_us = 0;
    }

    /// Restart acceleration from rest without touching the pending delay.
    #[inline]
    pub fn restart(&mut self) {
        self.current_speed = 0;
    }

    /// Advance the ramp by one pulse.
    ///
    /// Returns the new step delay in microseconds.
    pub fn accelerate(&mut self) -> u32 {
        if self.current_speed != self.max_speed {
            self.current_speed = self
                .current_speed
                .saturating_add(self.acceleration)
                .min(self.max_speed);
            self.step_delay_us = StepsPerSec(self.current_speed)
                .interval_us()
                .unwrap_or(u32::MAX);
        }
        self.step_delay_us
    }

    /// Whether the ramp has reached cruise speed.
    #[inline]
    pub fn is_cruising(&self) -> bool {
        self.current_speed == self.max_speed
    }

    /// Speed of the last emitted pulse in steps/s.
    #[inline]
    pub fn current_speed(&self) -> u32 {
        self.current_speed
    }

    /// Cruise speed in steps/s.
    #[inline]
    pub fn max_speed(&self) -> u32 {
        self.max_speed
    }

    /// Speed added per pulse.
    #[inline]
    pub fn acceleration(&self) -> u32 {
        self.acceleration
    }

    /// Interval before the next pulse in microseconds.
    #[inline]
    pub fn step_delay_us(&self) -> u32 {
        self.step_delay_us
    }

    /// Change the cruise speed.
    ///
    /// A running ramp above the new maximum is pulled down to it.
    pub fn set_max_speed(&mut self, max_speed: u32) -> Result<()> {
        if max_speed == 0 {
            return Err(MotionError::ZeroSpeed.into());
        }
        self.max_speed = max_speed;
        if self.current_speed > max_speed {
            self.current_speed = max_speed;
            self.step_delay_us = StepsPerSec(max_speed).interval_us().unwrap_or(u32::MAX);
        }
        Ok(())
    }

    /// Change the per-pulse speed increment.
    pub fn set_acceleration(&mut self, acceleration: u32) -> Result<()> {
        if acceleration == 0 {
            return Err(MotionError::ZeroAcceleration.into());
        }
        self.acceleration = acceleration;
        Ok(())
    }

    /// Position at which a ramp-down would have to begin to end a move of
    /// `steps` from `position` at rest.
    pub fn decel_step(&self, position: i64, steps: i64) -> i64 {
        let steps_to_decel = (self.max_speed / self.acceleration) as i64;
        let target = position.saturating_add(steps);
        match Direction::from_steps(steps) {
            Direction::Forward => target.saturating_sub(steps_to_decel),
            Direction::Reverse => target.saturating_add(steps_to_decel),
        }
    }
}
