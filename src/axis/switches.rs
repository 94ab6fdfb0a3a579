//! Limit switch sampling and edge detection.

use embedded_hal::digital::InputPin;

use crate::config::TriggerLevel;
use crate::error::{MotorError, Result};

/// Which limit switch is pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LimitHit {
    /// The home (reverse end) switch.
    Home,
    /// The far (forward end) switch.
    End,
}

/// Result of one switch reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    /// Switch is pressed now.
    pub active: bool,
    /// Switch was released on the previous reading and is pressed now.
    pub rising: bool,
}

impl Sample {
    /// A released switch.
    pub const RELEASED: Sample = Sample {
        active: false,
        rising: false,
    };
}

/// A limit switch input with latched edge state.
///
/// The latch stays set while the switch is held, so the press is reported
/// once; a released reading re-arms it. There is no time-based debounce.
///
/// A switch without a pin reads as pressed: with nothing wired the axis
/// assumes it is sitting on the limit.
#[derive(Debug)]
pub struct LimitSwitch<P> {
    pin: Option<P>,
    trigger: TriggerLevel,
    latched: bool,
}

impl<P: InputPin> LimitSwitch<P> {
    /// Create a switch reader.
    pub fn new(pin: Option<P>, trigger: TriggerLevel) -> Self {
        Self {
            pin,
            trigger,
            latched: false,
        }
    }

    /// Whether a pin is wired.
    #[inline]
    pub fn is_connected(&self) -> bool {
        self.pin.is_some()
    }

    /// Latched state: pressed on the last reading.
    #[inline]
    pub fn is_latched(&self) -> bool {
        self.latched
    }

    /// Level at which the switch counts as pressed.
    #[inline]
    pub fn trigger_level(&self) -> TriggerLevel {
        self.trigger
    }

    /// Change the level at which the switch counts as pressed.
    #[inline]
    pub fn set_trigger_level(&mut self, trigger: TriggerLevel) {
        self.trigger = trigger;
    }

    /// Read the switch and update the latch.
    pub fn sample(&mut self) -> Result<Sample> {
        let active = match self.pin.as_mut() {
            Some(pin) => {
                let high = pin.is_high().map_err(|_| MotorError::SwitchReadError)?;
                self.trigger.is_triggered(high)
            }
            None => true,
        };

        let rising = active && !self.latched;
        self.latched = active;

        Ok(Sample { active, rising })
    }

    /// Release the pin.
    pub fn release(self) -> Option<P> {
        self.pin
    }
}
