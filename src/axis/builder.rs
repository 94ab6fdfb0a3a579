//! Builder pattern for AxisController.
//!
//! Pin setters change the builder's type, so optional hardware the board
//! lacks stays [`Unconnected`] without the caller naming it.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::config::{validate_axis, AxisConfig, StepLimits, SystemConfig, TriggerLevel};
use crate::error::{ConfigError, Error, Result};
use crate::events::AxisEventSink;
use crate::hal::{Clock, Unconnected};
use crate::motion::SpeedRamp;

use super::controller::{AxisController, AxisParts};

/// Builder for creating AxisController instances.
pub struct AxisControllerBuilder<STEP, DIR, DELAY, CLK, EN, HOME, END, EV> {
    step_pin: Option<STEP>,
    dir_pin: Option<DIR>,
    delay: Option<DELAY>,
    clock: Option<CLK>,
    enable_pin: Option<EN>,
    home_switch: Option<HOME>,
    end_switch: Option<END>,
    events: EV,
    config: AxisConfig,
}

/// Builder with nothing wired yet.
pub type EmptyBuilder = AxisControllerBuilder<
    Unconnected,
    Unconnected,
    Unconnected,
    Unconnected,
    Unconnected,
    Unconnected,
    Unconnected,
    (),
>;

impl Default for EmptyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EmptyBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            step_pin: None,
            dir_pin: None,
            delay: None,
            clock: None,
            enable_pin: None,
            home_switch: None,
            end_switch: None,
            events: (),
            config: AxisConfig::new("axis"),
        }
    }
}

impl AxisController<Unconnected, Unconnected, Unconnected, Unconnected> {
    /// Start building an axis controller.
    pub fn builder() -> EmptyBuilder {
        EmptyBuilder::new()
    }
}

impl<STEP, DIR, DELAY, CLK, EN, HOME, END, EV>
    AxisControllerBuilder<STEP, DIR, DELAY, CLK, EN, HOME, END, EV>
{
    /// Set the STEP pin.
    pub fn step_pin<P: OutputPin>(
        self,
        pin: P,
    ) -> AxisControllerBuilder<P, DIR, DELAY, CLK, EN, HOME, END, EV> {
        AxisControllerBuilder {
            step_pin: Some(pin),
            dir_pin: self.dir_pin,
            delay: self.delay,
            clock: self.clock,
            enable_pin: self.enable_pin,
            home_switch: self.home_switch,
            end_switch: self.end_switch,
            events: self.events,
            config: self.config,
        }
    }

    /// Set the DIR pin.
    pub fn dir_pin<P: OutputPin>(
        self,
        pin: P,
    ) -> AxisControllerBuilder<STEP, P, DELAY, CLK, EN, HOME, END, EV> {
        AxisControllerBuilder {
            step_pin: self.step_pin,
            dir_pin: Some(pin),
            delay: self.delay,
            clock: self.clock,
            enable_pin: self.enable_pin,
            home_switch: self.home_switch,
            end_switch: self.end_switch,
            events: self.events,
            config: self.config,
        }
    }

    /// Set the delay provider used for the pulse width and settle time.
    pub fn delay<D: DelayNs>(
        self,
        delay: D,
    ) -> AxisControllerBuilder<STEP, DIR, D, CLK, EN, HOME, END, EV> {
        AxisControllerBuilder {
            step_pin: self.step_pin,
            dir_pin: self.dir_pin,
            delay: Some(delay),
            clock: self.clock,
            enable_pin: self.enable_pin,
            home_switch: self.home_switch,
            end_switch: self.end_switch,
            events: self.events,
            config: self.config,
        }
    }

    /// Set the microsecond clock.
    pub fn clock<C: Clock>(
        self,
        clock: C,
    ) -> AxisControllerBuilder<STEP, DIR, DELAY, C, EN, HOME, END, EV> {
        AxisControllerBuilder {
            step_pin: self.step_pin,
            dir_pin: self.dir_pin,
            delay: self.delay,
            clock: Some(clock),
            enable_pin: self.enable_pin,
            home_switch: self.home_switch,
            end_switch: self.end_switch,
            events: self.events,
            config: self.config,
        }
    }

    /// Set the driver enable pin.
    pub fn enable_pin<P: OutputPin>(
        self,
        pin: P,
    ) -> AxisControllerBuilder<STEP, DIR, DELAY, CLK, P, HOME, END, EV> {
        AxisControllerBuilder {
            step_pin: self.step_pin,
            dir_pin: self.dir_pin,
            delay: self.delay,
            clock: self.clock,
            enable_pin: Some(pin),
            home_switch: self.home_switch,
            end_switch: self.end_switch,
            events: self.events,
            config: self.config,
        }
    }

    /// Set the home limit switch input.
    pub fn home_switch<P: InputPin>(
        self,
        pin: P,
    ) -> AxisControllerBuilder<STEP, DIR, DELAY, CLK, EN, P, END, EV> {
        AxisControllerBuilder {
            step_pin: self.step_pin,
            dir_pin: self.dir_pin,
            delay: self.delay,
            clock: self.clock,
            enable_pin: self.enable_pin,
            home_switch: Some(pin),
            end_switch: self.end_switch,
            events: self.events,
            config: self.config,
        }
    }

    /// Set the end limit switch input.
    pub fn end_switch<P: InputPin>(
        self,
        pin: P,
    ) -> AxisControllerBuilder<STEP, DIR, DELAY, CLK, EN, HOME, P, EV> {
        AxisControllerBuilder {
            step_pin: self.step_pin,
            dir_pin: self.dir_pin,
            delay: self.delay,
            clock: self.clock,
            enable_pin: self.enable_pin,
            home_switch: self.home_switch,
            end_switch: Some(pin),
            events: self.events,
            config: self.config,
        }
    }

    /// Set the event sink.
    pub fn events<S: AxisEventSink>(
        self,
        events: S,
    ) -> AxisControllerBuilder<STEP, DIR, DELAY, CLK, EN, HOME, END, S> {
        AxisControllerBuilder {
            step_pin: self.step_pin,
            dir_pin: self.dir_pin,
            delay: self.delay,
            clock: self.clock,
            enable_pin: self.enable_pin,
            home_switch: self.home_switch,
            end_switch: self.end_switch,
            events,
            config: self.config,
        }
    }

    /// Set the axis name.
    pub fn name(mut self, name: &str) -> Self {
        self.config.name = heapless::String::try_from(name).unwrap_or_default();
        self
    }

    /// Set the identifier passed to event sinks.
    pub fn id(mut self, id: u8) -> Self {
        self.config.id = id;
        self
    }

    /// Set the cruise speed in steps/s.
    pub fn max_speed(mut self, speed: u32) -> Self {
        self.config.max_speed.0 = speed;
        self
    }

    /// Set the speed added per pulse.
    pub fn acceleration(mut self, acceleration: u32) -> Self {
        self.config.acceleration.0 = acceleration;
        self
    }

    /// Set travel limits.
    pub fn limits(mut self, limits: StepLimits) -> Self {
        self.config.limits = limits;
        self.config.rotary = false;
        self
    }

    /// Make the axis rotary: no limits, no switch checks.
    pub fn rotary(mut self) -> Self {
        self.config.rotary = true;
        self
    }

    /// Set the auto-homing backoff distance.
    pub fn backoff_steps(mut self, steps: i64) -> Self {
        self.config.backoff_steps.0 = steps;
        self
    }

    /// Choose whether a limit switch stop also cuts driver power.
    pub fn disable_on_limit(mut self, disable: bool) -> Self {
        self.config.disable_on_limit = disable;
        self
    }

    /// Set the level at which limit switches count as pressed.
    pub fn trigger_level(mut self, level: TriggerLevel) -> Self {
        self.config.trigger_level = level;
        self
    }

    /// Set direction inversion.
    pub fn invert_direction(mut self, invert: bool) -> Self {
        self.config.invert_direction = invert;
        self
    }

    /// Set enable pin polarity (default active-low).
    pub fn enable_active_high(mut self, active_high: bool) -> Self {
        self.config.enable_active_high = active_high;
        self
    }

    /// Set the step pulse width in microseconds.
    pub fn pulse_width_us(mut self, width: u32) -> Self {
        self.config.pulse_width_us = width;
        self
    }

    /// Set the wait after re-enabling the driver.
    pub fn settle_delay_ms(mut self, delay: u32) -> Self {
        self.config.settle_delay_ms = delay;
        self
    }

    /// Set normal and fine jog distances.
    pub fn jog_steps(mut self, normal: i64, small: i64) -> Self {
        self.config.jog_steps.0 = normal;
        self.config.jog_steps_small.0 = small;
        self
    }

    /// Set the resting position used by `move_to_default`.
    pub fn default_position(mut self, steps: i64) -> Self {
        self.config.default_position.0 = steps;
        self
    }

    /// Configure from an AxisConfig.
    pub fn from_axis_config(mut self, config: &AxisConfig) -> Self {
        self.config = config.clone();
        self
    }

    /// Configure from SystemConfig by axis name.
    pub fn from_config(self, config: &SystemConfig, axis_name: &str) -> Result<Self> {
        let axis_config = config.axis(axis_name).ok_or_else(|| {
            Error::Config(ConfigError::AxisNotFound(
                heapless::String::try_from(axis_name).unwrap_or_default(),
            ))
        })?;

        Ok(self.from_axis_config(axis_config))
    }

    /// Build the AxisController.
    ///
    /// # Errors
    ///
    /// Returns an error if a required pin, the delay or the clock is
    /// missing, or if the settings do not validate.
    pub fn build(self) -> Result<AxisController<STEP, DIR, DELAY, CLK, EN, HOME, END, EV>>
    where
        STEP: OutputPin,
        DIR: OutputPin,
        DELAY: DelayNs,
        CLK: Clock,
        EN: OutputPin,
        HOME: InputPin,
        END: InputPin,
        EV: AxisEventSink,
    {
        let step_pin = self.step_pin.ok_or(ConfigError::Missing("step_pin"))?;
        let dir_pin = self.dir_pin.ok_or(ConfigError::Missing("dir_pin"))?;
        let delay = self.delay.ok_or(ConfigError::Missing("delay"))?;
        let clock = self.clock.ok_or(ConfigError::Missing("clock"))?;

        let config = self.config;
        validate_axis(config.name.as_str(), &config)?;
        let ramp = SpeedRamp::new(config.max_speed.0, config.acceleration.0)?;

        Ok(AxisController::new(AxisParts {
            step_pin,
            dir_pin,
            delay,
            clock,
            enable_pin: self.enable_pin,
            home_switch: self.home_switch,
            end_switch: self.end_switch,
            events: self.events,
            limits: config.effective_limits(),
            name: config.name,
            id: config.id,
            ramp,
            backoff_steps: config.backoff_steps.0,
            disable_on_limit: config.disable_on_limit,
            trigger_level: config.trigger_level,
            invert_direction: config.invert_direction,
            enable_active_high: config.enable_active_high,
            pulse_width_us: config.pulse_width_us,
            settle_delay_ms: config.settle_delay_ms,
            jog_steps: config.jog_steps.0,
            jog_steps_small: config.jog_steps_small.0,
            default_position: config.default_position.0,
        }))
    }
}
