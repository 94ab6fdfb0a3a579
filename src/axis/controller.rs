//! Single-axis stepper controller.
//!
//! A polled state machine: the caller's scheduler invokes
//! [`AxisController::poll`] at a rate at least twice the highest step rate.
//! Each call emits at most one step pulse, when the ramp's step delay has
//! elapsed since the previous one. A late call emits its pulse immediately,
//! which adds jitter but loses no steps.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::config::{StepLimits, TriggerLevel};
use crate::error::{MotionError, MotorError, Result};
use crate::events::AxisEventSink;
use crate::hal::{Clock, Unconnected};
use crate::motion::{Direction, SpeedRamp};

use super::position::Position;
use super::state::{HomingPhase, Mode};
use super::switches::{LimitHit, LimitSwitch, Sample};

/// Distance of a jog move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JogSize {
    /// The configured normal jog distance.
    Normal,
    /// The configured fine jog distance.
    Small,
}

/// Hardware and settings handed over by the builder.
pub(crate) struct AxisParts<STEP, DIR, DELAY, CLK, EN, HOME, END, EV> {
    pub step_pin: STEP,
    pub dir_pin: DIR,
    pub delay: DELAY,
    pub clock: CLK,
    pub enable_pin: Option<EN>,
    pub home_switch: Option<HOME>,
    pub end_switch: Option<END>,
    pub events: EV,
    pub name: heapless::String<32>,
    pub id: u8,
    pub ramp: SpeedRamp,
    pub limits: Option<StepLimits>,
    pub backoff_steps: i64,
    pub disable_on_limit: bool,
    pub trigger_level: TriggerLevel,
    pub invert_direction: bool,
    pub enable_active_high: bool,
    pub pulse_width_us: u32,
    pub settle_delay_ms: u32,
    pub jog_steps: i64,
    pub jog_steps_small: i64,
    pub default_position: i64,
}

/// Controller for one stepper axis.
///
/// Generic over:
/// - `STEP`, `DIR`: step and direction outputs (`OutputPin`)
/// - `DELAY`: pulse width and settle delay provider (`DelayNs`)
/// - `CLK`: monotonic microsecond clock ([`Clock`])
/// - `EN`: driver enable output, [`Unconnected`] if the board has none
/// - `HOME`, `END`: limit switch inputs (`InputPin`), [`Unconnected`] if absent
/// - `EV`: event sink ([`AxisEventSink`]), `()` to discard events
pub struct AxisController<
    STEP,
    DIR,
    DELAY,
    CLK,
    EN = Unconnected,
    HOME = Unconnected,
    END = Unconnected,
    EV = (),
> where
    STEP: OutputPin,
    DIR: OutputPin,
    DELAY: DelayNs,
    CLK: Clock,
    EN: OutputPin,
    HOME: InputPin,
    END: InputPin,
    EV: AxisEventSink,
{
    step_pin: STEP,
    dir_pin: DIR,
    enable_pin: Option<EN>,
    home: LimitSwitch<HOME>,
    end: LimitSwitch<END>,
    delay: DELAY,
    clock: CLK,
    events: EV,

    /// Axis name for logging/debugging.
    name: heapless::String<32>,
    /// Identifier passed to event sinks.
    id: u8,

    position: Position,
    direction: Direction,
    /// Direction last written to the DIR pin.
    dir_pin_state: Option<Direction>,
    ramp: SpeedRamp,
    /// `None` on a rotary axis.
    limits: Option<StepLimits>,
    mode: Mode,

    homed: bool,
    enabled: bool,
    disable_on_limit: bool,
    backoff_steps: i64,
    /// Where a ramp-down would start. Informational only.
    decel_step: Option<i64>,
    /// Clock reading at the last pulse (or command start).
    previous_us: u64,

    invert_direction: bool,
    enable_active_high: bool,
    pulse_width_us: u32,
    settle_delay_ms: u32,
    jog_steps: i64,
    jog_steps_small: i64,
    default_position: i64,

    move_completed: bool,
    home_completed: bool,
}

impl<STEP, DIR, DELAY, CLK, EN, HOME, END, EV> AxisController<STEP, DIR, DELAY, CLK, EN, HOME, END, EV>
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
    pub(crate) fn new(parts: AxisParts<STEP, DIR, DELAY, CLK, EN, HOME, END, EV>) -> Self {
        Self {
            step_pin: parts.step_pin,
            dir_pin: parts.dir_pin,
            enable_pin: parts.enable_pin,
            home: LimitSwitch::new(parts.home_switch, parts.trigger_level),
            end: LimitSwitch::new(parts.end_switch, parts.trigger_level),
            delay: parts.delay,
            clock: parts.clock,
            events: parts.events,
            name: parts.name,
            id: parts.id,
            position: Position::new(),
            direction: Direction::Forward,
            dir_pin_state: None,
            ramp: parts.ramp,
            limits: parts.limits,
            mode: Mode::Stopped,
            homed: false,
            enabled: true,
            disable_on_limit: parts.disable_on_limit,
            backoff_steps: parts.backoff_steps,
            decel_step: None,
            previous_us: 0,
            invert_direction: parts.invert_direction,
            enable_active_high: parts.enable_active_high,
            pulse_width_us: parts.pulse_width_us,
            settle_delay_ms: parts.settle_delay_ms,
            jog_steps: parts.jog_steps,
            jog_steps_small: parts.jog_steps_small,
            default_position: parts.default_position,
            move_completed: false,
            home_completed: false,
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Get the axis name.
    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Identifier passed to event sinks.
    #[inline]
    pub fn id(&self) -> u8 {
        self.id
    }

    /// Steps from the last established zero.
    #[inline]
    pub fn position(&self) -> i64 {
        self.position.absolute()
    }

    /// Signed steps since the current command started.
    #[inline]
    pub fn relative_position(&self) -> i64 {
        self.position.relative()
    }

    /// Pulses emitted since the current command started.
    #[inline]
    pub fn steps_taken(&self) -> u32 {
        self.position.steps_taken()
    }

    /// Current direction of travel.
    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Speed of the last pulse in steps/s.
    #[inline]
    pub fn current_speed(&self) -> u32 {
        self.ramp.current_speed()
    }

    /// Cruise speed in steps/s.
    #[inline]
    pub fn max_speed(&self) -> u32 {
        self.ramp.max_speed()
    }

    /// Speed added per pulse.
    #[inline]
    pub fn acceleration(&self) -> u32 {
        self.ramp.acceleration()
    }

    /// Interval before the next pulse in microseconds.
    #[inline]
    pub fn step_delay_us(&self) -> u32 {
        self.ramp.step_delay_us()
    }

    /// Where a ramp-down for the current step-index move would begin.
    ///
    /// Computed for every `move_steps`, never applied: moves end at cruise
    /// speed.
    #[inline]
    pub fn decel_step(&self) -> Option<i64> {
        self.decel_step
    }

    /// Travel limits, `None` on a rotary axis.
    #[inline]
    pub fn limits(&self) -> Option<StepLimits> {
        self.limits
    }

    /// Upper travel limit, `None` on a rotary axis.
    #[inline]
    pub fn upper_limit(&self) -> Option<i64> {
        self.limits.map(|l| l.upper)
    }

    /// Lower travel limit, `None` on a rotary axis.
    #[inline]
    pub fn lower_limit(&self) -> Option<i64> {
        self.limits.map(|l| l.lower)
    }

    /// The active command mode.
    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether the axis is stepping.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.mode.is_running()
    }

    /// Whether a zero reference has been established.
    #[inline]
    pub fn is_homed(&self) -> bool {
        self.homed
    }

    /// Whether auto-homing is active.
    #[inline]
    pub fn is_auto_homing(&self) -> bool {
        self.mode.is_homing()
    }

    /// Whether auto-homing is backing off the home switch.
    #[inline]
    pub fn is_backing_off(&self) -> bool {
        self.mode.is_backing_off()
    }

    /// Whether a run-to-end calibration is active.
    #[inline]
    pub fn is_running_to_end(&self) -> bool {
        self.mode.is_running_to_end()
    }

    /// Whether a step-index move is active.
    #[inline]
    pub fn is_step_index_mode(&self) -> bool {
        self.mode.step_target().is_some()
    }

    /// Whether the driver output is enabled.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether a limit switch stop also cuts driver power.
    #[inline]
    pub fn is_disable_on_limit(&self) -> bool {
        self.disable_on_limit
    }

    /// Home switch was pressed on its last reading.
    #[inline]
    pub fn is_home_switch_active(&self) -> bool {
        self.home.is_latched()
    }

    /// End switch was pressed on its last reading.
    #[inline]
    pub fn is_end_switch_active(&self) -> bool {
        self.end.is_latched()
    }

    /// Whether a home switch is wired.
    #[inline]
    pub fn has_home_switch(&self) -> bool {
        self.home.is_connected()
    }

    /// Whether an end switch is wired.
    #[inline]
    pub fn has_end_switch(&self) -> bool {
        self.end.is_connected()
    }

    /// Distance travelled off the home switch before the zero is latched.
    #[inline]
    pub fn backoff_steps(&self) -> i64 {
        self.backoff_steps
    }

    /// Configured resting position.
    #[inline]
    pub fn default_position(&self) -> i64 {
        self.default_position
    }

    /// Returns `true` once after each command ends.
    pub fn take_move_completed(&mut self) -> bool {
        core::mem::take(&mut self.move_completed)
    }

    /// Returns `true` once after each completed auto-homing.
    pub fn take_home_completed(&mut self) -> bool {
        core::mem::take(&mut self.home_completed)
    }

    /// The event sink.
    #[inline]
    pub fn events(&self) -> &EV {
        &self.events
    }

    /// The event sink, mutably (to register callbacks or drain a queue).
    #[inline]
    pub fn events_mut(&mut self) -> &mut EV {
        &mut self.events
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    /// Set the identifier passed to event sinks.
    pub fn set_id(&mut self, id: u8) {
        self.id = id;
    }

    /// Set the cruise speed in steps/s.
    pub fn set_max_speed(&mut self, speed: u32) -> Result<()> {
        self.ramp.set_max_speed(speed)
    }

    /// Set the speed added per pulse.
    pub fn set_acceleration(&mut self, acceleration: u32) -> Result<()> {
        self.ramp.set_acceleration(acceleration)
    }

    /// Set travel limits; `None` turns the axis rotary (no bounds, no
    /// switch checks).
    ///
    /// Limits are in steps and do not follow microstepping changes.
    pub fn set_limits(&mut self, limits: Option<StepLimits>) -> Result<()> {
        if let Some(l) = limits {
            if !l.is_valid() {
                return Err(MotionError::InvalidLimits {
                    lower: l.lower,
                    upper: l.upper,
                }
                .into());
            }
        }
        self.limits = limits;
        Ok(())
    }

    /// Set the backoff distance used by auto-homing.
    pub fn set_backoff_steps(&mut self, steps: i64) {
        self.backoff_steps = steps.max(0);
    }

    /// Choose whether a limit switch stop also cuts driver power.
    pub fn set_disable_on_limit(&mut self, disable: bool) {
        self.disable_on_limit = disable;
    }

    /// Set the level at which both limit switches count as pressed.
    pub fn set_trigger_level(&mut self, level: TriggerLevel) {
        self.home.set_trigger_level(level);
        self.end.set_trigger_level(level);
    }

    /// Overwrite the absolute position without changing `homed`.
    pub fn set_position(&mut self, steps: i64) {
        self.position.set(steps);
    }

    /// Set the direction of travel and drive the DIR pin.
    pub fn set_direction(&mut self, direction: Direction) -> Result<()> {
        self.direction = direction;
        if self.dir_pin_state == Some(direction) {
            return Ok(());
        }

        if direction.pin_level(self.invert_direction) {
            self.dir_pin.set_high().map_err(|_| MotorError::PinError)?;
        } else {
            self.dir_pin.set_low().map_err(|_| MotorError::PinError)?;
        }
        self.dir_pin_state = Some(direction);
        Ok(())
    }

    /// Reverse the direction of travel. A running axis restarts its ramp.
    pub fn change_direction(&mut self) -> Result<()> {
        if self.mode.is_running() {
            self.ramp.restart();
        }
        self.set_direction(self.direction.reversed())
    }

    /// Make the current location zero and mark the axis homed.
    pub fn set_home(&mut self) {
        self.homed = true;
        self.position.zero();
    }

    /// Make the current location zero and mark the axis not homed.
    pub fn unset_home(&mut self) {
        self.homed = false;
        self.position.zero();
    }

    /// Drive the enable line. `true` cuts driver power.
    ///
    /// Independent of motion: a running axis keeps counting pulses. No-op
    /// without an enable pin.
    pub fn disable_controller(&mut self, disabled: bool) -> Result<()> {
        if self.enable_pin.is_none() {
            return Ok(());
        }
        self.set_enable_line(!disabled)?;
        self.enabled = !disabled;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Begin stepping in the current mode and direction.
    ///
    /// Resets the ramp and per-command counters, then checks the limit
    /// switches. Returns `false` if a pressed switch means the axis must stay
    /// stopped; the stop has already been reported.
    pub fn start(&mut self) -> Result<bool> {
        self.previous_us = self.clock.now_us();
        self.position.begin_command();
        self.ramp.reset();
        self.move_completed = false;
        self.mode = match self.mode {
            Mode::Stopped => Mode::Free,
            Mode::Homing(_) => Mode::Homing(HomingPhase::Seeking),
            other => other,
        };

        debug!("axis {}: start {}", self.id, self.mode.name());

        match self.check_limit_switches()? {
            Some(hit) => self.resolve_limit(hit),
            None => {
                self.set_enable_line(true)?;
                self.enabled = true;
                Ok(true)
            }
        }
    }

    /// Stop immediately and report move-complete.
    ///
    /// Always reports, even when the axis was already stopped.
    pub fn stop(&mut self) {
        debug!("axis {}: stop at {}", self.id, self.position.absolute());
        self.mode = Mode::Stopped;
        self.move_completed = true;
        self.events.move_complete(self.id);
    }

    /// Move `steps` from the current position (positive is forward).
    pub fn move_steps(&mut self, steps: i64) -> Result<bool> {
        self.mode = Mode::StepIndex { target: steps };
        self.set_direction(Direction::from_steps(steps))?;
        self.decel_step = Some(self.ramp.decel_step(self.position.absolute(), steps));
        self.start()
    }

    /// Move to an absolute position, subject to the limit policy.
    pub fn move_to(&mut self, target: i64) -> Result<bool> {
        let target = match self.limits {
            Some(limits) => limits.apply(target),
            None => target,
        };
        self.move_steps(self.position.steps_to(target))
    }

    /// Move back to zero. Returns `Ok(false)` without moving when already
    /// there.
    pub fn return_home(&mut self) -> Result<bool> {
        if self.position.absolute() == 0 {
            return Ok(false);
        }
        self.move_steps(self.position.steps_to(0))
    }

    /// Jog by the configured distance.
    pub fn jog(&mut self, direction: Direction, size: JogSize) -> Result<bool> {
        let steps = match size {
            JogSize::Normal => self.jog_steps,
            JogSize::Small => self.jog_steps_small,
        };
        self.move_steps(direction.sign() * steps)
    }

    /// Move to the configured resting position.
    pub fn move_to_default(&mut self) -> Result<bool> {
        self.move_to(self.default_position)
    }

    /// Find the home switch and establish zero.
    ///
    /// Runs in reverse until the home switch closes, latches zero there,
    /// turns around and backs off until past `backoff_steps`, then latches
    /// zero again and stops homed. Returns `Ok(false)` without moving when
    /// there is no home switch or the axis is rotary.
    pub fn auto_home(&mut self) -> Result<bool> {
        if !self.home.is_connected() || self.limits.is_none() {
            return Ok(false);
        }

        info!("axis {}: auto-homing", self.id);
        self.unset_home();
        self.mode = Mode::Homing(HomingPhase::Seeking);
        self.set_direction(Direction::Reverse)?;
        self.decel_step = None;
        self.start()
    }

    /// Run forward from home until the end switch closes and adopt that
    /// position as the upper limit.
    ///
    /// Returns `Ok(false)` without moving unless the axis is homed, bounded
    /// and has both switches.
    pub fn run_to_end(&mut self) -> Result<bool> {
        if !self.home.is_connected()
            || !self.end.is_connected()
            || !self.homed
            || self.limits.is_none()
        {
            return Ok(false);
        }

        info!("axis {}: running to end", self.id);
        self.mode = Mode::RunningToEnd;
        self.set_direction(Direction::Forward)?;
        self.decel_step = None;
        self.start()
    }

    /// Per-tick entry point.
    ///
    /// Returns `true` if a step pulse was emitted.
    pub fn poll(&mut self) -> Result<bool> {
        if !self.mode.is_running() {
            return Ok(false);
        }

        match self.check_limit_switches()? {
            Some(hit) => {
                if !self.resolve_limit(hit)? {
                    return Ok(false);
                }
            }
            None => {
                if self.mode.is_backing_off() && self.position.absolute() > self.backoff_steps {
                    info!("axis {}: homed", self.id);
                    self.home_completed = true;
                    self.set_home();
                    self.stop();
                    return Ok(false);
                }
            }
        }

        if self.check_auto_stop() {
            return Ok(false);
        }

        let now = self.clock.now_us();
        if now.saturating_sub(self.previous_us) < u64::from(self.ramp.step_delay_us()) {
            return Ok(false);
        }

        self.ramp.accelerate();

        if !self.permits_step(self.direction) {
            warn!(
                "axis {}: step to {} refused by limits",
                self.id,
                self.position.next(self.direction)
            );
            self.stop();
            return Ok(false);
        }

        self.previous_us = now;
        self.pulse()?;
        self.position.advance(self.direction);
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Sample both switches, fire edge events and latch a run-to-end.
    ///
    /// The end switch wins when both are pressed. Rotary axes skip the check,
    /// and homing skips an end switch with no pin.
    fn check_limit_switches(&mut self) -> Result<Option<LimitHit>> {
        if self.limits.is_none() {
            return Ok(None);
        }

        let mut hit = None;

        let home = self.home.sample()?;
        if home.active {
            if home.rising {
                debug!("axis {}: home switch", self.id);
                self.events.home_limit(self.id);
            }
            hit = Some(LimitHit::Home);
        }

        // An unwired end switch reads as pressed and would mask the home
        // switch for the whole homing run.
        let end = if self.mode.is_homing() && !self.end.is_connected() {
            Sample::RELEASED
        } else {
            self.end.sample()?
        };
        if end.active {
            if self.mode.is_running_to_end() {
                let position = self.position.absolute();
                if let Some(limits) = self.limits.as_mut() {
                    limits.upper = position;
                }
                self.mode = Mode::Free;
                info!("axis {}: upper limit set to {}", self.id, position);
            }
            if end.rising {
                debug!("axis {}: end switch", self.id);
                self.events.end_limit(self.id);
            }
            hit = Some(LimitHit::End);
        }

        Ok(hit)
    }

    /// Decide what a pressed switch means for the current move.
    ///
    /// Returns `false` if the axis was stopped.
    fn resolve_limit(&mut self, hit: LimitHit) -> Result<bool> {
        match (self.direction, hit) {
            // Moving away from the pressed switch: recover a tripped driver.
            (Direction::Reverse, LimitHit::End) | (Direction::Forward, LimitHit::Home) => {
                if !self.enabled {
                    debug!("axis {}: re-enabling driver", self.id);
                    self.set_enable_line(true)?;
                    self.enabled = true;
                    self.delay.delay_ms(self.settle_delay_ms);
                }
                Ok(true)
            }
            (_, LimitHit::Home) if self.mode == Mode::Homing(HomingPhase::Seeking) => {
                debug!("axis {}: home found, backing off", self.id);
                self.mode = Mode::Homing(HomingPhase::Backoff);
                self.set_home();
                self.change_direction()?;
                Ok(true)
            }
            _ => {
                warn!("axis {}: stopped by limit switch", self.id);
                if self.disable_on_limit && self.enable_pin.is_some() {
                    self.set_enable_line(false)?;
                    self.enabled = false;
                }
                self.stop();
                Ok(false)
            }
        }
    }

    /// Stop a step-index move that has reached its target.
    fn check_auto_stop(&mut self) -> bool {
        match self.mode.step_target() {
            Some(target) if target == self.position.relative() => {
                self.stop();
                true
            }
            _ => false,
        }
    }

    /// Whether a pulse in `direction` keeps the axis inside its limits.
    ///
    /// Homing may pass the lower bound and running to end the upper one.
    fn permits_step(&self, direction: Direction) -> bool {
        let Some(limits) = self.limits else {
            return true;
        };
        let next = self.position.next(direction);
        let over = limits.above(next) && !self.mode.is_running_to_end();
        let under = limits.below(next) && !self.mode.is_homing();
        !(over || under)
    }

    fn set_enable_line(&mut self, enabled: bool) -> Result<()> {
        let high = enabled == self.enable_active_high;
        if let Some(pin) = self.enable_pin.as_mut() {
            if high {
                pin.set_high().map_err(|_| MotorError::PinError)?;
            } else {
                pin.set_low().map_err(|_| MotorError::PinError)?;
            }
        }
        Ok(())
    }

    fn pulse(&mut self) -> Result<()> {
        self.step_pin.set_high().map_err(|_| MotorError::PinError)?;
        self.delay.delay_us(self.pulse_width_us);
        self.step_pin.set_low().map_err(|_| MotorError::PinError)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::EmptyBuilder;
    use crate::config::LimitPolicy;
    use crate::events::{AxisEventKind, EventQueue};
    use core::cell::Cell;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;
    use std::rc::Rc;

    /// Output pin that remembers its level.
    struct Level(Rc<Cell<bool>>);

    impl ErrorType for Level {
        type Error = Infallible;
    }

    impl OutputPin for Level {
        fn set_low(&mut self) -> core::result::Result<(), Infallible> {
            self.0.set(false);
            Ok(())
        }

        fn set_high(&mut self) -> core::result::Result<(), Infallible> {
            self.0.set(true);
            Ok(())
        }
    }

    /// Step pin that moves a simulated carriage one step per rising edge.
    struct StepOut {
        dir: Rc<Cell<bool>>,
        carriage: Rc<Cell<i64>>,
        pulses: Rc<Cell<u32>>,
    }

    impl ErrorType for StepOut {
        type Error = Infallible;
    }

    impl OutputPin for StepOut {
        fn set_low(&mut self) -> core::result::Result<(), Infallible> {
            Ok(())
        }

        fn set_high(&mut self) -> core::result::Result<(), Infallible> {
            let delta = if self.dir.get() { 1 } else { -1 };
            self.carriage.set(self.carriage.get() + delta);
            self.pulses.set(self.pulses.get() + 1);
            Ok(())
        }
    }

    /// Active-low switch closed while the carriage is past `at`.
    struct SwitchIn {
        carriage: Rc<Cell<i64>>,
        at: Rc<Cell<i64>>,
        home_side: bool,
    }

    impl SwitchIn {
        fn pressed(&self) -> bool {
            if self.home_side {
                self.carriage.get() <= self.at.get()
            } else {
                self.carriage.get() >= self.at.get()
            }
        }
    }

    impl ErrorType for SwitchIn {
        type Error = Infallible;
    }

    impl InputPin for SwitchIn {
        fn is_high(&mut self) -> core::result::Result<bool, Infallible> {
            Ok(!self.pressed())
        }

        fn is_low(&mut self) -> core::result::Result<bool, Infallible> {
            Ok(self.pressed())
        }
    }

    /// Delay that records the total requested time.
    struct SpentDelay(Rc<Cell<u64>>);

    impl DelayNs for SpentDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.0.set(self.0.get() + u64::from(ns));
        }
    }

    struct TestClock(Rc<Cell<u64>>);

    impl Clock for TestClock {
        fn now_us(&self) -> u64 {
            self.0.get()
        }
    }

    type TestAxis =
        AxisController<StepOut, Level, SpentDelay, TestClock, Level, SwitchIn, SwitchIn, EventQueue<16>>;

    #[derive(Default)]
    struct Rig {
        carriage: Rc<Cell<i64>>,
        dir: Rc<Cell<bool>>,
        enable: Rc<Cell<bool>>,
        pulses: Rc<Cell<u32>>,
        now: Rc<Cell<u64>>,
        delayed_ns: Rc<Cell<u64>>,
        home_at: Rc<Cell<i64>>,
        end_at: Rc<Cell<i64>>,
    }

    impl Rig {
        fn new(carriage: i64) -> Self {
            let rig = Self::default();
            rig.carriage.set(carriage);
            rig.home_at.set(0);
            rig.end_at.set(10_000);
            rig
        }

        fn build(&self, configure: impl FnOnce(EmptyBuilder) -> EmptyBuilder) -> TestAxis {
            configure(AxisController::builder())
                .step_pin(StepOut {
                    dir: self.dir.clone(),
                    carriage: self.carriage.clone(),
                    pulses: self.pulses.clone(),
                })
                .dir_pin(Level(self.dir.clone()))
                .enable_pin(Level(self.enable.clone()))
                .home_switch(SwitchIn {
                    carriage: self.carriage.clone(),
                    at: self.home_at.clone(),
                    home_side: true,
                })
                .end_switch(SwitchIn {
                    carriage: self.carriage.clone(),
                    at: self.end_at.clone(),
                    home_side: false,
                })
                .delay(SpentDelay(self.delayed_ns.clone()))
                .clock(TestClock(self.now.clone()))
                .events(EventQueue::new())
                .build()
                .unwrap()
        }

        /// Poll with a generous tick until the axis stops.
        fn run(&self, axis: &mut TestAxis, max_ticks: usize) -> u32 {
            let mut pulses = 0;
            for _ in 0..max_ticks {
                if !axis.is_running() {
                    break;
                }
                self.now.set(self.now.get() + 100_000);
                if axis.poll().unwrap() {
                    pulses += 1;
                }
            }
            pulses
        }
    }

    #[test]
    fn test_auto_home_backs_off_and_zeroes() {
        let rig = Rig::new(500);
        let mut axis = rig.build(|b| b.backoff_steps(40));

        assert!(axis.auto_home().unwrap());
        assert!(axis.is_auto_homing());
        assert!(!axis.is_homed());

        // A poll with no time elapsed only checks the switches, so the
        // turnaround is seen before the first backoff pulse.
        for _ in 0..2_000 {
            axis.poll().unwrap();
            if axis.is_backing_off() {
                break;
            }
            rig.now.set(rig.now.get() + 100_000);
            axis.poll().unwrap();
        }
        assert!(axis.is_backing_off());
        assert_eq!(axis.position(), 0);
        assert_eq!(rig.carriage.get(), 0);
        assert_eq!(axis.direction(), Direction::Forward);
        assert!(axis.is_homed());

        rig.run(&mut axis, 2_000);

        assert!(!axis.is_running());
        assert!(axis.is_homed());
        assert_eq!(axis.position(), 0);
        assert_eq!(rig.carriage.get(), 41);
        assert!(axis.take_home_completed());
        assert!(!axis.take_home_completed());
        assert_eq!(axis.events().count(AxisEventKind::HomeLimit), 1);
        assert_eq!(axis.events().count(AxisEventKind::MoveComplete), 1);
    }

    #[test]
    fn test_auto_home_starting_on_switch() {
        let rig = Rig::new(-3);
        let mut axis = rig.build(|b| b.backoff_steps(40));
        axis.set_direction(Direction::Forward).unwrap();

        assert!(axis.auto_home().unwrap());
        assert!(axis.is_backing_off());
        assert_eq!(axis.direction(), Direction::Forward);

        rig.run(&mut axis, 2_000);
        assert!(axis.is_homed());
        assert!(!axis.is_running());
        assert_eq!(axis.position(), 0);
        assert_eq!(rig.carriage.get(), 38);
    }

    #[test]
    fn test_auto_home_with_home_switch_only() {
        let rig = Rig::new(200);
        let mut axis = AxisController::builder()
            .backoff_steps(40)
            .step_pin(StepOut {
                dir: rig.dir.clone(),
                carriage: rig.carriage.clone(),
                pulses: rig.pulses.clone(),
            })
            .dir_pin(Level(rig.dir.clone()))
            .enable_pin(Level(rig.enable.clone()))
            .home_switch(SwitchIn {
                carriage: rig.carriage.clone(),
                at: rig.home_at.clone(),
                home_side: true,
            })
            .delay(SpentDelay(rig.delayed_ns.clone()))
            .clock(TestClock(rig.now.clone()))
            .events(EventQueue::<16>::new())
            .build()
            .unwrap();
        assert!(!axis.has_end_switch());

        assert!(axis.auto_home().unwrap());
        for _ in 0..5_000 {
            if !axis.is_running() {
                break;
            }
            rig.now.set(rig.now.get() + 100_000);
            axis.poll().unwrap();
        }

        assert!(!axis.is_running());
        assert!(axis.is_homed());
        assert_eq!(axis.position(), 0);
        assert_eq!(rig.carriage.get(), 41);
        assert!(axis.take_home_completed());
        assert_eq!(axis.events().count(AxisEventKind::EndLimit), 0);
    }

    #[test]
    fn test_far_move_targets_do_not_overflow() {
        let rig = Rig::new(10);
        rig.home_at.set(-50);
        let mut axis = rig.build(|b| b.limits(StepLimits::new(0, 100)));
        axis.set_position(10);

        assert!(axis.move_steps(i64::MAX).unwrap());
        assert_eq!(axis.decel_step(), Some(i64::MAX - 150));
        rig.run(&mut axis, 1_000);
        assert_eq!(axis.position(), 100);

        assert!(axis.move_to(i64::MIN).unwrap());
        assert_eq!(axis.direction(), Direction::Reverse);
        rig.run(&mut axis, 1_000);
        assert_eq!(axis.position(), 0);
    }

    #[test]
    fn test_overshoot_stops_at_upper_limit() {
        let rig = Rig::new(0);
        rig.home_at.set(-50);
        let mut axis = rig.build(|b| b.limits(StepLimits::new(0, 100)));

        assert!(axis.move_to(150).unwrap());
        assert_eq!(rig.run(&mut axis, 1_000), 100);

        assert_eq!(axis.position(), 100);
        assert_eq!(rig.carriage.get(), 100);
        assert!(axis.take_move_completed());
        assert_eq!(axis.events().count(AxisEventKind::MoveComplete), 1);
    }

    #[test]
    fn test_clamp_policy_shortens_target() {
        let rig = Rig::new(0);
        rig.home_at.set(-50);
        let mut axis =
            rig.build(|b| b.limits(StepLimits::new(0, 100).with_policy(LimitPolicy::Clamp)));

        axis.move_to(150).unwrap();
        assert_eq!(axis.mode(), Mode::StepIndex { target: 100 });
        rig.run(&mut axis, 1_000);
        assert_eq!(axis.position(), 100);
    }

    #[test]
    fn test_stop_when_idle_reports_each_time() {
        let rig = Rig::new(0);
        let mut axis = rig.build(|b| b);

        axis.stop();
        axis.stop();
        assert_eq!(axis.events().count(AxisEventKind::MoveComplete), 2);
    }

    #[test]
    fn test_run_to_end_requires_homed() {
        let rig = Rig::new(0);
        let mut axis = rig.build(|b| b);

        assert!(!axis.run_to_end().unwrap());
        assert!(!axis.is_running());
        assert_eq!(rig.pulses.get(), 0);
    }

    #[test]
    fn test_run_to_end_then_leave_end_switch() {
        let rig = Rig::new(0);
        rig.end_at.set(2_000);
        let mut axis = rig.build(|b| b);
        axis.set_home();

        assert!(axis.run_to_end().unwrap());
        rig.run(&mut axis, 5_000);

        assert_eq!(axis.upper_limit(), Some(2_000));
        assert_eq!(axis.position(), 2_000);
        assert!(!axis.is_running_to_end());
        assert!(!axis.is_enabled());
        assert!(rig.enable.get(), "active-low enable line should be high");
        assert_eq!(axis.events().count(AxisEventKind::EndLimit), 1);

        // Reversing off the held switch re-enables the driver and waits.
        assert!(axis.move_steps(-100).unwrap());
        assert!(axis.is_enabled());
        assert!(!rig.enable.get());
        assert!(rig.delayed_ns.get() >= 50_000_000);

        rig.run(&mut axis, 1_000);
        assert_eq!(axis.position(), 1_900);
        assert_eq!(axis.events().count(AxisEventKind::EndLimit), 1);
    }

    #[test]
    fn test_end_switch_without_disable_keeps_driver_on() {
        let rig = Rig::new(0);
        rig.home_at.set(-50);
        rig.end_at.set(30);
        let mut axis = rig.build(|b| b.disable_on_limit(false));

        axis.move_steps(100).unwrap();
        rig.run(&mut axis, 1_000);

        assert_eq!(axis.position(), 30);
        assert!(axis.is_enabled());
        assert!(axis.is_end_switch_active());
    }

    #[test]
    fn test_rotary_ignores_switches_and_limits() {
        let rig = Rig::new(0);
        rig.home_at.set(100);
        let mut axis = rig.build(|b| b.rotary());

        assert!(!axis.auto_home().unwrap());
        assert!(axis.move_steps(-300).unwrap());
        rig.run(&mut axis, 1_000);

        assert_eq!(axis.position(), -300);
        assert_eq!(axis.events().count(AxisEventKind::HomeLimit), 0);
    }

    #[test]
    fn test_first_pulse_is_immediate_then_ramps() {
        let rig = Rig::new(0);
        let mut axis = rig.build(|b| b.rotary().acceleration(20).max_speed(3_000));

        axis.move_steps(10).unwrap();
        assert!(axis.poll().unwrap());
        assert_eq!(axis.current_speed(), 20);
        assert_eq!(axis.step_delay_us(), 50_000);

        rig.now.set(49_999);
        assert!(!axis.poll().unwrap());
        rig.now.set(50_000);
        assert!(axis.poll().unwrap());
        assert_eq!(axis.current_speed(), 40);
        assert_eq!(axis.step_delay_us(), 25_000);
    }

    #[test]
    fn test_change_direction_restarts_ramp() {
        let rig = Rig::new(0);
        let mut axis = rig.build(|b| b.rotary());

        axis.move_steps(1_000).unwrap();
        rig.now.set(1_000_000);
        axis.poll().unwrap();
        assert!(axis.current_speed() > 0);

        axis.change_direction().unwrap();
        assert_eq!(axis.current_speed(), 0);
        assert_eq!(axis.direction(), Direction::Reverse);
        assert!(!rig.dir.get());
    }

    #[test]
    fn test_disabled_driver_keeps_counting() {
        let rig = Rig::new(0);
        let mut axis = rig.build(|b| b.rotary());

        axis.move_steps(10).unwrap();
        axis.disable_controller(true).unwrap();
        assert!(!axis.is_enabled());
        assert!(rig.enable.get());

        rig.run(&mut axis, 100);
        assert_eq!(axis.position(), 10);
    }

    #[test]
    fn test_jog_and_default_position() {
        let rig = Rig::new(0);
        rig.home_at.set(-50);
        let mut axis = rig.build(|b| b.default_position(300).jog_steps(100, 10));

        axis.move_to_default().unwrap();
        rig.run(&mut axis, 1_000);
        assert_eq!(axis.position(), 300);

        axis.jog(Direction::Reverse, JogSize::Small).unwrap();
        rig.run(&mut axis, 1_000);
        assert_eq!(axis.position(), 290);

        axis.jog(Direction::Forward, JogSize::Normal).unwrap();
        rig.run(&mut axis, 1_000);
        assert_eq!(axis.position(), 390);
        assert_eq!(axis.relative_position(), 100);
        assert_eq!(axis.steps_taken(), 100);
    }

    #[test]
    fn test_return_home() {
        let rig = Rig::new(0);
        rig.home_at.set(-50);
        let mut axis = rig.build(|b| b);

        assert!(!axis.return_home().unwrap());

        axis.set_position(250);
        assert!(axis.return_home().unwrap());
        rig.run(&mut axis, 1_000);
        assert_eq!(axis.position(), 0);
    }

    #[test]
    fn test_decel_step_is_reported() {
        let rig = Rig::new(0);
        let mut axis = rig.build(|b| b.rotary().max_speed(3_000).acceleration(20));

        axis.move_steps(1_000).unwrap();
        assert_eq!(axis.decel_step(), Some(850));

        axis.move_steps(-1_000).unwrap();
        assert_eq!(axis.decel_step(), Some(-850));
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let rig = Rig::new(0);
        let mut axis = rig.build(|b| b);

        assert!(axis.set_max_speed(0).is_err());
        assert!(axis.set_acceleration(0).is_err());
        assert!(axis.set_limits(Some(StepLimits::new(10, 10))).is_err());
        assert!(axis.set_limits(None).is_ok());
        assert_eq!(axis.upper_limit(), None);
    }

    #[test]
    fn test_bounded_axis_without_switches_stays_put() {
        let now = Rc::new(Cell::new(0u64));
        let clock_now = now.clone();
        let mut axis = AxisController::builder()
            .step_pin(Unconnected)
            .dir_pin(Unconnected)
            .delay(Unconnected)
            .clock(move || clock_now.get())
            .events(EventQueue::<4>::new())
            .build()
            .unwrap();

        assert!(!axis.move_steps(10).unwrap());
        assert!(!axis.is_running());
        assert_eq!(axis.events().count(AxisEventKind::MoveComplete), 1);
        now.set(1_000_000);
        assert!(!axis.poll().unwrap());
    }
}
