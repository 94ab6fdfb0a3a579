//! Axis configuration from TOML.

use heapless::String;
use serde::Deserialize;

use super::limits::StepLimits;
use super::units::{Steps, StepsPerSec};

/// Electrical level at which a limit switch counts as triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum TriggerLevel {
    /// Switch pulls the line high when pressed.
    High,
    /// Switch pulls the line low when pressed (pulled-up input).
    #[default]
    Low,
}

impl TriggerLevel {
    /// Whether a line reading `is_high` means the switch is pressed.
    #[inline]
    pub fn is_triggered(self, is_high: bool) -> bool {
        match self {
            TriggerLevel::High => is_high,
            TriggerLevel::Low => !is_high,
        }
    }
}

/// Complete axis configuration from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct AxisConfig {
    /// Human-readable name (max 32 chars).
    pub name: String<32>,

    /// Identifier passed to event sinks.
    #[serde(default = "default_id")]
    pub id: u8,

    /// Cruise speed in steps per second.
    #[serde(default = "default_max_speed")]
    pub max_speed: StepsPerSec,

    /// Speed added on every pulse while ramping up.
    #[serde(default = "default_acceleration")]
    pub acceleration: StepsPerSec,

    /// Distance to travel off the home switch before the zero is latched.
    #[serde(default = "default_backoff_steps")]
    pub backoff_steps: Steps,

    /// Cut driver power when a limit switch stops the axis.
    #[serde(default = "default_true")]
    pub disable_on_limit: bool,

    /// Level at which both limit switches count as pressed.
    #[serde(default)]
    pub trigger_level: TriggerLevel,

    /// Invert direction pin logic.
    #[serde(default)]
    pub invert_direction: bool,

    /// Driver is enabled by a high enable line instead of a low one.
    #[serde(default)]
    pub enable_active_high: bool,

    /// Step pulse high time in microseconds.
    #[serde(default = "default_pulse_width_us")]
    pub pulse_width_us: u32,

    /// Time to let the driver settle after re-enabling it off a limit.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u32,

    /// Axis has no end stops; disables bounds and switch checks.
    #[serde(default)]
    pub rotary: bool,

    /// Travel limits (ignored when `rotary`).
    #[serde(default)]
    pub limits: StepLimits,

    /// Distance of a normal jog.
    #[serde(default = "default_jog_steps")]
    pub jog_steps: Steps,

    /// Distance of a fine jog.
    #[serde(default = "default_jog_steps_small")]
    pub jog_steps_small: Steps,

    /// Resting position the axis returns to between uses.
    #[serde(default)]
    pub default_position: Steps,
}

fn default_id() -> u8 {
    1
}

fn default_max_speed() -> StepsPerSec {
    StepsPerSec(3000)
}

fn default_acceleration() -> StepsPerSec {
    StepsPerSec(20)
}

fn default_backoff_steps() -> Steps {
    Steps(40)
}

fn default_true() -> bool {
    true
}

fn default_pulse_width_us() -> u32 {
    15
}

fn default_settle_delay_ms() -> u32 {
    50
}

fn default_jog_steps() -> Steps {
    Steps(100)
}

fn default_jog_steps_small() -> Steps {
    Steps(10)
}

impl AxisConfig {
    /// Configuration with every field at its default.
    pub fn new(name: &str) -> Self {
        Self {
            name: String::try_from(name).unwrap_or_default(),
            id: default_id(),
            max_speed: default_max_speed(),
            acceleration: default_acceleration(),
            backoff_steps: default_backoff_steps(),
            disable_on_limit: true,
            trigger_level: TriggerLevel::default(),
            invert_direction: false,
            enable_active_high: false,
            pulse_width_us: default_pulse_width_us(),
            settle_delay_ms: default_settle_delay_ms(),
            rotary: false,
            limits: StepLimits::default(),
            jog_steps: default_jog_steps(),
            jog_steps_small: default_jog_steps_small(),
            default_position: Steps::default(),
        }
    }

    /// Limits in effect: `None` for a rotary axis.
    pub fn effective_limits(&self) -> Option<StepLimits> {
        if self.rotary {
            None
        } else {
            Some(self.limits)
        }
    }
}
