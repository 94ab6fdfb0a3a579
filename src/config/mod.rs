//! Configuration module for stepper-axis.
//!
//! Provides types for loading and validating per-axis configuration from TOML
//! files (with `std` feature) or building it in code.

mod axis;
mod limits;
mod system;
pub mod units;
#[cfg(feature = "std")]
mod loader;
mod validation;

pub use axis::{AxisConfig, TriggerLevel};
pub use limits::{LimitPolicy, StepLimits, DEFAULT_LOWER_LIMIT, DEFAULT_UPPER_LIMIT};
pub use system::{SystemConfig, MAX_AXES};
pub use validation::{validate_axis, validate_config, MIN_PULSE_WIDTH_US};

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{Steps, StepsPerSec};
