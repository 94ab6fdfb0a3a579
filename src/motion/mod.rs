//! Motion module for stepper-axis.
//!
//! Provides travel direction and the speed ramp that times step pulses.

mod direction;
mod ramp;

pub use direction::Direction;
pub use ramp::SpeedRamp;
