//! Axis module for stepper-axis.
//!
//! Provides the single-axis controller, its builder and the pieces it is made
//! of: position tracking, command mode and limit switch sampling.

mod builder;
mod controller;
mod position;
pub mod state;
mod switches;

pub use builder::{AxisControllerBuilder, EmptyBuilder};
pub use controller::{AxisController, JogSize};
pub use position::Position;
pub use state::{HomingPhase, Mode};
pub use switches::{LimitHit, LimitSwitch, Sample};
