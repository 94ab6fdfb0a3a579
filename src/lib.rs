//! # stepper-axis
//!
//! Single-axis stepper motor control with embedded-hal 1.0 support.
//!
//! ## Features
//!
//! - **Polled**: one non-blocking `poll()` per scheduler tick, at most one
//!   step pulse per call
//! - **Linear ramp**: constant speed increment per pulse up to a cruise speed
//! - **Travel limits**: soft bounds in steps, or none for a rotary axis
//! - **Limit switches**: auto-homing with backoff, run-to-end calibration
//! - **Events**: move-complete, home-limit and end-limit notifications
//! - **no_std compatible**: core library works without the standard library
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stepper_axis::{AxisController, SystemConfig};
//!
//! let config: SystemConfig = stepper_axis::load_config("axes.toml")?;
//!
//! let mut axis = AxisController::builder()
//!     .from_config(&config, "lift")?
//!     .step_pin(step_pin)
//!     .dir_pin(dir_pin)
//!     .enable_pin(enable_pin)
//!     .home_switch(home_pin)
//!     .delay(delay)
//!     .clock(|| timer.now_us())
//!     .build()?;
//!
//! axis.auto_home()?;
//! loop {
//!     axis.poll()?;
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O and TOML parsing
//! - `alloc`: Enables heap allocation for no_std with allocator
//! - `defmt`: Enables defmt logging for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

#[cfg(feature = "alloc")]
extern crate alloc;

// Logging macros; must come first so later modules see them.
#[macro_use]
mod fmt;

// Core modules
pub mod axis;
pub mod config;
pub mod error;
pub mod events;
pub mod hal;
pub mod motion;

// Re-exports for ergonomic API
pub use axis::{AxisController, AxisControllerBuilder, JogSize, Mode};
pub use config::{validate_config, AxisConfig, LimitPolicy, StepLimits, SystemConfig, TriggerLevel};
pub use error::{Error, Result};
pub use events::{AxisEvent, AxisEventKind, AxisEventSink, Callbacks, EventQueue};
pub use hal::{Clock, Unconnected};
pub use motion::{Direction, SpeedRamp};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

#[cfg(feature = "std")]
pub use hal::StdClock;

// Unit types
pub use config::units::{Steps, StepsPerSec};
