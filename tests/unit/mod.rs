//! Unit test harness for stepper-axis.
//!
//! This module organizes configuration tests that only need the public API.

mod config_parsing;
mod config_validation;
