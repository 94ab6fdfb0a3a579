//! Unit tests for configuration validation.

use stepper_axis::config::{parse_config, validate_config, SystemConfig};
use stepper_axis::error::{ConfigError, Error};

/// Test validation of a valid configuration.
#[test]
fn test_valid_config_passes_validation() {
    let toml_str = r#"
[axes.lift]
name = "Lift"
max_speed = 2000
acceleration = 10

[axes.lift.limits]
lower = 0
upper = 5000
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    assert!(validate_config(&config).is_ok());
}

/// Test validation fails for zero acceleration.
#[test]
fn test_zero_acceleration() {
    let result = parse_config("[axes.lift]\nname = \"Lift\"\nacceleration = 0\n");
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidAcceleration(0)))
    ));
}

/// Test validation fails for inverted limits.
#[test]
fn test_invalid_limits() {
    let toml_str = r#"
[axes.lift]
name = "Lift"

[axes.lift.limits]
lower = 500
upper = -500
"#;

    let result = parse_config(toml_str);
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidLimits { lower: 500, upper: -500 }))
    ));
}

/// Test that inverted limits are ignored on a rotary axis.
#[test]
fn test_rotary_skips_limit_checks() {
    let toml_str = r#"
[axes.spinner]
name = "Spinner"
rotary = true
default_position = -20000

[axes.spinner.limits]
lower = 500
upper = -500
"#;

    assert!(parse_config(toml_str).is_ok());
}

/// Test validation fails for a default position outside the limits.
#[test]
fn test_default_position_outside_limits() {
    let result = parse_config("[axes.lift]\nname = \"Lift\"\ndefault_position = 20000\n");
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::DefaultOutsideLimits { position: 20000, .. }))
    ));
}

/// Test validation fails for duplicate event identifiers.
#[test]
fn test_duplicate_ids() {
    let toml_str = r#"
[axes.left]
name = "Left"
id = 5

[axes.right]
name = "Right"
id = 5
"#;

    let result = parse_config(toml_str);
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::DuplicateAxisId(5)))
    ));
}

/// Test validation fails for a pulse the driver cannot see.
#[test]
fn test_pulse_too_short() {
    let result = parse_config("[axes.lift]\nname = \"Lift\"\npulse_width_us = 1\n");
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidPulseWidth(1)))
    ));
}

/// Test validation fails for a negative backoff.
#[test]
fn test_negative_backoff() {
    let result = parse_config("[axes.lift]\nname = \"Lift\"\nbackoff_steps = -4\n");
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidBackoff(-4)))
    ));
}

/// Test that empty configuration is valid.
#[test]
fn test_empty_config_is_valid() {
    let config = SystemConfig::default();
    assert!(validate_config(&config).is_ok());
    assert!(parse_config("").is_ok());
}
