//! Unit tests for TOML configuration parsing.

use stepper_axis::config::{LimitPolicy, SystemConfig, TriggerLevel};

/// Test parsing a fully specified axis from TOML.
#[test]
fn test_parse_axis_config() {
    let toml_str = r#"
[axes.ball_return]
name = "Ball Return"
id = 2
max_speed = 2500
acceleration = 15
backoff_steps = 60
disable_on_limit = false
trigger_level = "high"
invert_direction = true
enable_active_high = true
pulse_width_us = 10
settle_delay_ms = 20
jog_steps = 250
jog_steps_small = 25
default_position = 1000

[axes.ball_return.limits]
lower = -200
upper = 4000
policy = "clamp"
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    let axis = config.axis("ball_return").expect("Axis not found");

    assert_eq!(axis.name.as_str(), "Ball Return");
    assert_eq!(axis.id, 2);
    assert_eq!(axis.max_speed.value(), 2500);
    assert_eq!(axis.acceleration.value(), 15);
    assert_eq!(axis.backoff_steps.value(), 60);
    assert!(!axis.disable_on_limit);
    assert_eq!(axis.trigger_level, TriggerLevel::High);
    assert!(axis.invert_direction);
    assert!(axis.enable_active_high);
    assert_eq!(axis.pulse_width_us, 10);
    assert_eq!(axis.settle_delay_ms, 20);
    assert_eq!(axis.jog_steps.value(), 250);
    assert_eq!(axis.jog_steps_small.value(), 25);
    assert_eq!(axis.default_position.value(), 1000);
    assert_eq!(axis.limits.lower, -200);
    assert_eq!(axis.limits.upper, 4000);
    assert_eq!(axis.limits.policy, LimitPolicy::Clamp);
}

/// Test that omitted fields take the controller defaults.
#[test]
fn test_parse_defaults() {
    let toml_str = r#"
[axes.lift]
name = "Lift"
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    let axis = config.axis("lift").unwrap();

    assert_eq!(axis.id, 1);
    assert_eq!(axis.max_speed.value(), 3000);
    assert_eq!(axis.acceleration.value(), 20);
    assert_eq!(axis.backoff_steps.value(), 40);
    assert!(axis.disable_on_limit);
    assert_eq!(axis.trigger_level, TriggerLevel::Low);
    assert_eq!(axis.pulse_width_us, 15);
    assert_eq!(axis.settle_delay_ms, 50);
    assert_eq!(axis.limits.lower, 0);
    assert_eq!(axis.limits.upper, 10_000);
    assert_eq!(axis.limits.policy, LimitPolicy::Stop);
    assert!(!axis.rotary);
}

/// Test several axes keep file order and can be looked up by id.
#[test]
fn test_parse_multiple_axes() {
    let toml_str = r#"
[axes.left]
name = "Left Gate"
id = 1

[axes.right]
name = "Right Gate"
id = 2
rotary = true
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");

    let names: Vec<&str> = config.axis_names().collect();
    assert_eq!(names, ["left", "right"]);
    assert_eq!(config.axis_by_id(2).unwrap().name.as_str(), "Right Gate");
    assert!(config.axis("right").unwrap().effective_limits().is_none());
}

/// Test that an unknown trigger level is rejected.
#[test]
fn test_reject_unknown_trigger_level() {
    let toml_str = r#"
[axes.lift]
name = "Lift"
trigger_level = "sideways"
"#;

    let result: Result<SystemConfig, _> = toml::from_str(toml_str);
    assert!(result.is_err());
}

/// Test that a missing name is rejected.
#[test]
fn test_reject_missing_name() {
    let toml_str = r#"
[axes.lift]
max_speed = 100
"#;

    let result: Result<SystemConfig, _> = toml::from_str(toml_str);
    assert!(result.is_err());
}

/// Test loading from disk.
#[test]
fn test_load_config_from_file() {
    let path = std::env::temp_dir().join("stepper_axis_load_test.toml");
    std::fs::write(&path, "[axes.lift]\nname = \"Lift\"\nmax_speed = 900\n").unwrap();

    let config = stepper_axis::load_config(&path).expect("load failed");
    assert_eq!(config.axis("lift").unwrap().max_speed.value(), 900);

    let _ = std::fs::remove_file(&path);
}

/// Test that a missing file reports an I/O error.
#[test]
fn test_load_config_missing_file() {
    let result = stepper_axis::load_config("/nonexistent/axes.toml");
    assert!(matches!(
        result,
        Err(stepper_axis::Error::Config(stepper_axis::error::ConfigError::IoError(_)))
    ));
}
