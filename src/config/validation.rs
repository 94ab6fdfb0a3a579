//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::{AxisConfig, SystemConfig};

/// Minimum step pulse width most drivers accept, in microseconds.
pub const MIN_PULSE_WIDTH_US: u32 = 5;

/// Validate a system configuration.
///
/// Checks:
/// - Speed and acceleration are non-zero
/// - Limits are valid (lower < upper) on bounded axes
/// - Backoff distance is not negative
/// - Step pulse is wide enough for the driver
/// - Default position lies inside the limits
/// - Axis identifiers are unique
pub fn validate_config(config: &SystemConfig) -> Result<()> {
    for (name, axis) in config.axes.iter() {
        validate_axis(name.as_str(), axis)?;
    }

    for (i, (_, axis)) in config.axes.iter().enumerate() {
        if config.axes.values().skip(i + 1).any(|other| other.id == axis.id) {
            return Err(Error::Config(ConfigError::DuplicateAxisId(axis.id)));
        }
    }

    Ok(())
}

/// Validate a single axis configuration.
pub fn validate_axis(_name: &str, config: &AxisConfig) -> Result<()> {
    if config.max_speed.0 == 0 {
        return Err(Error::Config(ConfigError::InvalidMaxSpeed(config.max_speed.0)));
    }

    if config.acceleration.0 == 0 {
        return Err(Error::Config(ConfigError::InvalidAcceleration(
            config.acceleration.0,
        )));
    }

    if config.backoff_steps.0 < 0 {
        return Err(Error::Config(ConfigError::InvalidBackoff(config.backoff_steps.0)));
    }

    if config.pulse_width_us < MIN_PULSE_WIDTH_US {
        return Err(Error::Config(ConfigError::InvalidPulseWidth(config.pulse_width_us)));
    }

    if let Some(limits) = config.effective_limits() {
        if !limits.is_valid() {
            return Err(Error::Config(ConfigError::InvalidLimits {
                lower: limits.lower,
                upper: limits.upper,
            }));
        }

        if !limits.contains(config.default_position.0) {
            return Err(Error::Config(ConfigError::DefaultOutsideLimits {
                position: config.default_position.0,
                lower: limits.lower,
                upper: limits.upper,
            }));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::units::{Steps, StepsPerSec};
    use crate::config::StepLimits;

    #[test]
    fn test_zero_speed_rejected() {
        let mut config = AxisConfig::new("test");
        config.max_speed = StepsPerSec(0);

        let result = validate_axis("test", &config);
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidMaxSpeed(0)))
        ));
    }

    #[test]
    fn test_inverted_limits_rejected() {
        let mut config = AxisConfig::new("test");
        config.limits = StepLimits::new(100, 0);

        assert!(matches!(
            validate_axis("test", &config),
            Err(Error::Config(ConfigError::InvalidLimits { lower: 100, upper: 0 }))
        ));
    }

    #[test]
    fn test_rotary_ignores_limits() {
        let mut config = AxisConfig::new("test");
        config.limits = StepLimits::new(100, 0);
        config.rotary = true;
        config.default_position = Steps(-5000);

        assert!(validate_axis("test", &config).is_ok());
    }

    #[test]
    fn test_narrow_pulse_rejected() {
        let mut config = AxisConfig::new("test");
        config.pulse_width_us = 2;

        assert!(matches!(
            validate_axis("test", &config),
            Err(Error::Config(ConfigError::InvalidPulseWidth(2)))
        ));
    }

    #[test]
    fn test_default_position_outside_limits() {
        let mut config = AxisConfig::new("test");
        config.default_position = Steps(20_000);

        assert!(matches!(
            validate_axis("test", &config),
            Err(Error::Config(ConfigError::DefaultOutsideLimits { .. }))
        ));
    }
}
