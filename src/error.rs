//! Error types for stepper-axis.
//!
//! Motion outcomes (a move refused at a limit switch, a command without the
//! hardware it needs) are reported as state and booleans by the controller.
//! The types here cover configuration problems, invalid parameters and
//! hardware faults.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all stepper-axis operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Pin or driver hardware error
    Motor(MotorError),
    /// Invalid motion parameter
    Motion(MotionError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Axis name not found in configuration
    AxisNotFound(heapless::String<32>),
    /// Two axes share the same event identifier
    DuplicateAxisId(u8),
    /// Max speed must be > 0 steps/s
    InvalidMaxSpeed(u32),
    /// Acceleration must be > 0
    InvalidAcceleration(u32),
    /// Invalid travel limits (lower must be < upper)
    InvalidLimits {
        /// Lower bound in steps
        lower: i64,
        /// Upper bound in steps
        upper: i64,
    },
    /// Backoff distance must not be negative
    InvalidBackoff(i64),
    /// Step pulse narrower than the driver minimum
    InvalidPulseWidth(u32),
    /// Default position lies outside the travel limits
    DefaultOutsideLimits {
        /// Configured default position
        position: i64,
        /// Lower bound in steps
        lower: i64,
        /// Upper bound in steps
        upper: i64,
    },
    /// A required builder component was not provided
    Missing(&'static str),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Pin and driver errors.
#[derive(Debug, Clone, PartialEq)]
pub enum MotorError {
    /// Output pin write failed
    PinError,
    /// Limit switch read failed
    SwitchReadError,
}

/// Invalid motion parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum MotionError {
    /// Max speed of zero steps/s
    ZeroSpeed,
    /// Acceleration of zero (the ramp would never leave rest)
    ZeroAcceleration,
    /// Travel limits with lower >= upper
    InvalidLimits {
        /// Lower bound in steps
        lower: i64,
        /// Upper bound in steps
        upper: i64,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Motor(e) => write!(f, "Motor error: {}", e),
            Error::Motion(e) => write!(f, "Motion error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::AxisNotFound(name) => write!(f, "Axis '{}' not found", name),
            ConfigError::DuplicateAxisId(id) => write!(f, "Duplicate axis id: {}", id),
            ConfigError::InvalidMaxSpeed(v) => write!(f, "Invalid max speed: {}. Must be > 0", v),
            ConfigError::InvalidAcceleration(v) => {
                write!(f, "Invalid acceleration: {}. Must be > 0", v)
            }
            ConfigError::InvalidLimits { lower, upper } => {
                write!(f, "Invalid limits: lower ({}) must be < upper ({})", lower, upper)
            }
            ConfigError::InvalidBackoff(v) => write!(f, "Invalid backoff steps: {}. Must be >= 0", v),
            ConfigError::InvalidPulseWidth(v) => {
                write!(f, "Invalid pulse width: {}us. Must be >= 5us", v)
            }
            ConfigError::DefaultOutsideLimits { position, lower, upper } => write!(
                f,
                "Default position {} outside limits [{}, {}]",
                position, lower, upper
            ),
            ConfigError::Missing(what) => write!(f, "{} is required", what),
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for MotorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotorError::PinError => write!(f, "GPIO pin operation failed"),
            MotorError::SwitchReadError => write!(f, "Limit switch read failed"),
        }
    }
}

impl fmt::Display for MotionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionError::ZeroSpeed => write!(f, "Max speed must be > 0 steps/s"),
            MotionError::ZeroAcceleration => write!(f, "Acceleration must be > 0"),
            MotionError::InvalidLimits { lower, upper } => {
                write!(f, "Invalid limits: lower ({}) must be < upper ({})", lower, upper)
            }
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<MotorError> for Error {
    fn from(e: MotorError) -> Self {
        Error::Motor(e)
    }
}

impl From<MotionError> for Error {
    fn from(e: MotionError) -> Self {
        Error::Motion(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for MotorError {}

#[cfg(feature = "std")]
impl std::error::Error for MotionError {}
