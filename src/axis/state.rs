//! Command mode of an axis.
//!
//! One tagged value replaces the separate running / homing / backing-off /
//! running-to-end / step-index flags, so two commands can never be active at
//! the same time.

/// Progress of an auto-homing command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HomingPhase {
    /// Travelling toward the home switch.
    Seeking,
    /// Switch found and zero latched; travelling off it.
    Backoff,
}

/// The command an axis is executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Not stepping.
    #[default]
    Stopped,
    /// Started without a specific command; runs until a limit stops it.
    Free,
    /// Moving until the relative position reaches `target`.
    StepIndex {
        /// Signed step count of the move.
        target: i64,
    },
    /// Auto-homing against the home switch.
    Homing(HomingPhase),
    /// Running forward from home to find the end switch.
    RunningToEnd,
}

impl Mode {
    /// Whether the axis is stepping.
    #[inline]
    pub fn is_running(self) -> bool {
        !matches!(self, Mode::Stopped)
    }

    /// Whether an auto-homing command is active (either phase).
    #[inline]
    pub fn is_homing(self) -> bool {
        matches!(self, Mode::Homing(_))
    }

    /// Whether auto-homing has found the switch and is backing off.
    #[inline]
    pub fn is_backing_off(self) -> bool {
        matches!(self, Mode::Homing(HomingPhase::Backoff))
    }

    /// Whether a run-to-end calibration is active.
    #[inline]
    pub fn is_running_to_end(self) -> bool {
        matches!(self, Mode::RunningToEnd)
    }

    /// Target of a step-index move, if one is active.
    #[inline]
    pub fn step_target(self) -> Option<i64> {
        match self {
            Mode::StepIndex { target } => Some(target),
            _ => None,
        }
    }

    /// Mode name for display/debugging.
    pub fn name(self) -> &'static str {
        match self {
            Mode::Stopped => "Stopped",
            Mode::Free => "Free",
            Mode::StepIndex { .. } => "StepIndex",
            Mode::Homing(HomingPhase::Seeking) => "Homing",
            Mode::Homing(HomingPhase::Backoff) => "Backoff",
            Mode::RunningToEnd => "RunningToEnd",
        }
    }
}
