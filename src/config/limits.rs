//! Travel limit configuration and types.

use serde::Deserialize;

/// Default upper bound for a freshly constructed bounded axis.
pub const DEFAULT_UPPER_LIMIT: i64 = 10_000;

/// Default lower bound for a freshly constructed bounded axis.
pub const DEFAULT_LOWER_LIMIT: i64 = 0;

/// Policy for moves whose target lies outside the limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum LimitPolicy {
    /// Start the move anyway; it stops on the last step inside the limits.
    #[default]
    Stop,
    /// Clamp the target to the nearest limit before starting.
    Clamp,
}

/// Travel limits in steps, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepLimits {
    /// Minimum allowed position in steps.
    pub lower: i64,

    /// Maximum allowed position in steps.
    pub upper: i64,

    /// What to do with out-of-range move targets.
    #[serde(default)]
    pub policy: LimitPolicy,
}

impl Default for StepLimits {
    fn default() -> Self {
        Self {
            lower: DEFAULT_LOWER_LIMIT,
            upper: DEFAULT_UPPER_LIMIT,
            policy: LimitPolicy::Stop,
        }
    }
}

impl StepLimits {
    /// Create new limits with the default (`Stop`) policy.
    pub fn new(lower: i64, upper: i64) -> Self {
        Self {
            lower,
            upper,
            policy: LimitPolicy::Stop,
        }
    }

    /// Replace the policy.
    pub fn with_policy(mut self, policy: LimitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Check if limits are valid (lower < upper).
    pub fn is_valid(&self) -> bool {
        self.lower < self.upper
    }

    /// Check if a position is within limits.
    pub fn contains(&self, steps: i64) -> bool {
        steps >= self.lower && steps <= self.upper
    }

    /// Whether `next` lies beyond the upper bound.
    #[inline]
    pub fn above(&self, next: i64) -> bool {
        next > self.upper
    }

    /// Whether `next` lies beyond the lower bound.
    #[inline]
    pub fn below(&self, next: i64) -> bool {
        next < self.lower
    }

    /// Apply the limit policy to a move target.
    ///
    /// `Stop` passes the target through untouched; the bound check on each
    /// pulse ends the move at the limit. `Clamp` pulls it inside.
    pub fn apply(&self, target: i64) -> i64 {
        match self.policy {
            LimitPolicy::Stop => target,
            LimitPolicy::Clamp => target.clamp(self.lower, self.upper),
        }
    }
}
