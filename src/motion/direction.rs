//! Direction of axis travel.

/// Direction of axis motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Away from the home switch (positive step count).
    #[default]
    Forward,
    /// Toward the home switch (negative step count).
    Reverse,
}

impl Direction {
    /// Get direction from signed step count. Zero counts as reverse.
    #[inline]
    pub fn from_steps(steps: i64) -> Self {
        if steps > 0 {
            Direction::Forward
        } else {
            Direction::Reverse
        }
    }

    /// Get the sign multiplier.
    #[inline]
    pub fn sign(self) -> i64 {
        match self {
            Direction::Forward => 1,
            Direction::Reverse => -1,
        }
    }

    /// The opposite direction.
    #[inline]
    pub fn reversed(self) -> Self {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
        }
    }

    /// Level of the DIR line for this direction.
    #[inline]
    pub fn pin_level(self, inverted: bool) -> bool {
        match self {
            Direction::Forward => !inverted,
            Direction::Reverse => inverted,
        }
    }
}
