//! Error types for the game world model.

use std::fmt;

/// Errors signaled by grid, visibility, and game operations.
///
/// Every failure leaves the grid and game untouched; the caller may retry
/// with corrected input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// A grid or game could not be created.
    Construction {
        /// Why construction failed.
        reason: String,
    },
    /// A map index outside `[0, len)`.
    OutOfRange {
        /// The rejected position.
        pos: usize,
        /// Length of the map.
        len: usize,
    },
    /// A player with this name is already registered.
    DuplicateName(String),
    /// All player identifiers are taken.
    GameFull {
        /// Maximum number of non-spectator players.
        max: usize,
    },
    /// An argument was rejected without mutating anything.
    InvalidArgument {
        /// Description of the problem.
        reason: String,
    },
    /// The game is over; only summaries and teardown are allowed.
    GameOver,
}

impl GameError {
    /// Build a construction failure.
    pub(crate) fn construction(reason: impl Into<String>) -> Self {
        Self::Construction {
            reason: reason.into(),
        }
    }

    /// Build an invalid-argument failure.
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::Construction { reason } => write!(f, "could not create: {reason}"),
            GameError::OutOfRange { pos, len } => {
                write!(f, "position {pos} out of range for map of length {len}")
            }
            GameError::DuplicateName(name) => write!(f, "player name already taken: {name}"),
            GameError::GameFull { max } => write!(f, "game is full ({max} players)"),
            GameError::InvalidArgument { reason } => write!(f, "invalid argument: {reason}"),
            GameError::GameOver => write!(f, "game is over"),
        }
    }
}

impl std::error::Error for GameError {}

/// Result type for game operations.
pub type GameResult<T> = Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_out_of_range() {
        let err = GameError::OutOfRange { pos: 12, len: 10 };
        assert_eq!(err.to_string(), "position 12 out of range for map of length 10");
    }
}
