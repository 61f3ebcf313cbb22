use thiserror::Error;

/// Errors reported back to a player for requests that cannot be honoured.
///
/// None of these come out of grid generation or selection checks: those
/// degrade to "no match" or a partial placement instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("No level is being played")]
    NoActiveSession,

    #[error("Level {0} does not exist")]
    UnknownLevel(u32),

    #[error("Level {0} is locked")]
    LevelLocked(u32),

    #[error("This level attempt is already over")]
    AttemptFinished,

    #[error("The game is paused")]
    Paused,

    #[error("No hints remaining")]
    NoHintsRemaining,

    #[error("Every hidden word has already been found")]
    NothingToReveal,

    #[error("Grid row {row} has {len} letters, expected {size}")]
    NonSquareGrid { row: usize, len: usize, size: usize },

    #[error("Placement of {0} does not match the grid letters")]
    InconsistentPlacement(String),
}
