use thiserror::Error;

use crate::Coord;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Coordinates ({row}, {col}) are outside the board")]
    OutOfBounds { row: Coord, col: Coord },
    #[error("Invalid operation: {0}")]
    InvalidOperation(#[from] InvalidMove),
    #[error("Board height and width must be positive")]
    InvalidSize,
    #[error("Too many mines")]
    TooManyMines,
}

/// Moves that are in range but not legal for the current cell state.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum InvalidMove {
    #[error("cannot flag a revealed cell")]
    FlagRevealed,
    #[error("cell is not revealed")]
    NotRevealed,
    #[error("adjacent mines not all flagged ({flagged} of {required})")]
    NotEnoughFlags { flagged: u8, required: u8 },
}

pub type Result<T> = core::result::Result<T, GameError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown difficulty {0:?}, expected beginner, intermediate or expert")]
pub struct ParseDifficultyError(pub(crate) alloc::string::String);
