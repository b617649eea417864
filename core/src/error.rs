use thiserror::Error;

use crate::MatchStatus;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Board dimensions must be positive")]
    InvalidDimensions,
    #[error("Board has {cells} cells, the limit is {limit}")]
    BoardTooLarge { cells: u64, limit: u64 },
    #[error("Match not found")]
    MatchNotFound,
    #[error("Player is not seated in this match")]
    PlayerNotFound,
    #[error("Operation not allowed while the match is {actual}")]
    InvalidState { actual: MatchStatus },
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Cell is already revealed")]
    AlreadyRevealed,
    #[error("Cannot open a cell carrying your own flag")]
    OwnFlag,
    #[error("Cannot change a flag placed by the opponent")]
    OpponentFlag,
    #[error("It is not this player's turn")]
    NotYourTurn,
}

/// Coarse category of a rejection, used by the request surface to pick a response.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidState,
    InvalidMove,
    Forbidden,
}

impl GameError {
    pub const fn kind(self) -> ErrorKind {
        use GameError::*;
        match self {
            MatchNotFound | PlayerNotFound => ErrorKind::NotFound,
            InvalidState { .. } => ErrorKind::InvalidState,
            InvalidDimensions | BoardTooLarge { .. } | InvalidCoords | AlreadyRevealed
            | OwnFlag | OpponentFlag => ErrorKind::InvalidMove,
            NotYourTurn => ErrorKind::Forbidden,
        }
    }
}

pub type Result<T> = core::result::Result<T, GameError>;
