use duelsweeper_core::{ErrorKind, GameError};
use thiserror::Error;

/// A request payload that cannot reach the match service as sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("Username must not be empty")]
    EmptyUsername,
    #[error("Username is {length} characters long, the limit is {limit}")]
    UsernameTooLong { length: usize, limit: usize },
    #[error("Player id must not be empty")]
    MissingPlayerId,
    #[error(transparent)]
    Game(#[from] GameError),
}

impl RequestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Game(err) => err.kind(),
            _ => ErrorKind::InvalidMove,
        }
    }
}

pub type Result<T> = std::result::Result<T, RequestError>;
