//! Rules of two-player competitive Minesweeper: the shared board, the match
//! lifecycle and the per-player turn clocks.
//!
//! Everything here is synchronous and takes the current time as an argument;
//! locking, storage and wall clocks belong to the caller.

#![no_std]

extern crate alloc;

use serde::{Deserialize, Serialize};

pub use board::*;
pub use cell::*;
pub use clock::*;
pub use difficulty::*;
pub use engine::*;
pub use error::*;
pub use game::*;
pub use generator::*;
pub use types::*;

mod board;
mod cell;
mod clock;
mod difficulty;
mod engine;
mod error;
mod game;
mod generator;
mod types;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub size: Coord2,
    pub mines: CellCount,
}

impl BoardConfig {
    pub const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    /// Validates the dimensions. The mine count is clamped later, when the
    /// mines are actually placed.
    pub fn new((rows, columns): Coord2, mines: CellCount) -> Result<Self> {
        if rows == 0 || columns == 0 {
            return Err(GameError::InvalidDimensions);
        }
        Ok(Self::new_unchecked((rows, columns), mines))
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }
}
