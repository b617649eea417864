use crate::*;
pub use fixed::*;
pub use random::*;

mod fixed;
mod random;

/// Strategy for choosing mine positions on a fresh board.
///
/// `mine_count` is already clamped by [`Board::place_mines`]; implementations
/// return how many mines ended up on the board.
pub trait MineGenerator {
    fn place_mines(self, board: &mut Board, mine_count: CellCount) -> CellCount;
}
