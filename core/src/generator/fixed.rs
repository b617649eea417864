use alloc::vec::Vec;

use super::*;

/// Places mines at known coordinates, for replays and scripted setups.
///
/// Coordinates beyond the requested count are dropped; duplicates and
/// out-of-range entries do not count.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedMineGenerator {
    mines: Vec<Coord2>,
}

impl FixedMineGenerator {
    pub fn new(mines: impl Into<Vec<Coord2>>) -> Self {
        Self {
            mines: mines.into(),
        }
    }
}

impl MineGenerator for FixedMineGenerator {
    fn place_mines(self, board: &mut Board, mine_count: CellCount) -> CellCount {
        let mut mines: Vec<Coord2> = self
            .mines
            .into_iter()
            .filter(|&coords| board.validate_coords(coords).is_ok())
            .collect();
        mines.sort_unstable();
        mines.dedup();
        mines.truncate(mine_count as usize);
        board.set_mines(mines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn respects_clamped_count() {
        let mut board = Board::new((2, 2)).unwrap();
        let generator = FixedMineGenerator::new([(0, 0), (0, 1), (1, 0), (1, 1)]);
        assert_eq!(board.place_mines(generator, 4), 3);
        assert!(!board[(1, 1)].is_mine);
    }
}
