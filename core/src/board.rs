use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Rectangular minefield shared by both players of a match.
///
/// Cells live in one contiguous `[row, col]` array; all mutation goes through
/// the owning [`Match`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    cells: Array2<Cell>,
    mine_count: CellCount,
}

impl Board {
    /// Builds an unrevealed, mine-free board.
    pub fn new((rows, columns): Coord2) -> Result<Self> {
        if rows == 0 || columns == 0 {
            return Err(GameError::InvalidDimensions);
        }
        log::debug!("Initializing {}x{} board", rows, columns);
        Ok(Self {
            cells: Array2::default((rows, columns).to_nd_index()),
            mine_count: 0,
        })
    }

    pub fn size(&self) -> Coord2 {
        let (rows, columns) = self.cells.dim();
        (
            Coord::try_from(rows).unwrap_or(Coord::MAX),
            Coord::try_from(columns).unwrap_or(Coord::MAX),
        )
    }

    pub fn rows(&self) -> Coord {
        self.size().0
    }

    pub fn columns(&self) -> Coord {
        self.size().1
    }

    pub fn total_cells(&self) -> CellCount {
        let (rows, columns) = self.size();
        mult(rows, columns)
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells().saturating_sub(self.mine_count)
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let (rows, columns) = self.size();
        if coords.0 < rows && coords.1 < columns {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn cell(&self, coords: Coord2) -> Option<&Cell> {
        self.validate_coords(coords)
            .ok()
            .map(|coords| &self.cells[coords.to_nd_index()])
    }

    /// Cells in row-major order together with their coordinates.
    pub fn iter_cells(&self) -> impl Iterator<Item = (Coord2, &Cell)> + '_ {
        self.cells
            .indexed_iter()
            .map(|((row, col), cell)| ((row as Coord, col as Coord), cell))
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        self.cells.iter_neighbors(coords)
    }

    /// Largest mine count that still leaves one safe cell.
    pub fn clamp_mine_count(&self, requested: CellCount) -> CellCount {
        let limit = self.total_cells().saturating_sub(1);
        if requested > limit {
            log::warn!(
                "Mine count ({}) does not leave a safe cell on {} cells, placing {} instead",
                requested,
                self.total_cells(),
                limit
            );
            limit
        } else {
            requested
        }
    }

    /// Places mines with `generator` and returns how many were placed.
    pub fn place_mines<G: MineGenerator>(&mut self, generator: G, mine_count: CellCount) -> CellCount {
        let mine_count = self.clamp_mine_count(mine_count);
        log::debug!(
            "Placing {} mines on {}x{} board",
            mine_count,
            self.rows(),
            self.columns()
        );
        generator.place_mines(self, mine_count)
    }

    /// Marks the given cells as mines and recomputes every adjacency count.
    ///
    /// Duplicate and out-of-range coordinates are ignored, so the stored mine
    /// count always matches the board.
    pub(crate) fn set_mines(&mut self, mines: impl IntoIterator<Item = Coord2>) -> CellCount {
        for coords in mines {
            if self.validate_coords(coords).is_ok() {
                self.cells[coords.to_nd_index()].is_mine = true;
            }
        }

        let (rows, columns) = self.size();
        for row in 0..rows {
            for col in 0..columns {
                let coords = (row, col);
                let count = if self.cells[coords.to_nd_index()].is_mine {
                    0
                } else {
                    self.iter_neighbors(coords)
                        .filter(|&pos| self.cells[pos.to_nd_index()].is_mine)
                        .count() as u8
                };
                self.cells[coords.to_nd_index()].adjacent_mines = count;
            }
        }

        self.mine_count = self.cells.iter().filter(|cell| cell.is_mine).count() as CellCount;
        self.mine_count
    }

    /// Sets or clears `seat`'s flag; false when the cell is out of range,
    /// revealed, or carries the opponent's flag.
    pub fn toggle_flag(&mut self, seat: Seat, coords: Coord2) -> bool {
        let Ok(coords) = self.validate_coords(coords) else {
            return false;
        };
        let cell = &mut self.cells[coords.to_nd_index()];
        if cell.is_revealed {
            return false;
        }

        match cell.flagged_by {
            None => {
                cell.flagged_by = Some(seat);
                true
            }
            Some(owner) if owner == seat => {
                cell.flagged_by = None;
                true
            }
            Some(_) => false,
        }
    }

    pub fn revealed_safe_count(&self) -> CellCount {
        self.cells
            .iter()
            .filter(|cell| cell.is_revealed && !cell.is_mine)
            .count() as CellCount
    }

    /// Whether every safe cell has been revealed.
    pub fn is_cleared(&self) -> bool {
        if self.cells.is_empty() {
            return false;
        }
        let Some(total_safe) = self.total_cells().checked_sub(self.mine_count) else {
            log::error!(
                "Mine count ({}) exceeds cell count ({})",
                self.mine_count,
                self.total_cells()
            );
            return false;
        };
        if self.cells.iter().any(Cell::is_unrevealed_safe) {
            return false;
        }
        let revealed_safe = self.revealed_safe_count();
        log::trace!(
            "Cleared check: {} of {} safe cells revealed",
            revealed_safe,
            total_safe
        );
        revealed_safe >= total_safe
    }

    /// Points still lying on the board: the adjacency counts of unrevealed safe cells.
    pub fn remaining_points(&self) -> u32 {
        let points = self
            .cells
            .iter()
            .filter(|cell| cell.is_unrevealed_safe())
            .map(|cell| u32::from(cell.adjacent_mines))
            .sum();
        log::debug!("Remaining points on board: {}", points);
        points
    }

    pub(crate) fn cell_mut(&mut self, coords: Coord2) -> &mut Cell {
        &mut self.cells[coords.to_nd_index()]
    }
}

impl Index<Coord2> for Board {
    type Output = Cell;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cells[coords.to_nd_index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(size: Coord2, mines: &[Coord2]) -> Board {
        let mut board = Board::new(size).unwrap();
        board.set_mines(mines.iter().copied());
        board
    }

    #[test]
    fn rejects_empty_dimensions() {
        assert_eq!(Board::new((0, 4)), Err(GameError::InvalidDimensions));
        assert_eq!(Board::new((4, 0)), Err(GameError::InvalidDimensions));
    }

    #[test]
    fn adjacency_counts_skip_mines() {
        let board = board((3, 3), &[(0, 0), (0, 1)]);

        assert_eq!(board[(0, 0)].adjacent_mines, 0);
        assert_eq!(board[(0, 1)].adjacent_mines, 0);
        assert_eq!(board[(1, 0)].adjacent_mines, 2);
        assert_eq!(board[(1, 2)].adjacent_mines, 1);
        assert_eq!(board[(2, 2)].adjacent_mines, 0);
        assert_eq!(board.mine_count(), 2);
    }

    #[test]
    fn duplicate_and_out_of_range_mines_are_ignored() {
        let board = board((2, 2), &[(0, 0), (0, 0), (5, 5)]);
        assert_eq!(board.mine_count(), 1);
    }

    #[test]
    fn clamps_mine_count_to_leave_a_safe_cell() {
        let board = Board::new((2, 3)).unwrap();
        assert_eq!(board.clamp_mine_count(10), 5);
        assert_eq!(board.clamp_mine_count(2), 2);
    }

    #[test]
    fn flag_toggle_respects_owner() {
        let mut board = board((2, 2), &[(1, 1)]);

        assert!(board.toggle_flag(Seat::First, (0, 0)));
        assert_eq!(board[(0, 0)].flagged_by, Some(Seat::First));
        assert!(!board.toggle_flag(Seat::Second, (0, 0)));
        assert!(board.toggle_flag(Seat::First, (0, 0)));
        assert_eq!(board[(0, 0)].flagged_by, None);
        assert!(!board.toggle_flag(Seat::First, (2, 0)));
    }

    #[test]
    fn cleared_only_when_all_safe_cells_revealed() {
        let mut board = board((1, 3), &[(0, 0)]);
        assert!(!board.is_cleared());

        board.cell_mut((0, 1)).is_revealed = true;
        assert!(!board.is_cleared());

        board.cell_mut((0, 2)).is_revealed = true;
        assert!(board.is_cleared());
    }

    #[test]
    fn remaining_points_sum_hidden_safe_counts() {
        let mut board = board((1, 4), &[(0, 0), (0, 3)]);
        assert_eq!(board.remaining_points(), 2);

        board.cell_mut((0, 1)).is_revealed = true;
        assert_eq!(board.remaining_points(), 1);
    }

    #[test]
    fn iter_cells_is_row_major() {
        let board = board((2, 2), &[]);
        let coords: alloc::vec::Vec<_> = board.iter_cells().map(|(coords, _)| coords).collect();
        assert_eq!(coords, [(0, 0), (0, 1), (1, 0), (1, 1)]);
    }
}
