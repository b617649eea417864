use alloc::collections::VecDeque;
use serde::{Deserialize, Serialize};

use crate::*;

/// What opening a single cell produced.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevealOutcome {
    /// The cell was a mine. Worth nothing, play continues.
    HitMine,
    /// A numbered cell, worth its adjacency count.
    Scored(u8),
    /// A zero cell; `opened` neighbors were revealed for free.
    Cascade { opened: CellCount },
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RevealResult {
    pub outcome: RevealOutcome,
    /// Owner of the opponent flag that was removed by this reveal, if any.
    pub revealed_opponent_flag: Option<Seat>,
    pub cell: Cell,
}

impl RevealResult {
    pub const fn mine_hit(&self) -> bool {
        matches!(self.outcome, RevealOutcome::HitMine)
    }

    pub const fn points_gained(&self) -> u32 {
        match self.outcome {
            RevealOutcome::Scored(points) => points as u32,
            _ => 0,
        }
    }

    pub const fn cascade_triggered(&self) -> bool {
        matches!(self.outcome, RevealOutcome::Cascade { .. })
    }
}

impl Board {
    /// Opens a cell on behalf of `seat`.
    ///
    /// Errors leave the board untouched: out-of-range coordinates, a cell that
    /// is already open, or a cell carrying the mover's own flag. An opponent's
    /// flag is removed and reported so the caller can apply the penalty.
    pub fn reveal(&mut self, seat: Seat, coords: Coord2) -> Result<RevealResult> {
        let coords = self.validate_coords(coords)?;
        let cell = self.cell_mut(coords);

        if cell.is_revealed {
            log::debug!("Cell {:?} already revealed", coords);
            return Err(GameError::AlreadyRevealed);
        }
        if cell.flagged_by == Some(seat) {
            log::debug!("Cell {:?} carries {:?}'s own flag", coords, seat);
            return Err(GameError::OwnFlag);
        }

        let revealed_opponent_flag = cell.flagged_by.take();
        if let Some(owner) = revealed_opponent_flag {
            log::debug!("Revealing {:?}'s flag at {:?}", owner, coords);
        }
        cell.is_revealed = true;
        cell.revealed_by = Some(seat);

        let outcome = if cell.is_mine {
            log::debug!("{:?} hit a mine at {:?}", seat, coords);
            RevealOutcome::HitMine
        } else if cell.adjacent_mines > 0 {
            RevealOutcome::Scored(cell.adjacent_mines)
        } else {
            let opened = self.cascade_from(seat, coords);
            log::debug!("{:?} opened zero cell {:?}, cascade opened {}", seat, coords, opened);
            RevealOutcome::Cascade { opened }
        };

        Ok(RevealResult {
            outcome,
            revealed_opponent_flag,
            cell: self[coords],
        })
    }

    /// Flood-fills from an already opened zero cell.
    ///
    /// Flagged cells stop the fill whoever owns the flag, mines are never opened.
    fn cascade_from(&mut self, seat: Seat, origin: Coord2) -> CellCount {
        let mut opened = 0;
        let mut to_visit = VecDeque::from([origin]);

        while let Some(current) = to_visit.pop_front() {
            for pos in self.iter_neighbors(current) {
                let neighbor = self.cell_mut(pos);
                if neighbor.is_revealed || neighbor.is_mine || neighbor.is_flagged() {
                    continue;
                }

                log::trace!("Cascade reveals {:?}", pos);
                neighbor.is_revealed = true;
                neighbor.revealed_by = Some(seat);
                opened += 1;

                if neighbor.adjacent_mines == 0 {
                    to_visit.push_back(pos);
                }
            }
        }

        opened
    }
}
