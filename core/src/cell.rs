use serde::{Deserialize, Serialize};

/// One of the two fixed positions in a match.
///
/// Seat order is decided at join time and indexes the per-player clocks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Seat {
    First,
    Second,
}

impl Seat {
    pub const fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::First),
            1 => Some(Self::Second),
            _ => None,
        }
    }

    pub const fn other(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub is_mine: bool,
    pub is_revealed: bool,
    pub adjacent_mines: u8,
    pub revealed_by: Option<Seat>,
    pub flagged_by: Option<Seat>,
}

impl Cell {
    pub const fn is_unrevealed_safe(&self) -> bool {
        !self.is_revealed && !self.is_mine
    }

    pub const fn is_flagged(&self) -> bool {
        self.flagged_by.is_some()
    }
}
