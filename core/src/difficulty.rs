use serde::{Deserialize, Serialize};

use crate::*;

/// Per-player clock for board setups outside the preset table.
pub const DEFAULT_TURN_TIME_MILLIS: u64 = 90 * 1000;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Self::Beginner,
        Self::Intermediate,
        Self::Advanced,
        Self::Expert,
    ];

    pub const fn board_config(self) -> BoardConfig {
        use Difficulty::*;
        match self {
            Beginner => BoardConfig::new_unchecked((8, 8), 10),
            Intermediate => BoardConfig::new_unchecked((16, 16), 40),
            Advanced => BoardConfig::new_unchecked((16, 20), 60),
            Expert => BoardConfig::new_unchecked((20, 24), 99),
        }
    }

    pub const fn initial_time_millis(self) -> u64 {
        use Difficulty::*;
        match self {
            Beginner => 30 * 1000,
            Intermediate => 90 * 1000,
            Advanced => 105 * 1000,
            Expert => 150 * 1000,
        }
    }

    pub fn from_board_config(config: BoardConfig) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|difficulty| difficulty.board_config() == config)
    }
}

/// Clock seed for a board setup, falling back to [`DEFAULT_TURN_TIME_MILLIS`].
pub fn initial_time_for(config: BoardConfig) -> u64 {
    match Difficulty::from_board_config(config) {
        Some(difficulty) => difficulty.initial_time_millis(),
        None => {
            log::warn!(
                "Unknown or custom difficulty ({}x{}, {} mines), defaulting to {} ms",
                config.size.0,
                config.size.1,
                config.mines,
                DEFAULT_TURN_TIME_MILLIS
            );
            DEFAULT_TURN_TIME_MILLIS
        }
    }
}
