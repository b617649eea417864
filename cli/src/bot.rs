use duelsweeper_protocol::{FlagRequest, MatchSnapshot, MoveRequest};
use rand::prelude::*;

/// What a bot wants to do on its turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Reveal(MoveRequest),
    Flag(FlagRequest),
}

/// Plays blind: it never looks at where the mines are, only at what is
/// still closed.
pub struct Bot {
    pub name: String,
    pub player_id: String,
    rng: SmallRng,
}

impl Bot {
    pub fn new(name: impl Into<String>, player_id: impl Into<String>, seed: u64) -> Self {
        Self {
            name: name.into(),
            player_id: player_id.into(),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// `None` once nothing is left to open.
    pub fn choose(&mut self, snapshot: &MatchSnapshot) -> Option<Action> {
        let (own_flags, closed): (Vec<_>, Vec<_>) = snapshot
            .board
            .iter()
            .flatten()
            .filter(|cell| !cell.revealed)
            .partition(|cell| cell.flagged_by_player_id.as_deref() == Some(self.player_id.as_str()));

        let Some(cell) = closed.choose(&mut self.rng) else {
            // only our own flags are left closed, take one back
            return own_flags.first().map(|cell| {
                Action::Flag(FlagRequest {
                    player_id: self.player_id.clone(),
                    row: i32::from(cell.row),
                    col: i32::from(cell.column),
                })
            });
        };
        let (row, col) = (i32::from(cell.row), i32::from(cell.column));

        if cell.flagged_by_player_id.is_none() && closed.len() > 1 && self.rng.random_ratio(1, 10) {
            Some(Action::Flag(FlagRequest {
                player_id: self.player_id.clone(),
                row,
                col,
            }))
        } else {
            Some(Action::Reveal(MoveRequest {
                player_id: self.player_id.clone(),
                row,
                col,
            }))
        }
    }
}
