use duelsweeper_core::{BoardConfig, CellCount, Coord, Coord2, Difficulty, GameError};
use serde::{Deserialize, Serialize};

use crate::{RequestError, Result};

pub const MAX_USERNAME_CHARS: usize = 32;

fn to_coord(value: i32) -> Option<Coord> {
    Coord::try_from(value).ok()
}

/// Negative or oversized coordinates can never be on a board.
fn to_coords(row: i32, col: i32) -> Result<Coord2> {
    match (to_coord(row), to_coord(col)) {
        (Some(row), Some(col)) => Ok((row, col)),
        _ => Err(GameError::InvalidCoords.into()),
    }
}

fn check_player_id(player_id: &str) -> Result<&str> {
    if player_id.trim().is_empty() {
        Err(RequestError::MissingPlayerId)
    } else {
        Ok(player_id)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatchRequest {
    pub rows: i32,
    pub columns: i32,
    pub mine_count: i32,
}

impl CreateMatchRequest {
    /// A negative mine count asks for a mine-free board.
    pub fn board_config(&self) -> Result<BoardConfig> {
        let (Some(rows), Some(columns)) = (to_coord(self.rows), to_coord(self.columns)) else {
            return Err(GameError::InvalidDimensions.into());
        };
        let mines = CellCount::try_from(self.mine_count).unwrap_or(0);
        Ok(BoardConfig::new((rows, columns), mines)?)
    }
}

impl From<Difficulty> for CreateMatchRequest {
    fn from(difficulty: Difficulty) -> Self {
        let BoardConfig {
            size: (rows, columns),
            mines,
        } = difficulty.board_config();
        Self {
            rows: i32::from(rows),
            columns: i32::from(columns),
            mine_count: mines as i32,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinMatchRequest {
    pub username: String,
}

impl JoinMatchRequest {
    /// The trimmed username.
    pub fn username(&self) -> Result<&str> {
        let username = self.username.trim();
        let length = username.chars().count();
        if length == 0 {
            Err(RequestError::EmptyUsername)
        } else if length > MAX_USERNAME_CHARS {
            Err(RequestError::UsernameTooLong {
                length,
                limit: MAX_USERNAME_CHARS,
            })
        } else {
            Ok(username)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub player_id: String,
    pub row: i32,
    pub col: i32,
}

impl MoveRequest {
    pub fn player_id(&self) -> Result<&str> {
        check_player_id(&self.player_id)
    }

    pub fn coords(&self) -> Result<Coord2> {
        to_coords(self.row, self.col)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagRequest {
    pub player_id: String,
    pub row: i32,
    pub col: i32,
}

impl FlagRequest {
    pub fn player_id(&self) -> Result<&str> {
        check_player_id(&self.player_id)
    }

    pub fn coords(&self) -> Result<Coord2> {
        to_coords(self.row, self.col)
    }
}

/// Body of the ready and leave requests.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerIdRequest {
    pub player_id: String,
}

impl PlayerIdRequest {
    pub fn player_id(&self) -> Result<&str> {
        check_player_id(&self.player_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duelsweeper_core::ErrorKind;

    #[test]
    fn create_request_from_json() {
        let request: CreateMatchRequest =
            serde_json::from_str(r#"{"rows": 8, "columns": 8, "mineCount": 10}"#).unwrap();

        assert_eq!(request, CreateMatchRequest::from(Difficulty::Beginner));
        assert_eq!(request.board_config(), Ok(Difficulty::Beginner.board_config()));
    }

    #[test]
    fn create_request_rejects_bad_dimensions() {
        for (rows, columns) in [(0, 8), (8, -1), (70_000, 8)] {
            let request = CreateMatchRequest {
                rows,
                columns,
                mine_count: 3,
            };
            assert_eq!(
                request.board_config(),
                Err(RequestError::Game(GameError::InvalidDimensions))
            );
        }
        let request = CreateMatchRequest {
            rows: 4,
            columns: 4,
            mine_count: -5,
        };
        assert_eq!(request.board_config().map(|config| config.mines), Ok(0));
    }

    #[test]
    fn username_is_trimmed_and_bounded() {
        let request = |username: &str| JoinMatchRequest {
            username: username.to_owned(),
        };

        assert_eq!(request("  Alice ").username(), Ok("Alice"));
        assert_eq!(request("   ").username(), Err(RequestError::EmptyUsername));
        assert_eq!(request("x".repeat(32).as_str()).username().map(str::len), Ok(32));
        assert_eq!(
            request("x".repeat(33).as_str()).username(),
            Err(RequestError::UsernameTooLong {
                length: 33,
                limit: 32
            })
        );
    }

    #[test]
    fn move_request_coords() {
        let request: MoveRequest =
            serde_json::from_str(r#"{"playerId": "p1", "row": 2, "col": 5}"#).unwrap();
        assert_eq!(request.player_id(), Ok("p1"));
        assert_eq!(request.coords(), Ok((2, 5)));

        let request = FlagRequest {
            player_id: String::new(),
            row: -1,
            col: 0,
        };
        assert_eq!(request.player_id(), Err(RequestError::MissingPlayerId));
        let err = request.coords().unwrap_err();
        assert_eq!(err, RequestError::Game(GameError::InvalidCoords));
        assert_eq!(err.kind(), ErrorKind::InvalidMove);
    }
}
