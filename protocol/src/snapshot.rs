use duelsweeper_core::{Cell, Coord, Coord2, Match, MatchStatus, Player, Seat};
use serde::{Deserialize, Serialize};

/// Marker the clients expect in `lastMoveRow`/`lastMoveCol` before any move.
pub const NO_LAST_MOVE: i32 = -1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellSnapshot {
    pub row: Coord,
    pub column: Coord,
    pub mine: bool,
    pub revealed: bool,
    pub adjacent_mines: u8,
    pub revealed_by_player_id: Option<String>,
    pub flagged_by_player_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub id: String,
    pub username: String,
    pub score: u32,
    pub ready: bool,
}

impl From<&Player> for PlayerSnapshot {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id.clone(),
            username: player.username.clone(),
            score: player.score,
            ready: player.ready,
        }
    }
}

/// Full state of one match as clients render it.
///
/// Seats are resolved to player ids, a stopped clock reports a turn start of
/// 0 and a missing last move is reported as [`NO_LAST_MOVE`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSnapshot {
    pub id: String,
    pub rows: Coord,
    pub columns: Coord,
    pub mine_count: u32,
    pub status: MatchStatus,
    pub game_over: bool,
    pub current_turn: Option<String>,
    pub players: Vec<PlayerSnapshot>,
    pub board: Vec<Vec<CellSnapshot>>,
    pub initial_player_time_millis: u64,
    pub player1_time_left_millis: u64,
    pub player2_time_left_millis: u64,
    pub turn_start_time_millis: u64,
    pub last_event_message: String,
    pub last_move_row: i32,
    pub last_move_col: i32,
    pub winner_id: Option<String>,
}

impl MatchSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn player(&self, player_id: &str) -> Option<&PlayerSnapshot> {
        self.players.iter().find(|player| player.id == player_id)
    }

    pub fn cell(&self, (row, col): Coord2) -> Option<&CellSnapshot> {
        self.board.get(row as usize)?.get(col as usize)
    }
}

fn seat_id(game: &Match, seat: Option<Seat>) -> Option<String> {
    seat.and_then(|seat| game.player(seat)).map(|player| player.id.clone())
}

fn cell_snapshot(game: &Match, (row, column): Coord2, cell: &Cell) -> CellSnapshot {
    CellSnapshot {
        row,
        column,
        mine: cell.is_mine,
        revealed: cell.is_revealed,
        adjacent_mines: cell.adjacent_mines,
        revealed_by_player_id: seat_id(game, cell.revealed_by),
        flagged_by_player_id: seat_id(game, cell.flagged_by),
    }
}

impl From<&Match> for MatchSnapshot {
    fn from(game: &Match) -> Self {
        let board = game.board();
        let clock = game.clock();
        let (last_move_row, last_move_col) = game
            .last_move()
            .map_or((NO_LAST_MOVE, NO_LAST_MOVE), |(row, col)| {
                (i32::from(row), i32::from(col))
            });

        Self {
            id: game.id().to_owned(),
            rows: board.rows(),
            columns: board.columns(),
            mine_count: board.mine_count(),
            status: game.status(),
            game_over: game.is_over(),
            current_turn: seat_id(game, game.current_turn()),
            players: game.players().iter().map(PlayerSnapshot::from).collect(),
            board: (0..board.rows())
                .map(|row| {
                    (0..board.columns())
                        .map(|col| cell_snapshot(game, (row, col), &board[(row, col)]))
                        .collect()
                })
                .collect(),
            initial_player_time_millis: clock.initial_millis(),
            player1_time_left_millis: clock.time_left(Seat::First),
            player2_time_left_millis: clock.time_left(Seat::Second),
            turn_start_time_millis: clock.turn_started_at().unwrap_or(0),
            last_event_message: game.last_event_message().to_owned(),
            last_move_row,
            last_move_col,
            winner_id: seat_id(game, game.winner()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duelsweeper_core::{Board, FixedMineGenerator};

    fn game() -> Match {
        let mut board = Board::new((2, 3)).unwrap();
        board.place_mines(FixedMineGenerator::new([(0, 0)]), 1);
        let mut game = Match::with_board("m-1", board, 30_000);
        game.join("p1", "Alice").unwrap();
        game.join("p2", "Bob").unwrap();
        game
    }

    #[test]
    fn fresh_match_uses_sentinels() {
        let snapshot = MatchSnapshot::from(&game());

        assert_eq!(snapshot.status, MatchStatus::WaitingForReady);
        assert_eq!(snapshot.current_turn.as_deref(), Some("p1"));
        assert_eq!(snapshot.turn_start_time_millis, 0);
        assert_eq!((snapshot.last_move_row, snapshot.last_move_col), (-1, -1));
        assert_eq!(snapshot.winner_id, None);
        assert_eq!(snapshot.board.len(), 2);
        assert_eq!(snapshot.board[1].len(), 3);
        assert_eq!(snapshot.cell((1, 2)).map(|cell| (cell.row, cell.column)), Some((1, 2)));
    }

    #[test]
    fn seats_become_player_ids() {
        let mut game = game();
        game.mark_ready("p1", 10).unwrap();
        game.mark_ready("p2", 20).unwrap();
        game.toggle_flag("p2", (0, 0)).unwrap();
        game.make_move("p1", (1, 0), 70).unwrap();

        let snapshot = MatchSnapshot::from(&game);

        let opened = snapshot.cell((1, 0)).unwrap();
        assert!(opened.revealed);
        assert_eq!(opened.adjacent_mines, 1);
        assert_eq!(opened.revealed_by_player_id.as_deref(), Some("p1"));
        assert_eq!(snapshot.cell((0, 0)).unwrap().flagged_by_player_id.as_deref(), Some("p2"));
        assert_eq!(snapshot.current_turn.as_deref(), Some("p2"));
        assert_eq!(snapshot.turn_start_time_millis, 70);
        assert_eq!(snapshot.player1_time_left_millis, 29_950);
        assert_eq!(snapshot.player("p1").map(|p| p.score), Some(1));
        assert_eq!((snapshot.last_move_row, snapshot.last_move_col), (1, 0));
    }

    #[test]
    fn json_field_names() {
        let json: serde_json::Value = serde_json::from_str(&MatchSnapshot::from(&game()).to_json().unwrap()).unwrap();

        for key in [
            "id",
            "rows",
            "columns",
            "mineCount",
            "status",
            "gameOver",
            "currentTurn",
            "players",
            "board",
            "initialPlayerTimeMillis",
            "player1TimeLeftMillis",
            "player2TimeLeftMillis",
            "turnStartTimeMillis",
            "lastEventMessage",
            "lastMoveRow",
            "lastMoveCol",
            "winnerId",
        ] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(json["status"], "WAITING_FOR_READY");
        assert_eq!(json["initialPlayerTimeMillis"], 30_000);
        let cell = &json["board"][0][0];
        assert_eq!(cell["mine"], true);
        assert_eq!(cell["revealed"], false);
        assert_eq!(cell["adjacentMines"], 0);
        assert!(cell["revealedByPlayerId"].is_null());
        assert_eq!(json["players"][1]["username"], "Bob");
        assert_eq!(json["players"][1]["ready"], false);
    }
}
