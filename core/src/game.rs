use alloc::format;
use alloc::string::{String, ToString};
use core::fmt;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Valid transitions:
/// - WaitingForPlayers -> WaitingForReady (second player joins)
/// - WaitingForReady -> InProgress (both players ready)
/// - any -> GameOver (board cleared, timeout, disconnect)
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    #[default]
    WaitingForPlayers,
    WaitingForReady,
    InProgress,
    GameOver,
}

impl MatchStatus {
    pub const fn is_final(self) -> bool {
        matches!(self, Self::GameOver)
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::WaitingForPlayers => "WAITING_FOR_PLAYERS",
            Self::WaitingForReady => "WAITING_FOR_READY",
            Self::InProgress => "IN_PROGRESS",
            Self::GameOver => "GAME_OVER",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub username: String,
    pub score: u32,
    pub ready: bool,
}

impl Player {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            score: 0,
            ready: false,
        }
    }

    pub fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    /// Subtracts up to `points`, never going below zero. Returns what was actually lost.
    pub fn deduct_score(&mut self, points: u32) -> u32 {
        let lost = points.min(self.score);
        self.score -= lost;
        lost
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishReason {
    BoardCleared,
    Timeout { timed_out: Seat, awarded: u32 },
    Forfeit { left: Seat },
    Abandoned,
}

/// A terminal transition that actually happened.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finish {
    pub reason: FinishReason,
    /// `None` is a draw, or an abandoned match.
    pub winner: Option<Seat>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReadyOutcome {
    /// Player was already ready, nothing changed.
    NoChange,
    Ready,
    Started,
}

impl ReadyOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlagOutcome {
    Placed,
    Removed,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DisconnectOutcome {
    /// Match was already over.
    NoChange,
    Finished(Finish),
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MoveReport {
    pub seat: Seat,
    pub reveal: RevealResult,
    pub charged_millis: u64,
    /// Points the flag owner actually lost (0 or 1).
    pub penalty: u32,
    pub finish: Option<Finish>,
}

/// A two-player match: board, seats, clocks and lifecycle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Match {
    id: String,
    board: Board,
    players: SmallVec<[Player; 2]>,
    status: MatchStatus,
    current_turn: Option<Seat>,
    clock: TurnClock,
    last_event_message: String,
    last_move: Option<Coord2>,
    winner: Option<Seat>,
    finished_at_millis: Option<u64>,
}

impl Match {
    /// Builds a mined board and seeds both clocks from the difficulty table.
    pub fn create<G: MineGenerator>(
        id: impl Into<String>,
        config: BoardConfig,
        generator: G,
    ) -> Result<Self> {
        let mut board = Board::new(config.size)?;
        board.place_mines(generator, config.mines);
        Ok(Self::with_board(id, board, initial_time_for(config)))
    }

    pub fn with_board(id: impl Into<String>, board: Board, initial_time_millis: u64) -> Self {
        Self {
            id: id.into(),
            board,
            players: SmallVec::new(),
            status: MatchStatus::default(),
            current_turn: None,
            clock: TurnClock::new(initial_time_millis),
            last_event_message: "Match created, waiting for an opponent.".to_string(),
            last_move: None,
            winner: None,
            finished_at_millis: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, seat: Seat) -> Option<&Player> {
        self.players.get(seat.index())
    }

    pub fn seat_of(&self, player_id: &str) -> Option<Seat> {
        self.players
            .iter()
            .position(|player| player.id == player_id)
            .and_then(Seat::from_index)
    }

    pub fn status(&self) -> MatchStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status.is_final()
    }

    pub fn current_turn(&self) -> Option<Seat> {
        self.current_turn
    }

    pub fn current_turn_player(&self) -> Option<&Player> {
        self.current_turn.and_then(|seat| self.player(seat))
    }

    pub fn clock(&self) -> &TurnClock {
        &self.clock
    }

    pub fn last_event_message(&self) -> &str {
        &self.last_event_message
    }

    pub fn last_move(&self) -> Option<Coord2> {
        self.last_move
    }

    pub fn winner(&self) -> Option<Seat> {
        self.winner
    }

    pub fn winner_player(&self) -> Option<&Player> {
        self.winner.and_then(|seat| self.player(seat))
    }

    pub fn finished_at_millis(&self) -> Option<u64> {
        self.finished_at_millis
    }

    /// Whether the background sweep has anything to watch.
    pub fn has_running_clock(&self) -> bool {
        self.status == MatchStatus::InProgress && self.clock.is_running()
    }

    pub fn projected_time_left(&self, seat: Seat, now: u64) -> u64 {
        if self.current_turn == Some(seat) {
            self.clock.projected_time_left(seat, now)
        } else {
            self.clock.time_left(seat)
        }
    }

    pub fn join(&mut self, player_id: impl Into<String>, username: impl Into<String>) -> Result<Seat> {
        self.check_status(MatchStatus::WaitingForPlayers)?;
        // the second join leaves WaitingForPlayers, so at most one seat is taken here
        let seat = if self.players.is_empty() {
            Seat::First
        } else {
            Seat::Second
        };

        let player = Player::new(player_id, username);
        match seat {
            Seat::First => {
                self.current_turn = Some(Seat::First);
                self.last_event_message =
                    format!("{} created the match, waiting for an opponent.", player.username);
            }
            Seat::Second => {
                self.status = MatchStatus::WaitingForReady;
                self.last_event_message = format!(
                    "{} joined the match. Waiting for both players to be ready.",
                    player.username
                );
            }
        }
        log::info!("Player {} took seat {:?} in match {}", player.username, seat, self.id);
        self.players.push(player);
        Ok(seat)
    }

    pub fn mark_ready(&mut self, player_id: &str, now: u64) -> Result<ReadyOutcome> {
        self.check_status(MatchStatus::WaitingForReady)?;
        let seat = self.seat_of(player_id).ok_or(GameError::PlayerNotFound)?;
        let player = &mut self.players[seat.index()];

        if player.ready {
            log::warn!("Player {} was already ready in match {}", player.username, self.id);
            return Ok(ReadyOutcome::NoChange);
        }
        player.ready = true;
        self.last_event_message = format!("{} is ready.", player.username);
        log::info!("Player {} marked ready in match {}", player.username, self.id);

        if self.players.len() == 2 && self.players.iter().all(|player| player.ready) {
            self.start(now);
            Ok(ReadyOutcome::Started)
        } else {
            Ok(ReadyOutcome::Ready)
        }
    }

    fn start(&mut self, now: u64) {
        self.status = MatchStatus::InProgress;
        self.current_turn = Some(Seat::First);
        self.clock.start(now);
        let first = &self.players[Seat::First.index()].username;
        self.last_event_message =
            format!("All players are ready. The match has started! Turn: {}", first);
        log::info!("Match {} started, first turn: {}", self.id, first);
    }

    /// Opens a cell for the player whose turn it is, then charges the clock and
    /// either finishes the match or passes the turn.
    pub fn make_move(&mut self, player_id: &str, coords: Coord2, now: u64) -> Result<MoveReport> {
        self.check_status(MatchStatus::InProgress)?;
        let seat = self.seat_of(player_id).ok_or(GameError::PlayerNotFound)?;
        if self.current_turn != Some(seat) {
            log::warn!("Not {}'s turn in match {}", player_id, self.id);
            return Err(GameError::NotYourTurn);
        }

        let reveal = self.board.reveal(seat, coords)?;
        let charged_millis = self.clock.charge(seat, now);

        let mut penalty = 0;
        let mut penalty_message = String::new();
        if let Some(owner) = reveal.revealed_opponent_flag {
            let opponent = &mut self.players[owner.index()];
            penalty = opponent.deduct_score(1);
            penalty_message = if penalty > 0 {
                format!(" Opponent ({}) lost {} point for a wrong flag.", opponent.username, penalty)
            } else {
                format!(
                    " Opponent ({}) had a wrong flag opened (score was already 0).",
                    opponent.username
                )
            };
        }

        let mover = &mut self.players[seat.index()];
        let mut message = match reveal.outcome {
            RevealOutcome::HitMine => {
                log::info!("Player {} hit a mine in match {}", mover.username, self.id);
                format!("{} stepped on a mine! (0 points)", mover.username)
            }
            RevealOutcome::Scored(points) => {
                mover.add_score(u32::from(points));
                format!("{} opened a cell worth {} points.", mover.username, points)
            }
            RevealOutcome::Cascade { .. } => format!("{} opened a safe area.", mover.username),
        };
        message.push_str(&penalty_message);
        self.last_event_message = message;
        self.last_move = Some(coords);

        let finish = if self.board.is_cleared() {
            self.finish_cleared(now)
        } else if let Some(timed_out) = self.clock.timed_out_seat() {
            self.finish_timeout(timed_out, now)
        } else {
            self.pass_turn(now);
            None
        };

        Ok(MoveReport {
            seat,
            reveal,
            charged_millis,
            penalty,
            finish,
        })
    }

    fn pass_turn(&mut self, now: u64) {
        if self.players.len() == 2 {
            self.current_turn = self.current_turn.map(Seat::other);
        }
        self.clock.start(now);
    }

    /// Flags are free actions: no turn check, no clock.
    pub fn toggle_flag(&mut self, player_id: &str, coords: Coord2) -> Result<FlagOutcome> {
        self.check_status(MatchStatus::InProgress)?;
        let seat = self.seat_of(player_id).ok_or(GameError::PlayerNotFound)?;
        let coords = self.board.validate_coords(coords)?;

        let cell = self.board[coords];
        if cell.is_revealed {
            return Err(GameError::AlreadyRevealed);
        }
        if cell.flagged_by.is_some_and(|owner| owner != seat) {
            return Err(GameError::OpponentFlag);
        }
        let toggled = self.board.toggle_flag(seat, coords);
        debug_assert!(toggled);

        log::debug!("{:?} toggled flag at {:?} in match {}", seat, coords, self.id);
        Ok(if self.board[coords].flagged_by.is_some() {
            FlagOutcome::Placed
        } else {
            FlagOutcome::Removed
        })
    }

    /// Treats the leaving player as forfeiting.
    pub fn handle_disconnect(&mut self, player_id: &str, now: u64) -> Result<DisconnectOutcome> {
        if self.is_over() {
            return Ok(DisconnectOutcome::NoChange);
        }
        let seat = self.seat_of(player_id).ok_or(GameError::PlayerNotFound)?;
        let leaver = self.players[seat.index()].username.clone();

        let remaining = self.player(seat.other()).map(|player| player.username.clone());
        let finish = match remaining {
            Some(remaining) => self.finalize(
                FinishReason::Forfeit { left: seat },
                Some(seat.other()),
                format!("{} disconnected. Winner: {}", leaver, remaining),
                now,
            ),
            None => self.finalize(
                FinishReason::Abandoned,
                None,
                format!("{} disconnected. Match over.", leaver),
                now,
            ),
        };
        Ok(finish.map_or(DisconnectOutcome::NoChange, DisconnectOutcome::Finished))
    }

    /// Background check: finishes the match if the running turn's projected
    /// time has run out. Leaves stored clocks untouched otherwise.
    pub fn check_timeout(&mut self, now: u64) -> Option<Finish> {
        if !self.has_running_clock() {
            return None;
        }
        let seat = self.current_turn?;
        if self.clock.projected_time_left(seat, now) > 0 {
            return None;
        }
        self.clock.expire(seat);
        self.finish_timeout(seat, now)
    }

    fn finish_cleared(&mut self, now: u64) -> Option<Finish> {
        let (winner, message) = match self.players.len() {
            2 => match self.leader() {
                Some(seat) => (
                    Some(seat),
                    format!("All safe cells are open! Winner: {}", self.players[seat.index()].username),
                ),
                None => (None, "All safe cells are open! The match ended in a draw.".to_string()),
            },
            1 => (Some(Seat::First), "All safe cells are open! You win!".to_string()),
            _ => (None, "All safe cells are open! Match over.".to_string()),
        };
        self.finalize(FinishReason::BoardCleared, winner, message, now)
    }

    fn finish_timeout(&mut self, timed_out: Seat, now: u64) -> Option<Finish> {
        if self.is_over() {
            return None;
        }

        let awarded = self.board.remaining_points();
        let timed_out_name = self
            .player(timed_out)
            .map_or_else(|| "Player".to_string(), |player| player.username.clone());
        let Some(remaining) = self.players.get_mut(timed_out.other().index()) else {
            log::warn!("No remaining player in match {} to receive timeout points", self.id);
            return self.finalize(
                FinishReason::Timeout { timed_out, awarded: 0 },
                None,
                format!("{}'s time ran out! Match over.", timed_out_name),
                now,
            );
        };
        log::info!("Adding {} remaining points to player {}", awarded, remaining.username);
        remaining.add_score(awarded);
        let remaining_name = remaining.username.clone();

        let winner = self.leader();
        let message = match winner {
            Some(seat) if seat == timed_out => format!(
                "{}'s time ran out! But {} still wins on score. Winner: {}",
                timed_out_name, timed_out_name, timed_out_name
            ),
            Some(_) => format!(
                "{}'s time ran out! Remaining points ({}) went to {}. Winner: {}",
                timed_out_name, awarded, remaining_name, remaining_name
            ),
            None => format!(
                "{}'s time ran out! Remaining points ({}) went to {}. The match ended in a draw.",
                timed_out_name, awarded, remaining_name
            ),
        };
        self.finalize(FinishReason::Timeout { timed_out, awarded }, winner, message, now)
    }

    /// Seat with the strictly higher score, `None` on a tie.
    fn leader(&self) -> Option<Seat> {
        let first = self.player(Seat::First)?.score;
        let second = self.player(Seat::Second)?.score;
        match first.cmp(&second) {
            core::cmp::Ordering::Greater => Some(Seat::First),
            core::cmp::Ordering::Less => Some(Seat::Second),
            core::cmp::Ordering::Equal => None,
        }
    }

    /// The one place a match becomes final. Returns `None` if it already was.
    fn finalize(
        &mut self,
        reason: FinishReason,
        winner: Option<Seat>,
        message: String,
        now: u64,
    ) -> Option<Finish> {
        if self.is_over() {
            return None;
        }

        self.status = MatchStatus::GameOver;
        self.clock.stop();
        self.winner = winner;
        self.finished_at_millis = Some(now);
        self.last_event_message = message;
        log::info!(
            "Match {} over ({:?}), winner: {}",
            self.id,
            reason,
            self.winner_player().map_or("none", |player| player.username.as_str())
        );
        Some(Finish { reason, winner })
    }

    fn check_status(&self, expected: MatchStatus) -> Result<()> {
        if self.status == expected {
            Ok(())
        } else {
            log::warn!(
                "Match {} is {}, operation needs {}",
                self.id,
                self.status,
                expected
            );
            Err(GameError::InvalidState {
                actual: self.status,
            })
        }
    }
}
