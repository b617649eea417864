#![allow(dead_code)]

use duelsweeper_core::{BoardConfig, Coord2, FixedMineGenerator};
use duelsweeper_protocol::MatchSnapshot;
use duelsweeper_session::*;
use parking_lot::Mutex;
use std::sync::Arc;

/// 8x8 with 10 mines: three across the top left corner and seven along the
/// bottom row, so (1, 1) is worth 3 and the middle is one zero region.
pub const BEGINNER_MINES: [Coord2; 10] = [
    (0, 0),
    (0, 1),
    (0, 2),
    (7, 0),
    (7, 1),
    (7, 2),
    (7, 3),
    (7, 4),
    (7, 5),
    (7, 6),
];

pub struct Harness {
    pub service: Arc<MatchService>,
    pub clock: Arc<ManualClock>,
    published: Arc<Mutex<Vec<MatchSnapshot>>>,
}

pub struct Started {
    pub id: String,
    pub first: String,
    pub second: String,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(ServiceConfig::default())
    }

    pub fn with_config(config: ServiceConfig) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let published = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let published = Arc::clone(&published);
            move |_: &str, snapshot: &MatchSnapshot| published.lock().push(snapshot.clone())
        };
        let clock = Arc::new(ManualClock::new(0));
        let service = MatchService::in_memory(Arc::new(sink), clock.clone(), config);
        Self {
            service: Arc::new(service),
            clock,
            published,
        }
    }

    pub fn published(&self) -> Vec<MatchSnapshot> {
        self.published.lock().clone()
    }

    pub fn published_count(&self) -> usize {
        self.published.lock().len()
    }

    pub fn game_over_count(&self) -> usize {
        self.published.lock().iter().filter(|snapshot| snapshot.game_over).count()
    }

    pub fn create(&self, rows: u16, columns: u16, mines: &[Coord2]) -> String {
        let config = BoardConfig::new((rows, columns), mines.len() as u32).unwrap();
        self.service
            .create_match_with(config, FixedMineGenerator::new(mines))
            .unwrap()
            .id
    }

    /// Creates, seats Alice and Bob and readies both at the current time.
    pub fn start(&self, rows: u16, columns: u16, mines: &[Coord2]) -> Started {
        let id = self.create(rows, columns, mines);
        let first = self.service.join_match(&id, "Alice").unwrap().player_id;
        let second = self.service.join_match(&id, "Bob").unwrap().player_id;
        self.service.mark_ready(&id, &first).unwrap();
        self.service.mark_ready(&id, &second).unwrap();
        Started { id, first, second }
    }
}

/// Points still on the board according to a snapshot.
pub fn remaining_points(snapshot: &MatchSnapshot) -> u32 {
    snapshot
        .board
        .iter()
        .flatten()
        .filter(|cell| !cell.mine && !cell.revealed)
        .map(|cell| u32::from(cell.adjacent_mines))
        .sum()
}
