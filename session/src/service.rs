use duelsweeper_core::{
    BoardConfig, Coord2, DisconnectOutcome, GameError, Match, MineGenerator, RandomMineGenerator,
    Result, Seat,
};
use duelsweeper_protocol::MatchSnapshot;
use std::sync::Arc;
use uuid::Uuid;

use crate::*;

/// Result of a successful join: the new player's id is only ever handed out here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JoinedMatch {
    pub player_id: String,
    pub seat: Seat,
    pub snapshot: MatchSnapshot,
}

/// Request-shaped entry points over the shared store.
///
/// Every operation locks the one match it touches, applies the rules, and if
/// anything changed publishes the new snapshot before the lock is released,
/// so subscribers see a match's updates in the order they happened. Rejected
/// operations change nothing and publish nothing.
pub struct MatchService {
    store: Arc<dyn MatchStore>,
    sink: Arc<dyn BroadcastSink>,
    clock: Arc<dyn Clock>,
    registry: SessionRegistry,
    config: ServiceConfig,
}

impl MatchService {
    pub fn new(
        store: Arc<dyn MatchStore>,
        sink: Arc<dyn BroadcastSink>,
        clock: Arc<dyn Clock>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            store,
            sink,
            clock,
            registry: SessionRegistry::new(),
            config,
        }
    }

    pub fn in_memory(sink: Arc<dyn BroadcastSink>, clock: Arc<dyn Clock>, config: ServiceConfig) -> Self {
        Self::new(Arc::new(InMemoryMatchStore::new()), sink, clock, config)
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn store(&self) -> &dyn MatchStore {
        self.store.as_ref()
    }

    /// Creates a match with randomly placed mines.
    pub fn create_match(&self, config: BoardConfig) -> Result<MatchSnapshot> {
        self.create_match_with(config, RandomMineGenerator::new(rand::random()))
    }

    pub fn create_match_with<G: MineGenerator>(
        &self,
        config: BoardConfig,
        generator: G,
    ) -> Result<MatchSnapshot> {
        let cells = u64::from(config.total_cells());
        let limit = u64::from(self.config.max_board_cells);
        if cells > limit {
            log::warn!("Rejected {}x{} board, limit is {} cells", config.size.0, config.size.1, limit);
            return Err(GameError::BoardTooLarge { cells, limit });
        }

        let game = Match::create(Uuid::new_v4().to_string(), config, generator)?;
        let snapshot = MatchSnapshot::from(&game);
        log::info!(
            "Created match {} ({}x{}, {} mines)",
            game.id(),
            config.size.0,
            config.size.1,
            game.board().mine_count()
        );
        self.store.put(game);
        Ok(snapshot)
    }

    pub fn get_match(&self, match_id: &str) -> Result<MatchSnapshot> {
        let shared = self.store.get(match_id).ok_or(GameError::MatchNotFound)?;
        let game = shared.lock();
        Ok(MatchSnapshot::from(&*game))
    }

    pub fn list_matches(&self) -> Vec<MatchSnapshot> {
        self.store
            .list()
            .into_iter()
            .map(|shared| MatchSnapshot::from(&*shared.lock()))
            .collect()
    }

    pub fn join_match(&self, match_id: &str, username: &str) -> Result<JoinedMatch> {
        let player_id = Uuid::new_v4().to_string();
        self.update(match_id, |game, _| {
            let seat = game.join(player_id.as_str(), username)?;
            Ok((seat, true))
        })
        .map(|(seat, snapshot)| JoinedMatch {
            player_id,
            seat,
            snapshot,
        })
    }

    pub fn mark_ready(&self, match_id: &str, player_id: &str) -> Result<MatchSnapshot> {
        self.update(match_id, |game, now| {
            let outcome = game.mark_ready(player_id, now)?;
            Ok((outcome, outcome.has_update()))
        })
        .map(|(_, snapshot)| snapshot)
    }

    pub fn make_move(&self, match_id: &str, player_id: &str, coords: Coord2) -> Result<MatchSnapshot> {
        self.update(match_id, |game, now| {
            let report = game.make_move(player_id, coords, now)?;
            Ok((report, true))
        })
        .map(|(_, snapshot)| snapshot)
    }

    pub fn toggle_flag(&self, match_id: &str, player_id: &str, coords: Coord2) -> Result<MatchSnapshot> {
        self.update(match_id, |game, _| {
            let outcome = game.toggle_flag(player_id, coords)?;
            Ok((outcome, true))
        })
        .map(|(_, snapshot)| snapshot)
    }

    pub fn handle_disconnect(&self, match_id: &str, player_id: &str) -> Result<MatchSnapshot> {
        self.update(match_id, |game, now| {
            let outcome = game.handle_disconnect(player_id, now)?;
            Ok((outcome, outcome != DisconnectOutcome::NoChange))
        })
        .map(|(_, snapshot)| snapshot)
    }

    /// Transport subscribe hook. See [`SessionRegistry::register_subscription`].
    pub fn on_subscribe(&self, session_id: &str, destination: &str, headers: &SubscribeHeaders) -> bool {
        self.registry
            .register_subscription(session_id, destination, headers)
    }

    /// Transport disconnect hook: a tracked session forfeits its seat.
    ///
    /// `Ok(None)` when the session was never registered.
    pub fn on_session_disconnect(&self, session_id: &str) -> Result<Option<MatchSnapshot>> {
        let Some(info) = self.registry.unregister(session_id) else {
            log::warn!("No player or match known for disconnected session {}", session_id);
            return Ok(None);
        };
        log::info!(
            "Session {} closed, handling disconnect of player {} in match {}",
            session_id,
            info.player_id,
            info.match_id
        );
        self.handle_disconnect(&info.match_id, &info.player_id)
            .map(Some)
    }

    /// Finishes every running match whose current player has run out of time.
    /// Only matches the store marks active are locked. Returns how many were
    /// finished.
    pub fn sweep_timeouts(&self) -> usize {
        let mut finished = 0;
        for shared in self.store.list_active() {
            let mut game = shared.lock();
            let now = self.clock.now_millis();
            // the match may have finished between listing and locking
            if let Some(finish) = game.check_timeout(now) {
                log::info!("Match {} timed out: {:?}", game.id(), finish.reason);
                self.publish(&game);
                finished += 1;
            }
            if !game.has_running_clock() {
                self.store.set_active(game.id(), false);
            }
        }
        finished
    }

    /// Deletes finished matches older than the configured retention.
    /// Returns how many were deleted.
    pub fn purge_finished(&self) -> usize {
        let Some(retention) = self.config.finished_retention_millis() else {
            return 0;
        };
        let now = self.clock.now_millis();
        let expired: Vec<String> = self
            .store
            .list()
            .into_iter()
            .filter_map(|shared| {
                let game = shared.lock();
                let finished_at = game.finished_at_millis()?;
                (now.saturating_sub(finished_at) >= retention).then(|| game.id().to_owned())
            })
            .collect();

        let mut purged = 0;
        for id in expired {
            if self.store.delete(&id).is_some() {
                log::info!("Purged finished match {}", id);
                purged += 1;
            }
        }
        purged
    }

    /// Runs `f` under the match lock, publishing when it reports a change.
    fn update<T>(
        &self,
        match_id: &str,
        f: impl FnOnce(&mut Match, u64) -> Result<(T, bool)>,
    ) -> Result<(T, MatchSnapshot)> {
        let Some(shared) = self.store.get(match_id) else {
            log::warn!("Match {} not found", match_id);
            return Err(GameError::MatchNotFound);
        };
        let mut game = shared.lock();
        let now = self.clock.now_millis();
        let (value, changed) = f(&mut *game, now).inspect_err(|err| {
            log::warn!("Rejected request on match {}: {}", match_id, err);
        })?;

        let snapshot = if changed {
            self.store.set_active(match_id, game.has_running_clock());
            self.publish(&game)
        } else {
            MatchSnapshot::from(&*game)
        };
        Ok((value, snapshot))
    }

    fn publish(&self, game: &Match) -> MatchSnapshot {
        let snapshot = MatchSnapshot::from(game);
        self.sink.publish(game.id(), &snapshot);
        snapshot
    }
}
