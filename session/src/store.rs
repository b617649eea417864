use dashmap::DashMap;
use duelsweeper_core::Match;
use parking_lot::Mutex;
use std::sync::Arc;

/// A match behind its own lock. Every read-modify-write holds it.
pub type SharedMatch = Arc<Mutex<Match>>;

/// Keyed storage of live matches.
pub trait MatchStore: Send + Sync {
    /// Stores `game` under its id, replacing any previous match with that id.
    fn put(&self, game: Match) -> SharedMatch;
    fn get(&self, match_id: &str) -> Option<SharedMatch>;
    fn list(&self) -> Vec<SharedMatch>;
    fn delete(&self, match_id: &str) -> Option<SharedMatch>;

    /// Records whether a match has a running turn clock. Called by the
    /// service after every change, while it still holds the match lock.
    fn set_active(&self, match_id: &str, active: bool);

    /// Matches marked active, without locking any of them. Entries can be
    /// stale by the time the caller locks one, so callers re-check.
    fn list_active(&self) -> Vec<SharedMatch>;
}

#[derive(Debug, Default)]
pub struct InMemoryMatchStore {
    matches: DashMap<String, SharedMatch>,
    active: DashMap<String, SharedMatch>,
}

impl InMemoryMatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }
}

impl MatchStore for InMemoryMatchStore {
    fn put(&self, game: Match) -> SharedMatch {
        let id = game.id().to_owned();
        let active = game.has_running_clock();
        let shared = Arc::new(Mutex::new(game));
        if active {
            self.active.insert(id.clone(), Arc::clone(&shared));
        } else {
            self.active.remove(&id);
        }
        self.matches.insert(id, Arc::clone(&shared));
        shared
    }

    fn get(&self, match_id: &str) -> Option<SharedMatch> {
        self.matches.get(match_id).map(|entry| Arc::clone(entry.value()))
    }

    // Clones the handles out so no shard lock is held while a match is locked.
    fn list(&self) -> Vec<SharedMatch> {
        self.matches
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    fn delete(&self, match_id: &str) -> Option<SharedMatch> {
        self.active.remove(match_id);
        self.matches.remove(match_id).map(|(_, game)| game)
    }

    fn set_active(&self, match_id: &str, active: bool) {
        if !active {
            self.active.remove(match_id);
        } else if let Some(shared) = self.get(match_id) {
            self.active.insert(match_id.to_owned(), shared);
        }
    }

    fn list_active(&self) -> Vec<SharedMatch> {
        self.active
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }
}
