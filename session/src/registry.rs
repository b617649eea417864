use dashmap::DashMap;
use duelsweeper_protocol::{MATCH_ID_HEADER, PLAYER_ID_HEADER, match_id_from_topic};

/// Who is behind a transport session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionInfo {
    pub player_id: String,
    pub match_id: String,
}

/// The `playerId` and `gameId` headers of a subscribe frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubscribeHeaders {
    pub player_id: Option<String>,
    pub match_id: Option<String>,
}

impl SubscribeHeaders {
    pub fn new(player_id: impl Into<String>, match_id: impl Into<String>) -> Self {
        Self {
            player_id: Some(player_id.into()),
            match_id: Some(match_id.into()),
        }
    }

    /// Picks the first value of each known header out of raw header pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut headers = Self::default();
        for (name, value) in pairs {
            let slot = match name {
                PLAYER_ID_HEADER => &mut headers.player_id,
                MATCH_ID_HEADER => &mut headers.match_id,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.to_owned());
            }
        }
        headers
    }
}

/// Maps transport session ids to the seat they stand for. No game logic.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<String, SessionInfo>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracks `session_id` if it subscribed to a match topic with matching
    /// headers. Returns whether it was registered.
    pub fn register_subscription(
        &self,
        session_id: &str,
        destination: &str,
        headers: &SubscribeHeaders,
    ) -> bool {
        let Some(match_id) = match_id_from_topic(destination) else {
            log::debug!("Session {} subscribed to {}, not a match topic", session_id, destination);
            return false;
        };
        let (Some(player_id), Some(header_match_id)) = (&headers.player_id, &headers.match_id) else {
            log::warn!(
                "Could not register session {}: missing playerId or gameId header for {}",
                session_id,
                destination
            );
            return false;
        };
        if header_match_id != match_id {
            log::warn!(
                "Could not register session {}: gameId header {} does not match {}",
                session_id,
                header_match_id,
                destination
            );
            return false;
        }

        log::info!(
            "Registering session {} for player {} in match {}",
            session_id,
            player_id,
            match_id
        );
        self.sessions.insert(
            session_id.to_owned(),
            SessionInfo {
                player_id: player_id.clone(),
                match_id: match_id.to_owned(),
            },
        );
        true
    }

    pub fn unregister(&self, session_id: &str) -> Option<SessionInfo> {
        let removed = self.sessions.remove(session_id).map(|(_, info)| info);
        if removed.is_none() {
            log::debug!("Session {} was not tracked", session_id);
        }
        removed
    }

    pub fn get(&self, session_id: &str) -> Option<SessionInfo> {
        self.sessions.get(session_id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
