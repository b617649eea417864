/// Prefix of the per-match destination clients subscribe to.
pub const TOPIC_PREFIX: &str = "/topic/games/";

pub const PLAYER_ID_HEADER: &str = "playerId";
pub const MATCH_ID_HEADER: &str = "gameId";

pub fn topic_for(match_id: &str) -> String {
    format!("{}{}", TOPIC_PREFIX, match_id)
}

/// Match id addressed by a subscription destination, if it is a match topic.
pub fn match_id_from_topic(destination: &str) -> Option<&str> {
    destination
        .strip_prefix(TOPIC_PREFIX)
        .filter(|id| !id.is_empty() && !id.contains('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_round_trip() {
        assert_eq!(topic_for("abc"), "/topic/games/abc");
        assert_eq!(match_id_from_topic("/topic/games/abc"), Some("abc"));
    }

    #[test]
    fn rejects_other_destinations() {
        for destination in ["/topic/games/", "/topic/games/a/b", "/topic/chat/abc", "abc", ""] {
            assert_eq!(match_id_from_topic(destination), None, "{}", destination);
        }
    }
}
