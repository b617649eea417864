use duelsweeper_protocol::{MatchSnapshot, topic_for};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Where finished state changes go. Called with the match lock held, so it
/// must not block.
pub trait BroadcastSink: Send + Sync {
    fn publish(&self, match_id: &str, snapshot: &MatchSnapshot);
}

impl<F> BroadcastSink for F
where
    F: Fn(&str, &MatchSnapshot) + Send + Sync,
{
    fn publish(&self, match_id: &str, snapshot: &MatchSnapshot) {
        self(match_id, snapshot)
    }
}

#[derive(Clone, Debug)]
pub struct MatchUpdate {
    pub topic: String,
    pub snapshot: Arc<MatchSnapshot>,
}

/// Fans snapshots out to any number of transport tasks over a tokio
/// broadcast channel. Slow receivers lag, they never stall a match.
#[derive(Clone, Debug)]
pub struct ChannelSink {
    sender: broadcast::Sender<MatchUpdate>,
}

impl ChannelSink {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MatchUpdate> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl BroadcastSink for ChannelSink {
    fn publish(&self, match_id: &str, snapshot: &MatchSnapshot) {
        let update = MatchUpdate {
            topic: topic_for(match_id),
            snapshot: Arc::new(snapshot.clone()),
        };
        if self.sender.send(update).is_err() {
            log::trace!("No subscribers for match {}", match_id);
        }
    }
}
