use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

use super::messages::WsMessage;

/// Topic based pub/sub for live quiz and poll events
#[derive(Clone)]
pub struct Broadcaster {
    /// One channel per topic ("quiz:AB12CD", "poll:XY34ZW")
    channels: Arc<DashMap<String, broadcast::Sender<WsMessage>>>,
    capacity: usize,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::with_capacity(1000)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(DashMap::new()),
            capacity,
        }
    }

    fn get_or_create_channel(&self, topic: &str) -> broadcast::Sender<WsMessage> {
        self.channels
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }

    pub fn subscribe(&self, topic: &str) -> broadcast::Receiver<WsMessage> {
        self.get_or_create_channel(topic).subscribe()
    }

    /// Publish to a topic; a topic nobody subscribed to drops the message
    pub fn broadcast(&self, topic: &str, message: WsMessage) {
        if let Some(sender) = self.channels.get(topic) {
            let _ = sender.send(message);
        }
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.channels
            .get(topic)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    /// Drop channels whose subscribers all went away
    pub fn cleanup_empty_channels(&self) -> usize {
        let before = self.channels.len();
        self.channels.retain(|_, sender| sender.receiver_count() > 0);
        before - self.channels.len()
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Topic naming
pub mod topics {
    pub fn quiz(code: &str) -> String {
        format!("quiz:{}", code.trim().to_uppercase())
    }

    pub fn poll(code: &str) -> String {
        format!("poll:{}", code.trim().to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_subscribers_receive_topic_messages() {
        let broadcaster = Broadcaster::new();
        let mut rx = broadcaster.subscribe(&topics::quiz("ab12cd"));

        broadcaster.broadcast(
            "quiz:AB12CD",
            WsMessage::QuizEnded {
                quiz_code: "AB12CD".to_string(),
                ended_at: Utc::now(),
            },
        );

        let received = rx.recv().await.unwrap();
        assert!(matches!(received, WsMessage::QuizEnded { .. }));
        assert_eq!(broadcaster.subscriber_count("quiz:AB12CD"), 1);
    }

    #[test]
    fn test_cleanup_empty_channels() {
        let broadcaster = Broadcaster::new();
        let rx = broadcaster.subscribe(&topics::poll("p1"));
        let _kept = broadcaster.subscribe(&topics::quiz("q1"));
        drop(rx);

        assert_eq!(broadcaster.cleanup_empty_channels(), 1);
        assert_eq!(broadcaster.subscriber_count("quiz:Q1"), 1);
    }

    #[test]
    fn test_broadcast_without_subscribers_is_noop() {
        let broadcaster = Broadcaster::new();
        broadcaster.broadcast("poll:NONE", WsMessage::Error { message: "x".into() });
        assert_eq!(broadcaster.subscriber_count("poll:NONE"), 0);
    }
}
