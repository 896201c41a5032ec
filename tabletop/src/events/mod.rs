//! Domain event bus.
//!
//! The state machine does not hold references to live channels; it publishes
//! events here and connection tasks subscribe. This keeps the core free of
//! the controller-to-channel cycle and matches the delivery contract of the
//! snapshot push: best-effort, at-most-once, no retry. A subscriber that
//! lags or misses an event catches up on its next full resync (reconnect).

use tokio::sync::broadcast;

use crate::game::GameSnapshot;

/// Events published by the session core after successful mutations.
#[derive(Debug, Clone)]
pub enum GameEvent {
    /// The game state changed; `None` means the session was deleted and the
    /// system is back to uninitialized.
    GameStateChanged(Option<GameSnapshot>),
}

/// Broadcast bus carrying [`GameEvent`]s to every subscribed connection.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<GameEvent>,
}

impl EventBus {
    /// Create a bus that buffers up to `capacity` undelivered events per
    /// subscriber before old ones are dropped.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all events published from this point on.
    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.tx.subscribe()
    }

    /// Publish an event to every current subscriber. Publishing with no
    /// subscribers is not an error; the event is simply dropped.
    pub fn publish(&self, event: GameEvent) {
        let _ = self.tx.send(event);
    }

    /// Number of live subscribers, for logging.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        bus.publish(GameEvent::GameStateChanged(None));

        let event = rx.recv().await.expect("event delivered");
        assert!(matches!(event, GameEvent::GameStateChanged(None)));
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_does_not_panic() {
        let bus = EventBus::new(8);
        bus.publish(GameEvent::GameStateChanged(None));
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_each_subscriber_sees_every_event() {
        let bus = EventBus::new(8);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(GameEvent::GameStateChanged(None));

        assert!(rx1.recv().await.is_ok());
        assert!(rx2.recv().await.is_ok());
    }
}
