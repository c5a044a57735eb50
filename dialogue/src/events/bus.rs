//! Broadcast event bus for dialogue observers.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use super::types::DialogueEvent;

/// Channel capacity for broadcast
const CHANNEL_CAPACITY: usize = 256;

/// Shared reference to EventBus
pub type SharedEventBus = Arc<EventBus>;

/// Fan-out of [`DialogueEvent`]s to any number of subscribers.
pub struct EventBus {
    sender: broadcast::Sender<DialogueEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn shared(self) -> SharedEventBus {
        Arc::new(self)
    }

    /// Publish to all current subscribers. Having none is not an error.
    pub fn publish(&self, event: DialogueEvent) {
        let event_type = event.event_type();
        match self.sender.send(event) {
            Ok(count) => debug!(event_type, receivers = count, "Event published"),
            Err(_) => debug!(event_type, "Event published (no receivers)"),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DialogueEvent> {
        self.sender.subscribe()
    }

    /// Subscribe to the events of one session only.
    pub fn subscribe_session(&self, session_id: Uuid) -> SessionReceiver {
        SessionReceiver {
            receiver: self.subscribe(),
            session_id,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiver that skips events from other sessions.
pub struct SessionReceiver {
    receiver: broadcast::Receiver<DialogueEvent>,
    session_id: Uuid,
}

impl SessionReceiver {
    /// Next event of this session.
    pub async fn recv(&mut self) -> Result<DialogueEvent, broadcast::error::RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if event.session_id() == self.session_id {
                return Ok(event);
            }
        }
    }

    /// Next already-queued event of this session, without waiting.
    pub fn try_recv(&mut self) -> Result<DialogueEvent, broadcast::error::TryRecvError> {
        loop {
            let event = self.receiver.try_recv()?;
            if event.session_id() == self.session_id {
                return Ok(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::model::StatementId;

    fn started(session_id: Uuid) -> DialogueEvent {
        DialogueEvent::SessionStarted {
            session_id,
            topic: "Television".into(),
            root: StatementId(1),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_publish_subscribe() {
        let bus = EventBus::new();
        let mut receiver = bus.subscribe();

        bus.publish(started(Uuid::new_v4()));

        let received = receiver.recv().await.unwrap();
        assert_eq!(received.event_type(), "session_started");
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::new().shared();
        assert_eq!(bus.subscriber_count(), 0);
        bus.publish(started(Uuid::new_v4()));
    }

    #[tokio::test]
    async fn test_session_receiver_filters() {
        let bus = EventBus::new();
        let mine = Uuid::new_v4();
        let mut receiver = bus.subscribe_session(mine);

        bus.publish(started(Uuid::new_v4()));
        bus.publish(started(mine));

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.session_id(), mine);
        assert!(receiver.try_recv().is_err());
    }
}
