// events/mod.rs
use crate::models::WsMessage;
use tokio::sync::broadcast;

const CAPACITY: usize = 100;

/// Fan-out of action outcomes to every connected client.
pub struct EventBus {
    tx: broadcast::Sender<WsMessage>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CAPACITY);
        Self { tx }
    }

    /// Returns how many subscribers received the event. Nobody listening is fine.
    pub fn publish(&self, event: WsMessage) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WsMessage> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
