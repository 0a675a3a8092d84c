use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;
use uuid::Uuid;

/// A realtime push fanned out to connected SSE subscribers. `channel` scopes
/// delivery (`user-{id}` or `admin`); `event` becomes the SSE event name.
#[derive(Debug, Clone, Serialize)]
pub struct PushEvent {
    pub channel: String,
    pub event: String,
    pub payload: Value,
}

#[derive(Clone)]
pub struct Notifier {
    tx: broadcast::Sender<PushEvent>,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Fire-and-forget: a send with no live subscribers is not an error.
    pub fn publish(&self, channel: &str, event: &str, payload: Value) {
        let _ = self.tx.send(PushEvent {
            channel: channel.to_string(),
            event: event.to_string(),
            payload,
        });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PushEvent> {
        self.tx.subscribe()
    }
}

pub fn user_channel(user_id: Uuid) -> String {
    format!("user-{user_id}")
}

pub const ADMIN_CHANNEL: &str = "admin";
