// Change feed for open dashboards
//
// Uses tokio broadcast channel to fan record changes out to SSE clients

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// A record was created or changed
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    /// Timestamp (ISO 8601)
    pub timestamp: String,
    pub entity: EntityKind,
    pub action: ChangeAction,
    /// Primary key of the affected row
    pub id: String,
    /// User who made the change
    pub actor: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    FloodZone,
    AffectedPerson,
    ReliefResource,
    Distribution,
    WeatherAlert,
    ResponseTeam,
    User,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    Created,
    Updated,
}

impl ChangeEvent {
    pub fn new(
        entity: EntityKind,
        action: ChangeAction,
        id: impl ToString,
        actor: Option<&str>,
    ) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            entity,
            action,
            id: id.to_string(),
            actor: actor.map(str::to_string),
        }
    }
}

/// Event broadcaster for dashboard clients
#[derive(Clone)]
pub struct EventBroadcaster {
    sender: broadcast::Sender<ChangeEvent>,
}

impl EventBroadcaster {
    /// Create a new broadcaster with buffer size
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Broadcast an event to all subscribers
    pub fn broadcast(&self, event: ChangeEvent) {
        // Ignore error if no subscribers
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}
