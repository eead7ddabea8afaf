//! Notifications published by the save system.
//!
//! Delivery is best-effort over a tokio broadcast channel. A UI that is not
//! listening simply misses the notice.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Events observed by UI collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaveEvent {
    /// A save reached disk. `notice_for` is how long to show the "saved" notice.
    SaveCompleted {
        level: String,
        entities: usize,
        notice_for: Duration,
    },
    /// Saved state was applied to the registered entities.
    LoadCompleted { restored: usize },
    /// "Continue" was requested but there is nothing to continue.
    NoSavedGame,
}

/// Broadcast sender wrapper for [`SaveEvent`].
#[derive(Debug, Clone)]
pub struct SaveEvents {
    tx: broadcast::Sender<SaveEvent>,
}

impl SaveEvents {
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn publish(&self, event: SaveEvent) {
        if self.tx.send(event).is_err() {
            // No subscribers - this is normal, not an error
            tracing::trace!(target: "save::events", "no subscribers for save event");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SaveEvent> {
        self.tx.subscribe()
    }
}

impl Default for SaveEvents {
    fn default() -> Self {
        Self::with_capacity(16)
    }
}
