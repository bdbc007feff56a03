//! Publishing side of the task change feed.

use crate::board::{
    domain::TaskId,
    ports::{ChangeEvent, ChangeKind, ChangeSubscription},
};
use tokio::sync::broadcast;

/// Buffered notifications per subscriber before older ones are dropped.
const DEFAULT_CAPACITY: usize = 64;

/// Fan-out of change events to every live subscription.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    /// Creates a feed buffering `capacity` events per subscriber.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Registers a new subscriber.
    #[must_use]
    pub fn subscribe(&self) -> ChangeSubscription {
        ChangeSubscription::new(self.sender.subscribe())
    }

    /// Notifies every subscriber; a feed without subscribers drops the event.
    pub fn publish(&self, kind: ChangeKind, task_id: TaskId) {
        let delivered = self
            .sender
            .send(ChangeEvent::new(kind, task_id))
            .unwrap_or_default();
        tracing::trace!(?kind, %task_id, delivered, "published task change");
    }

    /// Returns the number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}
