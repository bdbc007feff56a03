//! Change notifications for the shared task collection.

use crate::board::domain::TaskId;
use tokio::sync::broadcast::{self, error::RecvError};

/// Kind of mutation that happened in the task collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// A task was inserted.
    Insert,
    /// A task was updated.
    Update,
    /// A task was deleted.
    Delete,
}

/// Notification that something changed in the task collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChangeEvent {
    /// Mutation kind.
    pub kind: ChangeKind,
    /// Affected task.
    pub task_id: TaskId,
}

impl ChangeEvent {
    /// Creates a change event.
    #[must_use]
    pub const fn new(kind: ChangeKind, task_id: TaskId) -> Self {
        Self { kind, task_id }
    }
}

/// Live registration for change notifications.
///
/// Dropping the subscription unsubscribes.
#[derive(Debug)]
pub struct ChangeSubscription {
    receiver: broadcast::Receiver<ChangeEvent>,
}

impl ChangeSubscription {
    /// Wraps a broadcast receiver.
    #[must_use]
    pub const fn new(receiver: broadcast::Receiver<ChangeEvent>) -> Self {
        Self { receiver }
    }

    /// Waits for the next change.
    ///
    /// Missed notifications are skipped: subscribers reload the whole board,
    /// so only the fact that something changed matters. Returns `None` once
    /// the publishing store is gone.
    pub async fn next(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "change subscription lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Returns a pending change without waiting, if one is queued.
    #[cfg(test)]
    pub(crate) fn try_next(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(_)) => {}
                Err(_) => return None,
            }
        }
    }
}
