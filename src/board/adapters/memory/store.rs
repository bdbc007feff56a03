//! In-memory task store with a process-local change feed.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::board::{
    adapters::feed::ChangeFeed,
    domain::{Task, TaskId, TaskPatch},
    ports::{ChangeKind, ChangeSubscription, TaskQuery, TaskStore, TaskStoreError, TaskStoreResult},
};

/// Thread-safe in-memory task store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    tasks: Arc<RwLock<HashMap<TaskId, Task>>>,
    feed: ChangeFeed,
}

impl InMemoryTaskStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `tasks`, without notifying anyone.
    #[must_use]
    pub fn seeded(tasks: impl IntoIterator<Item = Task>) -> Self {
        let store = Self::new();
        if let Ok(mut state) = store.tasks.write() {
            state.extend(tasks.into_iter().map(|task| (task.id(), task)));
        }
        store
    }

    /// Returns the number of live change subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.feed.subscriber_count()
    }
}

fn lock_poisoned(err: impl std::fmt::Display) -> TaskStoreError {
    TaskStoreError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn select(&self, query: &TaskQuery) -> TaskStoreResult<Vec<Task>> {
        let state = self.tasks.read().map_err(lock_poisoned)?;
        let mut matching: Vec<Task> = state
            .values()
            .filter(|task| query.matches(task))
            .cloned()
            .collect();
        query.sort(&mut matching);
        Ok(matching)
    }

    async fn insert(&self, task: &Task) -> TaskStoreResult<()> {
        {
            let mut state = self.tasks.write().map_err(lock_poisoned)?;
            if state.contains_key(&task.id()) {
                return Err(TaskStoreError::DuplicateTask(task.id()));
            }
            state.insert(task.id(), task.clone());
        }
        self.feed.publish(ChangeKind::Insert, task.id());
        Ok(())
    }

    async fn update(&self, id: TaskId, patch: &TaskPatch) -> TaskStoreResult<Task> {
        let updated = {
            let mut state = self.tasks.write().map_err(lock_poisoned)?;
            let stored = state.get_mut(&id).ok_or(TaskStoreError::NotFound(id))?;
            if !patch.accepts_revision(stored.revision()) {
                return Err(TaskStoreError::RevisionConflict {
                    task_id: id,
                    expected: patch.expected_revision().unwrap_or_default(),
                    actual: stored.revision(),
                });
            }
            stored.apply_patch(patch);
            stored.advance_revision();
            stored.clone()
        };
        self.feed.publish(ChangeKind::Update, id);
        Ok(updated)
    }

    async fn delete(&self, id: TaskId) -> TaskStoreResult<()> {
        {
            let mut state = self.tasks.write().map_err(lock_poisoned)?;
            state.remove(&id).ok_or(TaskStoreError::NotFound(id))?;
        }
        self.feed.publish(ChangeKind::Delete, id);
        Ok(())
    }

    fn subscribe(&self) -> ChangeSubscription {
        self.feed.subscribe()
    }
}
