//! Storage port for the shared task collection.

use super::ChangeSubscription;
use crate::board::domain::{Role, StageName, Task, TaskId, TaskPatch};
use async_trait::async_trait;
use std::cmp::Reverse;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

/// Stage filter for task queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StatusFilter {
    /// Tasks in any stage.
    #[default]
    Any,
    /// Tasks in exactly this stage.
    Is(StageName),
    /// Tasks in any stage but this one.
    IsNot(StageName),
}

impl StatusFilter {
    /// Returns whether a stage passes the filter.
    #[must_use]
    pub fn matches(&self, status: &StageName) -> bool {
        match self {
            Self::Any => true,
            Self::Is(stage) => status == stage,
            Self::IsNot(stage) => status != stage,
        }
    }
}

/// Result ordering for task queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskOrder {
    /// Ascending rank; board order.
    #[default]
    PositionAscending,
    /// Newest first; report order.
    CreatedDescending,
}

/// Filter and order for [`TaskStore::select`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    role: Option<Role>,
    status: StatusFilter,
    order: TaskOrder,
}

impl TaskQuery {
    /// Matches every task, in board order.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Matches one role's board, in board order.
    #[must_use]
    pub fn board(role: Role) -> Self {
        Self::all().with_role(role)
    }

    /// Restricts the query to one role.
    #[must_use]
    pub const fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Sets or clears the role restriction.
    #[must_use]
    pub const fn with_role_filter(mut self, role: Option<Role>) -> Self {
        self.role = role;
        self
    }

    /// Restricts the query by stage.
    #[must_use]
    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    /// Sets the result order.
    #[must_use]
    pub const fn ordered_by(mut self, order: TaskOrder) -> Self {
        self.order = order;
        self
    }

    /// Returns the role filter.
    #[must_use]
    pub const fn role(&self) -> Option<Role> {
        self.role
    }

    /// Returns the stage filter.
    #[must_use]
    pub const fn status(&self) -> &StatusFilter {
        &self.status
    }

    /// Returns the result order.
    #[must_use]
    pub const fn order(&self) -> TaskOrder {
        self.order
    }

    /// Returns whether a task passes the filters.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.role.is_none_or(|role| task.role() == role) && self.status.matches(task.status())
    }

    /// Sorts tasks into the query's order.
    ///
    /// Ties fall back to creation time and then identifier so results are
    /// deterministic.
    pub fn sort(&self, tasks: &mut [Task]) {
        match self.order {
            TaskOrder::PositionAscending => {
                tasks.sort_by_key(|task| (task.position(), task.created_at(), task.id()));
            }
            TaskOrder::CreatedDescending => {
                tasks.sort_by_key(|task| (Reverse(task.created_at()), task.id()));
            }
        }
    }
}

/// Backing storage for tasks, shared by every connected client.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Returns the tasks matching `query`, in the query's order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Persistence`] when the query fails.
    async fn select(&self, query: &TaskQuery) -> TaskStoreResult<Vec<Task>>;

    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::DuplicateTask`] when the identifier already
    /// exists.
    async fn insert(&self, task: &Task) -> TaskStoreResult<()>;

    /// Applies a patch to one task and returns the stored result.
    ///
    /// The stored revision advances by one on every accepted patch.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task does not exist and
    /// [`TaskStoreError::RevisionConflict`] when the patch expects a revision
    /// the task has moved past.
    async fn update(&self, id: TaskId, patch: &TaskPatch) -> TaskStoreResult<Task>;

    /// Deletes one task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task does not exist.
    async fn delete(&self, id: TaskId) -> TaskStoreResult<()>;

    /// Registers for notifications about any insert, update, or delete.
    fn subscribe(&self) -> ChangeSubscription;
}

/// Errors returned by task store implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskStoreError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The task changed since the caller read it.
    #[error("task {task_id} is at revision {actual}, expected {expected}")]
    RevisionConflict {
        /// Conflicting task.
        task_id: TaskId,
        /// Revision the caller read.
        expected: u64,
        /// Revision currently stored.
        actual: u64,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Returns whether the error reports a concurrent modification.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::RevisionConflict { .. })
    }
}
