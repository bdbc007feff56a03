//! Client-local board snapshot for one role.

use super::{ColumnView, Pipeline, Role, Task, TaskId, TaskPatch};

/// All tasks of the active role, ordered by position.
///
/// Tasks are kept in one vector sorted by position with a stable sort, so
/// filtering by status yields each partition in display order and tasks
/// sharing a position keep the order they were fetched in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshot {
    role: Role,
    tasks: Vec<Task>,
}

impl BoardSnapshot {
    /// Creates an empty snapshot for a role.
    #[must_use]
    pub const fn empty(role: Role) -> Self {
        Self {
            role,
            tasks: Vec::new(),
        }
    }

    /// Builds a snapshot from fetched tasks, dropping tasks of other roles.
    #[must_use]
    pub fn new(role: Role, tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut snapshot = Self {
            role,
            tasks: tasks.into_iter().filter(|task| task.role() == role).collect(),
        };
        snapshot.resort();
        snapshot
    }

    /// Returns the role this snapshot belongs to.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns every task in position order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Returns the number of tasks on the board.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns whether the board holds no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Finds a task by identifier.
    #[must_use]
    pub fn find(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id() == id)
    }

    /// Returns the tasks in one stage, top to bottom.
    #[must_use]
    pub fn partition(&self, status: &str) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|task| task.status().as_str() == status)
            .collect()
    }

    /// Returns the identifiers of the tasks in one stage, top to bottom.
    #[must_use]
    pub fn partition_ids(&self, status: &str) -> Vec<TaskId> {
        self.partition(status).into_iter().map(Task::id).collect()
    }

    /// Returns the number of tasks in one stage.
    #[must_use]
    pub fn partition_len(&self, status: &str) -> usize {
        self.tasks
            .iter()
            .filter(|task| task.status().as_str() == status)
            .count()
    }

    /// Projects one column per pipeline stage, in pipeline order.
    #[must_use]
    pub fn columns(&self, pipeline: &Pipeline) -> Vec<ColumnView<'_>> {
        pipeline
            .stages()
            .iter()
            .copied()
            .map(|stage| ColumnView::project(self, stage))
            .collect()
    }

    /// Merges a patch into the matching task without waiting for storage.
    ///
    /// Returns `false` when the task is not on the board.
    pub fn apply_patch(&mut self, id: TaskId, patch: &TaskPatch) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id() == id) else {
            return false;
        };
        task.apply_patch(patch);
        self.resort();
        true
    }

    /// Replaces the board copy of a task with `task`.
    ///
    /// Returns `false` when no task with the same identifier is on the board.
    pub fn replace(&mut self, task: Task) -> bool {
        let Some(slot) = self.tasks.iter_mut().find(|current| current.id() == task.id()) else {
            return false;
        };
        *slot = task;
        self.resort();
        true
    }

    /// Adds a task of this board's role.
    ///
    /// Returns `false` when the task belongs to another role.
    pub fn insert(&mut self, task: Task) -> bool {
        if task.role() != self.role {
            return false;
        }
        self.tasks.retain(|current| current.id() != task.id());
        self.tasks.push(task);
        self.resort();
        true
    }

    /// Removes a task from the board.
    pub fn remove(&mut self, id: TaskId) -> Option<Task> {
        let index = self.tasks.iter().position(|task| task.id() == id)?;
        Some(self.tasks.remove(index))
    }

    /// Copies the current state of the given tasks for a later [`restore`].
    ///
    /// [`restore`]: Self::restore
    #[must_use]
    pub fn capture(&self, ids: &[TaskId]) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|task| ids.contains(&task.id()))
            .cloned()
            .collect()
    }

    /// Puts captured task copies back, re-adding any that were removed.
    pub fn restore(&mut self, captured: Vec<Task>) {
        for task in captured {
            if let Some(slot) = self.tasks.iter_mut().find(|current| current.id() == task.id()) {
                *slot = task;
            } else if task.role() == self.role {
                self.tasks.push(task);
            }
        }
        self.resort();
    }

    fn resort(&mut self) {
        self.tasks.sort_by_key(Task::position);
    }
}
