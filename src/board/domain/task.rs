//! Task aggregate root and the partial updates applied to it.

use super::{BoardDomainError, Priority, Role, StageName, TaskId, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Unit of work on a role's pipeline board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: String,
    description: Option<String>,
    status: StageName,
    priority: Priority,
    role: Role,
    created_by: UserId,
    assigned_to: Option<UserId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    position: u32,
    revision: u64,
}

/// Parameter object for creating a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTaskData {
    /// Task title; must not be blank.
    pub title: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Task urgency.
    pub priority: Priority,
    /// Role whose pipeline owns the task.
    pub role: Role,
    /// Initial stage.
    pub status: StageName,
    /// Initial rank within the stage.
    pub position: u32,
    /// User creating the task.
    pub created_by: UserId,
    /// Optional assignee.
    pub assigned_to: Option<UserId>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted title.
    pub title: String,
    /// Persisted description.
    pub description: Option<String>,
    /// Persisted stage.
    pub status: StageName,
    /// Persisted priority.
    pub priority: Priority,
    /// Persisted owning role.
    pub role: Role,
    /// Persisted creator.
    pub created_by: UserId,
    /// Persisted assignee.
    pub assigned_to: Option<UserId>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Persisted completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Persisted rank within the stage.
    pub position: u32,
    /// Persisted revision counter.
    pub revision: u64,
}

impl Task {
    /// Creates a new task at revision zero.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::EmptyTitle`] when the title is blank.
    pub fn new(data: NewTaskData, clock: &impl Clock) -> Result<Self, BoardDomainError> {
        let title = data.title.trim();
        if title.is_empty() {
            return Err(BoardDomainError::EmptyTitle);
        }
        let description = data
            .description
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty());
        let timestamp = clock.utc();

        Ok(Self {
            id: TaskId::new(),
            title: title.to_owned(),
            description,
            status: data.status,
            priority: data.priority,
            role: data.role,
            created_by: data.created_by,
            assigned_to: data.assigned_to,
            created_at: timestamp,
            updated_at: timestamp,
            completed_at: None,
            position: data.position,
            revision: 0,
        })
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            status: data.status,
            priority: data.priority,
            role: data.role,
            created_by: data.created_by,
            assigned_to: data.assigned_to,
            created_at: data.created_at,
            updated_at: data.updated_at,
            completed_at: data.completed_at,
            position: data.position,
            revision: data.revision,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the current stage.
    #[must_use]
    pub const fn status(&self) -> &StageName {
        &self.status
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the owning role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns the creator.
    #[must_use]
    pub const fn created_by(&self) -> UserId {
        self.created_by
    }

    /// Returns the assignee, if any.
    #[must_use]
    pub const fn assigned_to(&self) -> Option<UserId> {
        self.assigned_to
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the completion timestamp, if the task has been completed.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the rank within the task's stage.
    #[must_use]
    pub const fn position(&self) -> u32 {
        self.position
    }

    /// Returns the storage revision this copy was read at.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns whether the task sits in the terminal stage.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.status.is_terminal()
    }

    /// Merges the fields set in `patch` into this task.
    ///
    /// The revision is left alone; stores advance it when they accept the
    /// patch.
    pub fn apply_patch(&mut self, patch: &TaskPatch) {
        if let Some(status) = &patch.status {
            self.status = status.clone();
        }
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(completed_at) = patch.completed_at {
            self.completed_at = Some(completed_at);
        }
        self.updated_at = patch.updated_at;
    }

    /// Marks a stored update by moving to the next revision.
    pub(crate) const fn advance_revision(&mut self) {
        self.revision = self.revision.saturating_add(1);
    }
}

/// Partial update for a single task, keyed externally by [`TaskId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPatch {
    status: Option<StageName>,
    position: Option<u32>,
    completed_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
    expected_revision: Option<u64>,
}

impl TaskPatch {
    /// Creates an empty patch stamped with the current clock time.
    #[must_use]
    pub fn new(clock: &impl Clock) -> Self {
        Self::at(clock.utc())
    }

    /// Creates an empty patch stamped with `updated_at`.
    #[must_use]
    pub const fn at(updated_at: DateTime<Utc>) -> Self {
        Self {
            status: None,
            position: None,
            completed_at: None,
            updated_at,
            expected_revision: None,
        }
    }

    /// Sets the new stage.
    #[must_use]
    pub fn with_status(mut self, status: StageName) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the new rank within the stage.
    #[must_use]
    pub const fn with_position(mut self, position: u32) -> Self {
        self.position = Some(position);
        self
    }

    /// Stamps the completion time.
    #[must_use]
    pub const fn with_completed_at(mut self, completed_at: DateTime<Utc>) -> Self {
        self.completed_at = Some(completed_at);
        self
    }

    /// Requires the stored task to still be at `revision`.
    #[must_use]
    pub const fn expecting_revision(mut self, revision: u64) -> Self {
        self.expected_revision = Some(revision);
        self
    }

    /// Returns the new stage, if set.
    #[must_use]
    pub const fn status(&self) -> Option<&StageName> {
        self.status.as_ref()
    }

    /// Returns the new rank, if set.
    #[must_use]
    pub const fn position(&self) -> Option<u32> {
        self.position
    }

    /// Returns the completion stamp, if set.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the update stamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the revision the caller read, if the patch is conditional.
    #[must_use]
    pub const fn expected_revision(&self) -> Option<u64> {
        self.expected_revision
    }

    /// Returns whether the patch may be applied to a task at `revision`.
    #[must_use]
    pub fn accepts_revision(&self, revision: u64) -> bool {
        self.expected_revision
            .is_none_or(|expected| expected == revision)
    }
}
