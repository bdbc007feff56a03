//! Diesel row models for board task storage.

use super::schema::tasks;
use crate::board::{
    domain::{PersistedTaskData, Priority, Role, StageName, Task, TaskId, TaskPatch, UserId},
    ports::{TaskStoreError, TaskStoreResult},
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Pipeline stage name.
    pub status: String,
    /// Priority.
    pub priority: String,
    /// Owning role.
    pub role: String,
    /// Creating user.
    pub created_by: uuid::Uuid,
    /// Optional assignee.
    pub assigned_to: Option<uuid::Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Rank within the stage.
    pub position: i32,
    /// Revision counter.
    pub revision: i64,
}

/// Insert model for task records.
#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Pipeline stage name.
    pub status: String,
    /// Priority.
    pub priority: String,
    /// Owning role.
    pub role: String,
    /// Creating user.
    pub created_by: uuid::Uuid,
    /// Optional assignee.
    pub assigned_to: Option<uuid::Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Rank within the stage.
    pub position: i32,
    /// Revision counter.
    pub revision: i64,
}

/// Column updates derived from a [`TaskPatch`]; `None` fields stay untouched.
#[derive(Debug, Clone, PartialEq, Eq, AsChangeset)]
#[diesel(table_name = tasks)]
pub struct TaskChangeset {
    /// New stage name.
    pub status: Option<String>,
    /// New rank.
    pub position: Option<i32>,
    /// Completion stamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Update stamp.
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<&Task> for NewTaskRow {
    type Error = TaskStoreError;

    fn try_from(task: &Task) -> TaskStoreResult<Self> {
        Ok(Self {
            id: task.id().into_inner(),
            title: task.title().to_owned(),
            description: task.description().map(str::to_owned),
            status: task.status().as_str().to_owned(),
            priority: task.priority().as_str().to_owned(),
            role: task.role().as_str().to_owned(),
            created_by: task.created_by().into_inner(),
            assigned_to: task.assigned_to().map(UserId::into_inner),
            created_at: task.created_at(),
            updated_at: task.updated_at(),
            completed_at: task.completed_at(),
            position: i32::try_from(task.position()).map_err(TaskStoreError::persistence)?,
            revision: i64::try_from(task.revision()).map_err(TaskStoreError::persistence)?,
        })
    }
}

impl TryFrom<&TaskPatch> for TaskChangeset {
    type Error = TaskStoreError;

    fn try_from(patch: &TaskPatch) -> TaskStoreResult<Self> {
        let position = patch
            .position()
            .map(i32::try_from)
            .transpose()
            .map_err(TaskStoreError::persistence)?;
        Ok(Self {
            status: patch.status().map(|status| status.as_str().to_owned()),
            position,
            completed_at: patch.completed_at(),
            updated_at: patch.updated_at(),
        })
    }
}

impl TryFrom<TaskRow> for Task {
    type Error = TaskStoreError;

    fn try_from(row: TaskRow) -> TaskStoreResult<Self> {
        let TaskRow {
            id,
            title,
            description,
            status,
            priority,
            role,
            created_by,
            assigned_to,
            created_at,
            updated_at,
            completed_at,
            position,
            revision,
        } = row;

        let data = PersistedTaskData {
            id: TaskId::from_uuid(id),
            title,
            description,
            status: StageName::new(status).map_err(TaskStoreError::persistence)?,
            priority: Priority::try_from(priority.as_str()).map_err(TaskStoreError::persistence)?,
            role: Role::try_from(role.as_str()).map_err(TaskStoreError::persistence)?,
            created_by: UserId::from_uuid(created_by),
            assigned_to: assigned_to.map(UserId::from_uuid),
            created_at,
            updated_at,
            completed_at,
            position: u32::try_from(position).map_err(TaskStoreError::persistence)?,
            revision: u64::try_from(revision).map_err(TaskStoreError::persistence)?,
        };
        Ok(Self::from_persisted(data))
    }
}
