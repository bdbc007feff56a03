//! Error types for board domain validation and parsing.

use super::{Role, TaskId};
use thiserror::Error;

/// Errors returned while constructing or mutating domain board values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BoardDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The stage name is empty after trimming.
    #[error("stage name must not be empty")]
    EmptyStageName,

    /// The role has no pipeline stages of its own.
    #[error("role '{0}' has no pipeline stages")]
    EmptyPipeline(Role),

    /// The task position does not fit the persisted integer range.
    #[error("task position {0} is out of range")]
    PositionOutOfRange(i64),

    /// The session role may not switch to the requested viewing role.
    #[error("role '{permission_role}' may not view the '{requested}' pipeline")]
    ViewNotPermitted {
        /// Role the session acts with.
        permission_role: Role,
        /// Viewing role that was requested.
        requested: Role,
    },

    /// The session role may not delete tasks.
    #[error("role '{0}' may not delete task")]
    DeleteNotPermitted(Role),

    /// The session role may not export reports.
    #[error("role '{0}' may not export reports")]
    ExportNotPermitted(Role),

    /// The task is not part of the current board snapshot.
    #[error("task {0} is not on the board")]
    TaskNotOnBoard(TaskId),
}

/// Error returned while parsing roles from persistence or user input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);

/// Error returned while parsing priorities from persistence or user input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown priority: {0}")]
pub struct ParsePriorityError(pub String);
