//! Domain model for the pipeline board.
//!
//! Roles, pipelines, tasks, the client-side board snapshot, and the drag
//! gesture state machine. All infrastructure concerns stay outside of the
//! domain boundary.

mod column;
mod drag;
mod error;
mod ids;
mod pipeline;
mod role;
mod session;
mod snapshot;
mod task;

pub use column::ColumnView;
pub use drag::{
    DragResolution, DragState, DropTarget, NoOpReason, ReorderPlan, TransitionPlan, resolve_drop,
};
pub use error::{BoardDomainError, ParsePriorityError, ParseRoleError};
pub use ids::{TaskId, UserId};
pub use pipeline::{Pipeline, StageName, TERMINAL_STAGE};
pub use role::{Priority, Role};
pub use session::Session;
pub use snapshot::BoardSnapshot;
pub use task::{NewTaskData, PersistedTaskData, Task, TaskPatch};
