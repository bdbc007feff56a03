//! Shared test helpers for in-memory store integration tests.

use agency_board::board::{
    adapters::memory::InMemoryTaskStore,
    domain::{NewTaskData, Priority, Role, Session, StageName, Task, TaskId, UserId},
    ports::TaskStore,
    services::BoardService,
};
use mockable::DefaultClock;
use rstest::fixture;
use std::sync::Arc;

/// Board service type used by the integration tests.
pub type TestBoard = BoardService<InMemoryTaskStore, DefaultClock>;

/// Provides a fresh, shared in-memory store for each test.
#[fixture]
pub fn store() -> Arc<InMemoryTaskStore> {
    Arc::new(InMemoryTaskStore::new())
}

/// Builds a task for `role` in `stage` at `position`.
///
/// # Errors
///
/// Returns an error if the stage or title is invalid.
pub fn task(
    role: Role,
    stage: &str,
    position: u32,
    title: &str,
    priority: Priority,
) -> Result<Task, eyre::Report> {
    let task = Task::new(
        NewTaskData {
            title: title.to_owned(),
            description: None,
            priority,
            role,
            status: StageName::new(stage)?,
            position,
            created_by: UserId::new(),
            assigned_to: None,
        },
        &DefaultClock,
    )?;
    Ok(task)
}

/// Identifiers of the seeded designer board.
#[derive(Debug, Clone, Copy)]
pub struct DesignerIds {
    /// `A`, first in `TO DO LIST`.
    pub a: TaskId,
    /// `B`, second in `TO DO LIST`.
    pub b: TaskId,
    /// `C`, last in `TO DO LIST`.
    pub c: TaskId,
    /// `X`, alone in `PRODUCTION`.
    pub x: TaskId,
}

/// Seeds `A`, `B`, `C` in `TO DO LIST` and `X` in `PRODUCTION` of the
/// designer pipeline.
///
/// # Errors
///
/// Returns an error if task construction or insertion fails.
pub async fn seed_designer_board(store: &InMemoryTaskStore) -> Result<DesignerIds, eyre::Report> {
    let a = task(Role::Designer, "TO DO LIST", 0, "A", Priority::Medium)?;
    let b = task(Role::Designer, "TO DO LIST", 1, "B", Priority::Medium)?;
    let c = task(Role::Designer, "TO DO LIST", 2, "C", Priority::Medium)?;
    let x = task(Role::Designer, "PRODUCTION", 0, "X", Priority::Medium)?;
    for seeded in [&a, &b, &c, &x] {
        store.insert(seeded).await?;
    }
    Ok(DesignerIds {
        a: a.id(),
        b: b.id(),
        c: c.id(),
        x: x.id(),
    })
}

/// Opens a board over `store` for a new user holding `role`.
///
/// # Errors
///
/// Returns an error if the initial load fails.
pub async fn open_board(
    store: &Arc<InMemoryTaskStore>,
    role: Role,
) -> Result<TestBoard, eyre::Report> {
    let session = Session::new(UserId::new(), role);
    let board = BoardService::open(Arc::clone(store), Arc::new(DefaultClock), session).await?;
    Ok(board)
}

/// Returns the titles of one stage, top to bottom.
pub fn stage_titles(board: &TestBoard, stage: &str) -> Vec<String> {
    board
        .snapshot()
        .partition(stage)
        .into_iter()
        .map(|task| task.title().to_owned())
        .collect()
}
