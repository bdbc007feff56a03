//! Shared builders for board unit tests.

use crate::board::domain::{
    NewTaskData, PersistedTaskData, Priority, Role, StageName, Task, TaskId, UserId,
};
use chrono::{DateTime, TimeZone, Utc};
use mockable::DefaultClock;

/// Builds a fresh task in `stage` at `position`.
pub fn task_at(role: Role, stage: &str, position: u32, title: &str) -> Task {
    Task::new(
        NewTaskData {
            title: title.to_owned(),
            description: None,
            priority: Priority::Medium,
            role,
            status: StageName::new(stage).expect("valid stage"),
            position,
            created_by: UserId::new(),
            assigned_to: None,
        },
        &DefaultClock,
    )
    .expect("valid task")
}

/// Builds a stored task with explicit timestamps for ordering tests.
pub fn stored_task(
    role: Role,
    stage: &str,
    title: &str,
    priority: Priority,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
) -> Task {
    Task::from_persisted(PersistedTaskData {
        id: TaskId::new(),
        title: title.to_owned(),
        description: None,
        status: StageName::new(stage).expect("valid stage"),
        priority,
        role,
        created_by: UserId::new(),
        assigned_to: None,
        created_at,
        updated_at: completed_at.unwrap_or(created_at),
        completed_at,
        position: 0,
        revision: 0,
    })
}

/// Returns a UTC timestamp on the given day at noon.
pub fn day(year: i32, month: u32, date: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, date, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}
