//! `PostgreSQL` task store.

use super::{
    models::{NewTaskRow, TaskChangeset, TaskRow},
    schema::tasks,
};
use crate::board::{
    adapters::feed::ChangeFeed,
    domain::{Task, TaskId, TaskPatch},
    ports::{
        ChangeKind, ChangeSubscription, StatusFilter, TaskOrder, TaskQuery, TaskStore,
        TaskStoreError, TaskStoreResult,
    },
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by the board adapter.
pub type BoardPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task store.
///
/// Change notifications cover writes made through this store instance;
/// writes from other processes become visible on the next reload.
#[derive(Debug, Clone)]
pub struct PostgresTaskStore {
    pool: BoardPgPool,
    feed: ChangeFeed,
}

impl PostgresTaskStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub fn new(pool: BoardPgPool) -> Self {
        Self {
            pool,
            feed: ChangeFeed::default(),
        }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskStoreError::persistence)?
    }
}

#[async_trait]
impl TaskStore for PostgresTaskStore {
    async fn select(&self, query: &TaskQuery) -> TaskStoreResult<Vec<Task>> {
        let query = query.clone();
        self.run_blocking(move |connection| {
            let rows = select_rows(connection, &query)?;
            rows.into_iter().map(Task::try_from).collect()
        })
        .await
    }

    async fn insert(&self, task: &Task) -> TaskStoreResult<()> {
        let task_id = task.id();
        let new_row = NewTaskRow::try_from(task)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(tasks::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskStoreError::DuplicateTask(task_id)
                    }
                    _ => TaskStoreError::persistence(err),
                })?;
            Ok(())
        })
        .await?;

        self.feed.publish(ChangeKind::Insert, task_id);
        Ok(())
    }

    async fn update(&self, id: TaskId, patch: &TaskPatch) -> TaskStoreResult<Task> {
        let changeset = TaskChangeset::try_from(patch)?;
        let expected_revision = patch
            .expected_revision()
            .map(i64::try_from)
            .transpose()
            .map_err(TaskStoreError::persistence)?;

        let updated = self
            .run_blocking(move |connection| {
                let row = update_row(connection, id, &changeset, expected_revision)?;
                match row {
                    Some(row) => Task::try_from(row),
                    None => Err(explain_missed_update(connection, id, expected_revision)?),
                }
            })
            .await?;

        self.feed.publish(ChangeKind::Update, id);
        Ok(updated)
    }

    async fn delete(&self, id: TaskId) -> TaskStoreResult<()> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(tasks::table.filter(tasks::id.eq(id.into_inner())))
                .execute(connection)
                .map_err(TaskStoreError::persistence)?;
            if deleted == 0 {
                return Err(TaskStoreError::NotFound(id));
            }
            Ok(())
        })
        .await?;

        self.feed.publish(ChangeKind::Delete, id);
        Ok(())
    }

    fn subscribe(&self) -> ChangeSubscription {
        self.feed.subscribe()
    }
}

fn select_rows(connection: &mut PgConnection, query: &TaskQuery) -> TaskStoreResult<Vec<TaskRow>> {
    let mut statement = tasks::table.select(TaskRow::as_select()).into_boxed();

    if let Some(role) = query.role() {
        statement = statement.filter(tasks::role.eq(role.as_str()));
    }
    statement = match query.status() {
        StatusFilter::Any => statement,
        StatusFilter::Is(stage) => statement.filter(tasks::status.eq(stage.as_str().to_owned())),
        StatusFilter::IsNot(stage) => statement.filter(tasks::status.ne(stage.as_str().to_owned())),
    };
    statement = match query.order() {
        TaskOrder::PositionAscending => statement.order((
            tasks::position.asc(),
            tasks::created_at.asc(),
            tasks::id.asc(),
        )),
        TaskOrder::CreatedDescending => {
            statement.order((tasks::created_at.desc(), tasks::id.asc()))
        }
    };

    statement
        .load::<TaskRow>(connection)
        .map_err(TaskStoreError::persistence)
}

/// Applies the changeset and bumps the revision in one conditional statement.
///
/// Returns `None` when no row matched the identifier and expected revision.
fn update_row(
    connection: &mut PgConnection,
    id: TaskId,
    changeset: &TaskChangeset,
    expected_revision: Option<i64>,
) -> TaskStoreResult<Option<TaskRow>> {
    let by_id = tasks::table.filter(tasks::id.eq(id.into_inner()));
    let assignments = (changeset, tasks::revision.eq(tasks::revision + 1_i64));

    let result = match expected_revision {
        Some(revision) => diesel::update(by_id.filter(tasks::revision.eq(revision)))
            .set(assignments)
            .returning(TaskRow::as_returning())
            .get_result::<TaskRow>(connection),
        None => diesel::update(by_id)
            .set(assignments)
            .returning(TaskRow::as_returning())
            .get_result::<TaskRow>(connection),
    };

    result.optional().map_err(TaskStoreError::persistence)
}

/// Distinguishes a missing task from a stale revision after an update
/// matched no row.
fn explain_missed_update(
    connection: &mut PgConnection,
    id: TaskId,
    expected_revision: Option<i64>,
) -> TaskStoreResult<TaskStoreError> {
    let stored_revision = tasks::table
        .filter(tasks::id.eq(id.into_inner()))
        .select(tasks::revision)
        .first::<i64>(connection)
        .optional()
        .map_err(TaskStoreError::persistence)?;

    let Some(stored_revision) = stored_revision else {
        return Ok(TaskStoreError::NotFound(id));
    };
    let to_revision = |value: i64| u64::try_from(value).map_err(TaskStoreError::persistence);
    Ok(TaskStoreError::RevisionConflict {
        task_id: id,
        expected: expected_revision.map(to_revision).transpose()?.unwrap_or_default(),
        actual: to_revision(stored_revision)?,
    })
}
