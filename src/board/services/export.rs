//! CSV report export over the whole task collection.

use crate::board::{
    domain::{ParseRoleError, Role, StageName, Task},
    ports::{StatusFilter, TaskOrder, TaskQuery, TaskStore, TaskStoreError},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

const CSV_HEADER: &str = "Title,Description,Status,Priority,Role,Created At,Completed At";
const DATE_FORMAT: &str = "%Y-%m-%d";
const MISSING_DATE: &str = "N/A";

/// Completion filter for reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportStatus {
    /// Every task.
    #[default]
    All,
    /// Tasks outside the terminal stage.
    Pending,
    /// Tasks in the terminal stage.
    Completed,
}

impl ReportStatus {
    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }

    fn filter(self) -> StatusFilter {
        match self {
            Self::All => StatusFilter::Any,
            Self::Pending => StatusFilter::IsNot(StageName::terminal()),
            Self::Completed => StatusFilter::Is(StageName::terminal()),
        }
    }
}

impl TryFrom<&str> for ReportStatus {
    type Error = ExportError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            _ => Err(ExportError::UnknownStatus(value.to_owned())),
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filters for one report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportRequest {
    role: Option<Role>,
    status: ReportStatus,
}

impl ExportRequest {
    /// Creates a request covering every role and status.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses filters in the `all | <role>` and `all | pending | completed`
    /// forms accepted from operators.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] for an unknown role or status, or for the
    /// privileged role, which owns no tasks.
    pub fn parse(role: &str, status: &str) -> ExportResult<Self> {
        let request = Self::new().with_status(ReportStatus::try_from(status)?);
        let raw_role = role.trim();
        if raw_role.eq_ignore_ascii_case("all") {
            return Ok(request);
        }
        match Role::try_from(raw_role)? {
            privileged if privileged.is_privileged() => {
                Err(ExportError::RoleWithoutTasks(privileged))
            }
            working => Ok(request.for_role(working)),
        }
    }

    /// Restricts the report to one role.
    #[must_use]
    pub const fn for_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Restricts the report by completion.
    #[must_use]
    pub const fn with_status(mut self, status: ReportStatus) -> Self {
        self.status = status;
        self
    }

    /// Returns the role filter.
    #[must_use]
    pub const fn role(&self) -> Option<Role> {
        self.role
    }

    /// Returns the completion filter.
    #[must_use]
    pub const fn status(&self) -> ReportStatus {
        self.status
    }

    /// Builds the store query: filtered, newest first.
    #[must_use]
    pub fn query(&self) -> TaskQuery {
        TaskQuery::all()
            .with_role_filter(self.role)
            .with_status(self.status.filter())
            .ordered_by(TaskOrder::CreatedDescending)
    }
}

/// Rendered CSV report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReport {
    filename: String,
    csv: String,
    row_count: usize,
}

impl TaskReport {
    /// Returns the suggested file name, stamped with the export date.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Returns the CSV text.
    #[must_use]
    pub fn csv(&self) -> &str {
        &self.csv
    }

    /// Returns the number of task rows, excluding the header.
    #[must_use]
    pub const fn row_count(&self) -> usize {
        self.row_count
    }
}

/// Errors returned by report export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The role filter is not a known role.
    #[error(transparent)]
    UnknownRole(#[from] ParseRoleError),
    /// The status filter is not `all`, `pending`, or `completed`.
    #[error("unknown report status: {0}")]
    UnknownStatus(String),
    /// The role has no pipeline and therefore no tasks to report.
    #[error("role '{0}' owns no tasks")]
    RoleWithoutTasks(Role),
    /// The task store failed.
    #[error(transparent)]
    Store(#[from] TaskStoreError),
}

/// Result type for report export.
pub type ExportResult<T> = Result<T, ExportError>;

/// Report export service.
///
/// Callers check the export privilege with
/// [`Session::ensure_can_export`](crate::board::domain::Session::ensure_can_export)
/// before invoking it.
#[derive(Clone)]
pub struct ReportService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> ReportService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    /// Creates a report service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Exports the tasks matching `request` as CSV.
    ///
    /// Returns `Ok(None)` when no task matches.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Store`] when the query fails.
    pub async fn export(&self, request: &ExportRequest) -> ExportResult<Option<TaskReport>> {
        let tasks = self.store.select(&request.query()).await?;
        if tasks.is_empty() {
            debug!(role = ?request.role(), status = %request.status(), "no tasks to export");
            return Ok(None);
        }

        let report = TaskReport {
            filename: report_filename(self.clock.utc()),
            csv: render_csv(&tasks),
            row_count: tasks.len(),
        };
        info!(
            role = ?request.role(),
            status = %request.status(),
            rows = report.row_count,
            "exported task report"
        );
        Ok(Some(report))
    }
}

fn report_filename(now: DateTime<Utc>) -> String {
    format!("tasks-report-{}.csv", now.format(DATE_FORMAT))
}

/// Renders tasks as CSV: header line, then one line per task joined by `\n`.
#[must_use]
pub fn render_csv(tasks: &[Task]) -> String {
    std::iter::once(CSV_HEADER.to_owned())
        .chain(tasks.iter().map(csv_row))
        .collect::<Vec<_>>()
        .join("\n")
}

fn csv_row(task: &Task) -> String {
    let completed_at = task.completed_at().map_or_else(
        || MISSING_DATE.to_owned(),
        |stamp| stamp.format(DATE_FORMAT).to_string(),
    );
    [
        quoted(task.title()),
        quoted(task.description().unwrap_or_default()),
        task.status().to_string(),
        task.priority().as_str().to_owned(),
        task.role().as_str().to_owned(),
        task.created_at().format(DATE_FORMAT).to_string(),
        completed_at,
    ]
    .join(",")
}

fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}
