//! Exports a CSV task report from the `PostgreSQL` task store.
//!
//! Usage:
//!
//! ```text
//! board_report [--role all|estimation|designer|operations]
//!              [--status all|pending|completed]
//!              [--output-dir <dir>]
//! ```
//!
//! The connection URL is read from `DATABASE_URL`. The report is written to
//! `<output-dir>/tasks-report-<YYYY-MM-DD>.csv`; nothing is written when no
//! task matches the filters. Log verbosity follows `RUST_LOG`.

use agency_board::board::{
    adapters::postgres::{BoardPgPool, PostgresTaskStore},
    services::{ExportError, ExportRequest, ReportService},
};
use agency_board::config::{ConfigError, DatabaseConfig};
use clap::Parser;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use mockable::DefaultClock;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::runtime::Builder;
use tracing_subscriber::EnvFilter;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "board_report", version, about = "Export pipeline board tasks as CSV")]
struct Args {
    /// Role whose tasks to include, or `all`.
    #[arg(long, default_value = "all")]
    role: String,

    /// Completion filter: `all`, `pending`, or `completed`.
    #[arg(long, default_value = "all")]
    status: String,

    /// Directory receiving the report file.
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

/// Errors that end the export run.
#[derive(Debug, Error)]
enum ReportCliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to build connection pool: {0}")]
    Pool(#[from] PoolError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("failed to start runtime: {0}")]
    Runtime(#[source] std::io::Error),
    #[error("failed to write report to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn main() -> Result<(), ReportCliError> {
    init_tracing();
    let args = Args::parse();
    let request = ExportRequest::parse(&args.role, &args.status)?;
    let config = DatabaseConfig::from_env()?;
    let pool = build_pool(&config)?;
    let service = ReportService::new(
        Arc::new(PostgresTaskStore::new(pool)),
        Arc::new(DefaultClock),
    );

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(ReportCliError::Runtime)?;
    let Some(report) = runtime.block_on(service.export(&request))? else {
        tracing::warn!(role = %args.role, status = %args.status, "no tasks match the selected filters");
        return Ok(());
    };

    let path = args.output_dir.join(report.filename());
    std::fs::write(&path, report.csv()).map_err(|source| ReportCliError::Write {
        path: path.clone(),
        source,
    })?;
    tracing::info!(path = %path.display(), rows = report.row_count(), "wrote task report");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn build_pool(config: &DatabaseConfig) -> Result<BoardPgPool, PoolError> {
    Pool::builder()
        .max_size(config.pool_size())
        .build(ConnectionManager::<PgConnection>::new(config.url()))
}
