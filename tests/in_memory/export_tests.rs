//! In-memory integration tests for report export.

use super::helpers::{open_board, seed_designer_board, store, task};
use agency_board::board::{
    adapters::memory::InMemoryTaskStore,
    domain::{Priority, Role},
    ports::TaskStore,
    services::{ExportRequest, ReportService, ReportStatus},
};
use mockable::DefaultClock;
use rstest::rstest;
use std::sync::Arc;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn report_reflects_tasks_completed_on_the_board(
    store: Arc<InMemoryTaskStore>,
) -> Result<(), eyre::Report> {
    let ids = seed_designer_board(&store).await?;
    store
        .insert(&task(Role::Operations, "DELIVERY", 0, "Van run", Priority::Low)?)
        .await?;
    let mut board = open_board(&store, Role::Designer).await?;
    board.complete_task(ids.x).await?;

    let reports = ReportService::new(Arc::clone(&store), Arc::new(DefaultClock));
    let completed = ExportRequest::new()
        .for_role(Role::Designer)
        .with_status(ReportStatus::Completed);
    let Some(report) = reports.export(&completed).await? else {
        return Err(eyre::eyre!("completed export produced no report"));
    };

    assert_eq!(report.row_count(), 1);
    let mut lines = report.csv().lines();
    assert_eq!(
        lines.next(),
        Some("Title,Description,Status,Priority,Role,Created At,Completed At")
    );
    let row = lines.next().unwrap_or_default();
    assert!(row.starts_with("\"X\",\"\",DONE,medium,designer,"));
    assert!(!row.ends_with("N/A"));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pending_report_spans_every_role(store: Arc<InMemoryTaskStore>) -> Result<(), eyre::Report> {
    seed_designer_board(&store).await?;
    store
        .insert(&task(Role::Operations, "DELIVERY", 0, "Van run", Priority::Low)?)
        .await?;

    let reports = ReportService::new(Arc::clone(&store), Arc::new(DefaultClock));
    let pending = ExportRequest::parse("all", "pending")?;
    let Some(report) = reports.export(&pending).await? else {
        return Err(eyre::eyre!("pending export produced no report"));
    };

    assert_eq!(report.row_count(), 5);
    assert!(report.csv().lines().skip(1).all(|row| row.ends_with(",N/A")));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn empty_store_yields_no_report(store: Arc<InMemoryTaskStore>) -> Result<(), eyre::Report> {
    let reports = ReportService::new(store, Arc::new(DefaultClock));

    let report = reports.export(&ExportRequest::new()).await?;

    assert!(report.is_none());
    Ok(())
}
