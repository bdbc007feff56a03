//! In-memory integration tests for the board service.

use super::helpers::{open_board, seed_designer_board, stage_titles, store};
use agency_board::board::{
    adapters::memory::InMemoryTaskStore,
    domain::{DragResolution, DropTarget, Priority, Role, StageName, TaskPatch},
    ports::{TaskQuery, TaskStore},
    services::{BoardError, CompletionOutcome, CreateTaskRequest},
};
use mockable::DefaultClock;
use rstest::rstest;
use std::sync::Arc;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reorder_reaches_another_client(store: Arc<InMemoryTaskStore>) -> Result<(), eyre::Report> {
    let ids = seed_designer_board(&store).await?;
    let mut designer = open_board(&store, Role::Designer).await?;
    let mut admin = open_board(&store, Role::Admin).await?;
    admin.switch_role(Role::Designer).await?;

    designer.drag_start(ids.c);
    designer.drag_end(Some(DropTarget::Task(ids.a))).await?;

    // One notification per rewritten position; reload until the last lands.
    for _ in 0..3 {
        eyre::ensure!(
            admin.next_change().await?.is_some(),
            "change feed closed before the reorder arrived"
        );
    }
    assert_eq!(stage_titles(&admin, "TO DO LIST"), vec!["C", "A", "B"]);
    assert_eq!(
        admin.snapshot().partition_ids("TO DO LIST"),
        designer.snapshot().partition_ids("TO DO LIST")
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn task_travels_the_pipeline_and_is_cleared(
    store: Arc<InMemoryTaskStore>,
) -> Result<(), eyre::Report> {
    seed_designer_board(&store).await?;
    let mut board = open_board(&store, Role::Designer).await?;

    let created = board
        .create_task(CreateTaskRequest::new("Shopfront decal").with_priority(Priority::High))
        .await?;
    assert_eq!(stage_titles(&board, "TO DO LIST"), vec!["A", "B", "C", "Shopfront decal"]);

    board.drag_start(created.id());
    let resolution = board
        .drag_end(Some(DropTarget::Column(StageName::new("PRODUCTION")?)))
        .await?;
    assert!(matches!(resolution, DragResolution::Transition(_)));
    assert_eq!(stage_titles(&board, "PRODUCTION"), vec!["X", "Shopfront decal"]);

    let completed = board.complete_task(created.id()).await?;
    assert!(matches!(completed, CompletionOutcome::Completed(ref task) if task.is_done()));

    let cleared = board.complete_task(created.id()).await?;
    assert_eq!(cleared, CompletionOutcome::Deleted(created.id()));
    let remaining = store.select(&TaskQuery::board(Role::Designer)).await?;
    assert_eq!(remaining.len(), 4);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn conflicting_reorder_recovers_on_retry(
    store: Arc<InMemoryTaskStore>,
) -> Result<(), eyre::Report> {
    let ids = seed_designer_board(&store).await?;
    let mut board = open_board(&store, Role::Designer).await?;
    store
        .update(ids.a, &TaskPatch::new(&DefaultClock).with_position(0))
        .await?;

    board.drag_start(ids.c);
    let first_attempt = board.drag_end(Some(DropTarget::Task(ids.a))).await;
    let Err(BoardError::Store(err)) = first_attempt else {
        return Err(eyre::eyre!("expected a conflict, got {first_attempt:?}"));
    };
    eyre::ensure!(err.is_conflict(), "expected a revision conflict, got {err}");

    let order = board.snapshot().partition_ids("TO DO LIST");
    let (Some(top), Some(bottom)) = (order.first().copied(), order.last().copied()) else {
        return Err(eyre::eyre!("reloaded board lost its tasks"));
    };
    board.drag_start(bottom);
    board.drag_end(Some(DropTarget::Task(top))).await?;

    let stored = store.select(&TaskQuery::board(Role::Designer)).await?;
    let positions: Vec<u32> = stored
        .iter()
        .filter(|task| task.status().as_str() == "TO DO LIST")
        .map(|task| task.position())
        .collect();
    assert_eq!(positions, vec![0, 1, 2]);
    Ok(())
}
