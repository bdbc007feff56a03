//! Then steps for drag and drop BDD scenarios.

use super::world::{DragWorld, run_async, titles};
use agency_board::board::{
    domain::{DragResolution, Role},
    ports::{TaskQuery, TaskStore},
    services::CompletionOutcome,
};
use rstest_bdd_macros::then;

#[then(r#"the "{stage}" stage reads "{list}""#)]
fn stage_reads(world: &DragWorld, stage: String, list: String) -> Result<(), eyre::Report> {
    let shown: Vec<String> = world
        .board()?
        .snapshot()
        .partition(&stage)
        .into_iter()
        .map(|task| task.title().to_owned())
        .collect();
    let expected = titles(&list);
    if shown != expected {
        return Err(eyre::eyre!("expected {stage} to read {expected:?}, found {shown:?}"));
    }
    Ok(())
}

#[then(r#"the stored "{stage}" positions are dense"#)]
fn stored_positions_dense(world: &DragWorld, stage: String) -> Result<(), eyre::Report> {
    let stored = run_async(world.store.select(&TaskQuery::board(Role::Designer)))?;
    let positions: Vec<u32> = stored
        .iter()
        .filter(|task| task.status().as_str() == stage)
        .map(|task| task.position())
        .collect();
    let expected: Vec<u32> = (0..).take(positions.len()).collect();
    if positions != expected {
        return Err(eyre::eyre!("expected dense positions, found {positions:?}"));
    }
    Ok(())
}

#[then("the drop is ignored")]
fn drop_is_ignored(world: &DragWorld) -> Result<(), eyre::Report> {
    let resolution = world
        .last_resolution
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing drop result"))?;
    if !matches!(resolution, Ok(DragResolution::NoOp(_))) {
        return Err(eyre::eyre!("expected a no-op drop, got {resolution:?}"));
    }
    Ok(())
}

#[then(r#"card "{title}" is in "{stage}""#)]
fn card_is_in(world: &DragWorld, title: String, stage: String) -> Result<(), eyre::Report> {
    let id = world.card(&title)?;
    let task = world
        .board()?
        .snapshot()
        .find(id)
        .ok_or_else(|| eyre::eyre!("card {title} is missing from the board"))?;
    if task.status().as_str() != stage {
        return Err(eyre::eyre!("expected {title} in {stage}, found {}", task.status()));
    }
    Ok(())
}

#[then(r#"card "{title}" is no longer on the board"#)]
fn card_is_gone(world: &DragWorld, title: String) -> Result<(), eyre::Report> {
    let id = world.card(&title)?;
    if world.board()?.snapshot().find(id).is_some() {
        return Err(eyre::eyre!("card {title} is still on the board"));
    }
    if world.last_completion != Some(CompletionOutcome::Deleted(id)) {
        return Err(eyre::eyre!(
            "expected the card to be deleted, got {:?}",
            world.last_completion
        ));
    }
    Ok(())
}
