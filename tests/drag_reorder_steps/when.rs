//! When steps for drag and drop BDD scenarios.

use super::world::{DragWorld, run_async};
use agency_board::board::domain::{DropTarget, StageName};
use eyre::WrapErr;
use rstest_bdd_macros::when;

fn release(
    world: &mut DragWorld,
    title: &str,
    target: Option<DropTarget>,
) -> Result<(), eyre::Report> {
    let id = world.card(title)?;
    let board = world.board_mut()?;
    if !board.drag_start(id) {
        return Err(eyre::eyre!("card {title} could not be picked up"));
    }
    let result = run_async(board.drag_end(target));
    world.last_resolution = Some(result);
    Ok(())
}

#[when(r#"card "{dragged}" is dropped on card "{target}""#)]
fn dropped_on_card(world: &mut DragWorld, dragged: String, target: String) -> Result<(), eyre::Report> {
    let over = world.card(&target)?;
    release(world, &dragged, Some(DropTarget::Task(over)))
}

#[when(r#"card "{dragged}" is dropped on the "{stage}" column"#)]
fn dropped_on_column(world: &mut DragWorld, dragged: String, stage: String) -> Result<(), eyre::Report> {
    let column = StageName::new(stage.as_str())?;
    release(world, &dragged, Some(DropTarget::Column(column)))
}

#[when(r#"card "{dragged}" is released outside the board"#)]
fn released_outside(world: &mut DragWorld, dragged: String) -> Result<(), eyre::Report> {
    release(world, &dragged, None)
}

#[when(r#"card "{title}" is completed"#)]
fn card_completed(world: &mut DragWorld, title: String) -> Result<(), eyre::Report> {
    let id = world.card(&title)?;
    let outcome = run_async(world.board_mut()?.complete_task(id)).wrap_err("complete card")?;
    world.last_completion = Some(outcome);
    Ok(())
}
