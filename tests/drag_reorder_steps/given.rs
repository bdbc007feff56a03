//! Given steps for drag and drop BDD scenarios.

use super::world::{DragWorld, run_async, titles};
use agency_board::board::{
    domain::{NewTaskData, Priority, Role, Session, StageName, Task, UserId},
    ports::TaskStore,
    services::BoardService,
};
use eyre::WrapErr;
use mockable::DefaultClock;
use rstest_bdd_macros::given;
use std::sync::Arc;

#[given(r#"designer cards "{list}" in "{stage}""#)]
fn designer_cards(world: &mut DragWorld, list: String, stage: String) -> Result<(), eyre::Report> {
    for (index, title) in titles(&list).into_iter().enumerate() {
        let task = Task::new(
            NewTaskData {
                title: title.clone(),
                description: None,
                priority: Priority::Medium,
                role: Role::Designer,
                status: StageName::new(stage.as_str())?,
                position: u32::try_from(index)?,
                created_by: UserId::new(),
                assigned_to: None,
            },
            &DefaultClock,
        )?;
        run_async(world.store.insert(&task)).wrap_err("seed card for drag scenario")?;
        world.cards.insert(title, task.id());
    }
    Ok(())
}

#[given("the designer board is open")]
fn designer_board_open(world: &mut DragWorld) -> Result<(), eyre::Report> {
    let session = Session::new(UserId::new(), Role::Designer);
    let board = run_async(BoardService::open(
        Arc::clone(&world.store),
        Arc::new(DefaultClock),
        session,
    ))
    .wrap_err("open designer board")?;
    world.board = Some(board);
    Ok(())
}
