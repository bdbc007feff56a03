//! Read-only projection of one pipeline stage.

use super::{BoardSnapshot, DropTarget, StageName, Task};

/// Tasks of one stage in display order, with their drop-target identities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnView<'a> {
    stage: &'a str,
    tasks: Vec<&'a Task>,
}

impl<'a> ColumnView<'a> {
    /// Projects the column for `stage` out of a snapshot.
    #[must_use]
    pub fn project(snapshot: &'a BoardSnapshot, stage: &'a str) -> Self {
        Self {
            stage,
            tasks: snapshot.partition(stage),
        }
    }

    /// Returns the stage name shown as the column title.
    #[must_use]
    pub const fn stage(&self) -> &'a str {
        self.stage
    }

    /// Returns the tasks top to bottom.
    #[must_use]
    pub fn tasks(&self) -> &[&'a Task] {
        &self.tasks
    }

    /// Returns the number of tasks in the column.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns whether the column is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Returns the target used when a card is dropped on the column itself.
    ///
    /// Returns `None` only for a blank stage name, which pipelines never
    /// contain.
    #[must_use]
    pub fn drop_target(&self) -> Option<DropTarget> {
        StageName::new(self.stage).ok().map(DropTarget::Column)
    }

    /// Returns the drop targets of the cards, top to bottom.
    pub fn task_targets(&self) -> impl Iterator<Item = DropTarget> + '_ {
        self.tasks.iter().map(|task| DropTarget::Task(task.id()))
    }
}
