//! Drag gesture state machine and drop resolution.
//!
//! A gesture moves `Idle → Dragging → Idle`. Releasing the card resolves the
//! gesture into a [`DragResolution`]: either nothing to do, a reorder of one
//! stage, or a transition of the dragged task to another stage. Resolution is
//! pure; persisting the outcome belongs to the board service.

use super::{BoardDomainError, BoardSnapshot, Pipeline, StageName, Task, TaskId};
use std::fmt;

/// Identity of the element a card was released over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// The body of a stage column.
    Column(StageName),
    /// Another card on the board.
    Task(TaskId),
    /// An identifier matching neither a column nor a known card shape.
    Unknown(String),
}

impl DropTarget {
    /// Classifies a raw drop-target identifier against the viewed pipeline.
    ///
    /// Column names win over task identifiers.
    #[must_use]
    pub fn identify(raw: &str, pipeline: &Pipeline) -> Self {
        if let Some(stage) = pipeline.stage(raw) {
            return Self::Column(stage);
        }
        TaskId::parse(raw).map_or_else(|| Self::Unknown(raw.to_owned()), Self::Task)
    }
}

impl fmt::Display for DropTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Column(stage) => write!(f, "{stage}"),
            Self::Task(id) => write!(f, "{id}"),
            Self::Unknown(raw) => f.write_str(raw),
        }
    }
}

/// Phase of the current drag gesture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    /// No card is being dragged.
    #[default]
    Idle,
    /// A card is being dragged.
    Dragging {
        /// Board copy of the dragged task taken when the gesture started.
        active: Box<Task>,
    },
}

impl DragState {
    /// Starts a gesture for the task with `task_id`.
    ///
    /// Returns `false` and stays idle when the task is not on the board.
    pub fn start(&mut self, snapshot: &BoardSnapshot, task_id: TaskId) -> bool {
        let Some(task) = snapshot.find(task_id) else {
            return false;
        };
        *self = Self::Dragging {
            active: Box::new(task.clone()),
        };
        true
    }

    /// Returns the dragged task, if a gesture is in progress.
    #[must_use]
    pub fn active(&self) -> Option<&Task> {
        match self {
            Self::Idle => None,
            Self::Dragging { active } => Some(active),
        }
    }

    /// Returns whether a gesture is in progress.
    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }

    /// Ends the gesture and hands back the dragged task.
    pub fn finish(&mut self) -> Option<Task> {
        match std::mem::take(self) {
            Self::Idle => None,
            Self::Dragging { active } => Some(*active),
        }
    }
}

/// Why a released gesture needs no persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoOpReason {
    /// The card was released outside every drop target.
    Cancelled,
    /// No gesture was in progress.
    NotDragging,
    /// The dragged task disappeared from the board mid-gesture.
    ActiveTaskMissing,
    /// The card was dropped on its own column body.
    DroppedOnOwnColumn,
    /// The card was dropped on itself.
    DroppedInPlace,
    /// The target could not be located in the card's stage.
    UnresolvedTarget,
}

/// New order for one stage after a reorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderPlan {
    status: StageName,
    task_id: TaskId,
    from_index: usize,
    to_index: usize,
    assignments: Vec<(TaskId, u32)>,
}

impl ReorderPlan {
    /// Returns the stage being reordered.
    #[must_use]
    pub const fn status(&self) -> &StageName {
        &self.status
    }

    /// Returns the dragged task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the dragged task's index before the move.
    #[must_use]
    pub const fn from_index(&self) -> usize {
        self.from_index
    }

    /// Returns the dragged task's index after the move.
    #[must_use]
    pub const fn to_index(&self) -> usize {
        self.to_index
    }

    /// Returns every task of the stage with its new dense position, in
    /// display order.
    #[must_use]
    pub fn assignments(&self) -> &[(TaskId, u32)] {
        &self.assignments
    }

    /// Returns the task identifiers in their new display order.
    pub fn order(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.assignments.iter().map(|(id, _)| *id)
    }
}

/// Stage change for the dragged task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPlan {
    task_id: TaskId,
    from: StageName,
    to: StageName,
    position: u32,
}

impl TransitionPlan {
    /// Returns the dragged task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the stage the task leaves.
    #[must_use]
    pub const fn from(&self) -> &StageName {
        &self.from
    }

    /// Returns the stage the task enters.
    #[must_use]
    pub const fn to(&self) -> &StageName {
        &self.to
    }

    /// Returns the task's position at the end of the destination stage.
    #[must_use]
    pub const fn position(&self) -> u32 {
        self.position
    }
}

/// Outcome of a released drag gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragResolution {
    /// Nothing to persist.
    NoOp(NoOpReason),
    /// Renumber one stage.
    Reorder(ReorderPlan),
    /// Move the dragged task to another stage.
    Transition(TransitionPlan),
}

/// Resolves a released gesture against the current board.
///
/// The target stage is the dropped-on column, else the dropped-on card's
/// stage, else the dragged card's own stage. Same-stage drops reorder the
/// stage with a single-element move; cross-stage drops append the card to
/// the end of the destination stage. A target stage outside the snapshot
/// role's pipeline is unresolved.
///
/// # Errors
///
/// Returns [`BoardDomainError::PositionOutOfRange`] when a stage holds more
/// tasks than a position can represent.
pub fn resolve_drop(
    snapshot: &BoardSnapshot,
    active_id: TaskId,
    target: Option<&DropTarget>,
) -> Result<DragResolution, BoardDomainError> {
    let Some(target) = target else {
        return Ok(DragResolution::NoOp(NoOpReason::Cancelled));
    };
    let Some(active) = snapshot.find(active_id) else {
        return Ok(DragResolution::NoOp(NoOpReason::ActiveTaskMissing));
    };

    let target_status = match target {
        DropTarget::Column(stage) => stage.clone(),
        DropTarget::Task(id) => snapshot
            .find(*id)
            .map_or_else(|| active.status().clone(), |task| task.status().clone()),
        DropTarget::Unknown(_) => active.status().clone(),
    };

    if !Pipeline::for_role(snapshot.role()).contains(target_status.as_str()) {
        return Ok(DragResolution::NoOp(NoOpReason::UnresolvedTarget));
    }

    if *active.status() == target_status {
        return resolve_reorder(snapshot, active, target);
    }

    let position = to_position(snapshot.partition_len(target_status.as_str()))?;
    Ok(DragResolution::Transition(TransitionPlan {
        task_id: active.id(),
        from: active.status().clone(),
        to: target_status,
        position,
    }))
}

fn resolve_reorder(
    snapshot: &BoardSnapshot,
    active: &Task,
    target: &DropTarget,
) -> Result<DragResolution, BoardDomainError> {
    let over_id = match target {
        DropTarget::Column(_) => return Ok(DragResolution::NoOp(NoOpReason::DroppedOnOwnColumn)),
        DropTarget::Unknown(_) => return Ok(DragResolution::NoOp(NoOpReason::UnresolvedTarget)),
        DropTarget::Task(id) => *id,
    };

    let mut order = snapshot.partition_ids(active.status().as_str());
    let from_index = order.iter().position(|id| *id == active.id());
    let to_index = order.iter().position(|id| *id == over_id);
    let (Some(from_index), Some(to_index)) = (from_index, to_index) else {
        return Ok(DragResolution::NoOp(NoOpReason::UnresolvedTarget));
    };
    if from_index == to_index {
        return Ok(DragResolution::NoOp(NoOpReason::DroppedInPlace));
    }

    let moved = order.remove(from_index);
    order.insert(to_index, moved);

    let assignments = order
        .into_iter()
        .enumerate()
        .map(|(index, id)| to_position(index).map(|position| (id, position)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DragResolution::Reorder(ReorderPlan {
        status: active.status().clone(),
        task_id: active.id(),
        from_index,
        to_index,
        assignments,
    }))
}

fn to_position(index: usize) -> Result<u32, BoardDomainError> {
    u32::try_from(index).map_err(|_| {
        BoardDomainError::PositionOutOfRange(i64::try_from(index).unwrap_or(i64::MAX))
    })
}
