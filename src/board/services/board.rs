//! Board state store and drag reconciler for one client session.

use crate::board::{
    domain::{
        BoardDomainError, BoardSnapshot, ColumnView, DragResolution, DragState, DropTarget,
        NewTaskData, NoOpReason, Pipeline, Priority, ReorderPlan, Role, Session, StageName, Task,
        TaskId, TaskPatch, TransitionPlan, UserId, resolve_drop,
    },
    ports::{ChangeEvent, ChangeSubscription, TaskQuery, TaskStore, TaskStoreError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Request payload for creating a task on the viewed board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    title: String,
    description: Option<String>,
    priority: Priority,
    assigned_to: Option<UserId>,
}

impl CreateTaskRequest {
    /// Creates a request with the required title and default priority.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            priority: Priority::default(),
            assigned_to: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the assignee.
    #[must_use]
    pub const fn with_assignee(mut self, assignee: UserId) -> Self {
        self.assigned_to = Some(assignee);
        self
    }
}

/// Result of completing a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The task moved to the terminal stage.
    Completed(Task),
    /// The task was already done and has been removed.
    Deleted(TaskId),
}

/// Service-level errors for board operations.
#[derive(Debug, Error)]
pub enum BoardError {
    /// Domain validation or a permission check failed.
    #[error(transparent)]
    Domain(#[from] BoardDomainError),
    /// The task store rejected or failed the operation.
    #[error(transparent)]
    Store(#[from] TaskStoreError),
}

/// Result type for board service operations.
pub type BoardResult<T> = Result<T, BoardError>;

/// Client-side board: snapshot, drag gesture, and change subscription for
/// the session's viewed pipeline.
///
/// Mutations are applied to the snapshot first and then persisted. When
/// persistence fails the touched tasks are put back as they were; a revision
/// conflict additionally reloads the board from the store.
pub struct BoardService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
    session: Session,
    snapshot: BoardSnapshot,
    drag: DragState,
    subscription: Option<ChangeSubscription>,
}

impl<S, C> BoardService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    /// Creates a board with an empty snapshot and no subscription.
    #[must_use]
    pub fn new(store: Arc<S>, clock: Arc<C>, session: Session) -> Self {
        Self {
            store,
            clock,
            snapshot: BoardSnapshot::empty(session.viewing_role()),
            session,
            drag: DragState::default(),
            subscription: None,
        }
    }

    /// Creates a board, subscribes to changes, and loads the viewed role.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Store`] when the initial load fails.
    pub async fn open(store: Arc<S>, clock: Arc<C>, session: Session) -> BoardResult<Self> {
        let mut board = Self::new(store, clock, session);
        board.subscribe();
        board.load().await?;
        Ok(board)
    }

    /// Returns the session the board acts for.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Returns the current snapshot.
    #[must_use]
    pub const fn snapshot(&self) -> &BoardSnapshot {
        &self.snapshot
    }

    /// Returns the viewed pipeline.
    #[must_use]
    pub const fn pipeline(&self) -> Pipeline {
        self.session.pipeline()
    }

    /// Projects the board into one column per stage.
    #[must_use]
    pub fn columns(&self) -> Vec<ColumnView<'_>> {
        self.snapshot.columns(&self.session.pipeline())
    }

    /// Returns the drag gesture state.
    #[must_use]
    pub const fn drag_state(&self) -> &DragState {
        &self.drag
    }

    /// Returns whether a change subscription is live.
    #[must_use]
    pub const fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Replaces the snapshot with the viewed role's tasks from the store.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Store`] when the fetch fails; the previous
    /// snapshot is kept.
    pub async fn load(&mut self) -> BoardResult<()> {
        let role = self.session.viewing_role();
        let tasks = self.store.select(&TaskQuery::board(role)).await?;
        self.snapshot = BoardSnapshot::new(role, tasks);
        debug!(%role, tasks = self.snapshot.len(), "loaded board");
        Ok(())
    }

    /// Registers for change notifications, dropping any previous
    /// registration first.
    pub fn subscribe(&mut self) {
        self.unsubscribe();
        self.subscription = Some(self.store.subscribe());
    }

    /// Drops the change subscription, if any.
    pub fn unsubscribe(&mut self) {
        if self.subscription.take().is_some() {
            debug!("dropped change subscription");
        }
    }

    /// Waits for the next change notification and reloads the board.
    ///
    /// Returns `Ok(None)` when the board is not subscribed or the store has
    /// gone away.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Store`] when the reload fails.
    pub async fn next_change(&mut self) -> BoardResult<Option<ChangeEvent>> {
        let Some(subscription) = self.subscription.as_mut() else {
            return Ok(None);
        };
        let Some(event) = subscription.next().await else {
            return Ok(None);
        };
        debug!(kind = ?event.kind, task_id = %event.task_id, "task collection changed");
        self.load().await?;
        Ok(Some(event))
    }

    /// Switches the board to another role's pipeline and reloads it.
    ///
    /// Any gesture in progress is abandoned and the subscription is renewed.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Domain`] when the session may not view `role`
    /// and [`BoardError::Store`] when the reload fails.
    pub async fn switch_role(&mut self, role: Role) -> BoardResult<()> {
        self.session.view_as(role)?;
        self.unsubscribe();
        self.drag = DragState::default();
        self.snapshot = BoardSnapshot::empty(role);
        self.subscribe();
        info!(%role, "switched viewed pipeline");
        self.load().await
    }

    /// Merges a patch into the snapshot without waiting for the store.
    ///
    /// Returns `false` when the task is not on the board.
    pub fn apply_optimistic(&mut self, id: TaskId, patch: &TaskPatch) -> bool {
        self.snapshot.apply_patch(id, patch)
    }

    /// Starts dragging the task with `id`.
    ///
    /// Returns `false` and stays idle when the task is not on the board.
    pub fn drag_start(&mut self, id: TaskId) -> bool {
        let started = self.drag.start(&self.snapshot, id);
        debug!(task_id = %id, started, "drag started");
        started
    }

    /// Abandons the gesture in progress without persisting anything.
    pub fn drag_cancel(&mut self) {
        self.drag = DragState::default();
    }

    /// Releases the dragged card over `target` and persists the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Store`] when persistence fails, after the board
    /// has been rolled back.
    pub async fn drag_end(&mut self, target: Option<DropTarget>) -> BoardResult<DragResolution> {
        let Some(active) = self.drag.finish() else {
            return Ok(DragResolution::NoOp(NoOpReason::NotDragging));
        };
        let resolution = resolve_drop(&self.snapshot, active.id(), target.as_ref())?;

        match &resolution {
            DragResolution::NoOp(reason) => {
                debug!(task_id = %active.id(), ?reason, "drop needs no persistence");
            }
            DragResolution::Reorder(plan) => self.persist_reorder(plan).await?,
            DragResolution::Transition(plan) => self.persist_transition(plan).await?,
        }
        Ok(resolution)
    }

    async fn persist_reorder(&mut self, plan: &ReorderPlan) -> BoardResult<()> {
        let ids: Vec<TaskId> = plan.order().collect();
        let captured = self.snapshot.capture(&ids);
        let stamp = self.clock.utc();

        let patches: Vec<(TaskId, TaskPatch)> = plan
            .assignments()
            .iter()
            .filter_map(|(id, position)| {
                let revision = captured.iter().find(|task| task.id() == *id)?.revision();
                let patch = TaskPatch::at(stamp)
                    .with_position(*position)
                    .expecting_revision(revision);
                Some((*id, patch))
            })
            .collect();
        for (id, patch) in &patches {
            self.snapshot.apply_patch(*id, patch);
        }

        let mut stored = Vec::with_capacity(patches.len());
        for (id, patch) in &patches {
            match self.store.update(*id, patch).await {
                Ok(task) => stored.push(task),
                Err(err) => {
                    let partial = !stored.is_empty();
                    return Err(self.roll_back(captured, err, partial).await);
                }
            }
        }
        for task in stored {
            self.snapshot.replace(task);
        }

        info!(
            status = %plan.status(),
            task_id = %plan.task_id(),
            from = plan.from_index(),
            to = plan.to_index(),
            rewrites = patches.len(),
            "reordered stage"
        );
        Ok(())
    }

    async fn persist_transition(&mut self, plan: &TransitionPlan) -> BoardResult<()> {
        let captured = self.snapshot.capture(&[plan.task_id()]);
        let Some(revision) = captured.first().map(Task::revision) else {
            return Err(BoardDomainError::TaskNotOnBoard(plan.task_id()).into());
        };
        let patch = TaskPatch::new(&*self.clock)
            .with_status(plan.to().clone())
            .with_position(plan.position())
            .expecting_revision(revision);
        self.snapshot.apply_patch(plan.task_id(), &patch);

        match self.store.update(plan.task_id(), &patch).await {
            Ok(task) => {
                self.snapshot.replace(task);
            }
            Err(err) => return Err(self.roll_back(captured, err, false).await),
        }

        info!(
            task_id = %plan.task_id(),
            from = %plan.from(),
            to = %plan.to(),
            position = plan.position(),
            "moved task to another stage"
        );
        Ok(())
    }

    /// Puts captured tasks back, then reloads when storage may no longer
    /// hold the captured state: after a conflict, or after some writes of a
    /// multi-row rewrite have landed.
    async fn roll_back(
        &mut self,
        captured: Vec<Task>,
        err: TaskStoreError,
        partially_applied: bool,
    ) -> BoardError {
        warn!(
            error = %err,
            tasks = captured.len(),
            partially_applied,
            "persisting board change failed, rolling back"
        );
        self.snapshot.restore(captured);
        if err.is_conflict() || partially_applied {
            if let Err(reload_err) = self.load().await {
                warn!(error = %reload_err, "reload after failed write failed");
            }
        }
        BoardError::Store(err)
    }

    /// Creates a task at the end of the viewed pipeline's first stage.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Domain`] when the title is blank or the viewed
    /// role has no pipeline, and [`BoardError::Store`] when the insert fails.
    pub async fn create_task(&mut self, request: CreateTaskRequest) -> BoardResult<Task> {
        let status = self.session.pipeline().first_stage()?;
        let position = self.position_for_end_of(&status)?;
        let task = Task::new(
            NewTaskData {
                title: request.title,
                description: request.description,
                priority: request.priority,
                role: self.session.viewing_role(),
                status,
                position,
                created_by: self.session.user_id(),
                assigned_to: request.assigned_to,
            },
            &*self.clock,
        )?;

        self.store.insert(&task).await?;
        self.snapshot.insert(task.clone());
        info!(task_id = %task.id(), role = %task.role(), "created task");
        Ok(task)
    }

    /// Completes a task at the end of the terminal stage, or deletes it
    /// when it is already done.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Domain`] when the task is not on the board and
    /// [`BoardError::Store`] when persistence fails.
    pub async fn complete_task(&mut self, id: TaskId) -> BoardResult<CompletionOutcome> {
        let task = self
            .snapshot
            .find(id)
            .cloned()
            .ok_or(BoardDomainError::TaskNotOnBoard(id))?;

        if task.is_done() {
            self.store.delete(id).await?;
            self.snapshot.remove(id);
            info!(task_id = %id, "deleted completed task");
            return Ok(CompletionOutcome::Deleted(id));
        }

        let terminal = StageName::terminal();
        let position = self.position_for_end_of(&terminal)?;
        let now = self.clock.utc();
        let patch = TaskPatch::at(now)
            .with_status(terminal)
            .with_position(position)
            .with_completed_at(now)
            .expecting_revision(task.revision());
        match self.store.update(id, &patch).await {
            Ok(stored) => {
                self.snapshot.replace(stored.clone());
                info!(task_id = %id, "completed task");
                Ok(CompletionOutcome::Completed(stored))
            }
            Err(err) => Err(self.roll_back(vec![task], err, false).await),
        }
    }

    /// Deletes a task outright.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Domain`] when the session lacks the delete
    /// privilege and [`BoardError::Store`] when the delete fails.
    pub async fn delete_task(&mut self, id: TaskId) -> BoardResult<()> {
        self.session.ensure_can_delete()?;
        self.store.delete(id).await?;
        self.snapshot.remove(id);
        info!(task_id = %id, "deleted task");
        Ok(())
    }

    fn position_for_end_of(&self, status: &StageName) -> BoardResult<u32> {
        let len = self.snapshot.partition_len(status.as_str());
        u32::try_from(len).map_err(|_| {
            BoardDomainError::PositionOutOfRange(i64::try_from(len).unwrap_or(i64::MAX)).into()
        })
    }
}
