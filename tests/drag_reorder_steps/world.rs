//! Shared world state for drag and drop BDD scenarios.

use std::{collections::HashMap, sync::Arc};

use agency_board::board::{
    adapters::memory::InMemoryTaskStore,
    domain::{DragResolution, TaskId},
    services::{BoardError, BoardService, CompletionOutcome},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Board service type used by the BDD world.
pub type TestBoard = BoardService<InMemoryTaskStore, DefaultClock>;

/// Scenario world for drag and drop behaviour tests.
pub struct DragWorld {
    pub store: Arc<InMemoryTaskStore>,
    pub board: Option<TestBoard>,
    pub cards: HashMap<String, TaskId>,
    pub last_resolution: Option<Result<DragResolution, BoardError>>,
    pub last_completion: Option<CompletionOutcome>,
}

impl DragWorld {
    /// Creates a world over an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryTaskStore::new()),
            board: None,
            cards: HashMap::new(),
            last_resolution: None,
            last_completion: None,
        }
    }

    /// Looks up a seeded card by title.
    ///
    /// # Errors
    ///
    /// Returns an error if no card with that title was seeded.
    pub fn card(&self, title: &str) -> Result<TaskId, eyre::Report> {
        self.cards
            .get(title)
            .copied()
            .ok_or_else(|| eyre::eyre!("no card titled {title} in scenario world"))
    }

    /// Returns the open board.
    ///
    /// # Errors
    ///
    /// Returns an error if no board has been opened.
    pub fn board(&self) -> Result<&TestBoard, eyre::Report> {
        self.board
            .as_ref()
            .ok_or_else(|| eyre::eyre!("board has not been opened in scenario world"))
    }

    /// Returns the open board mutably.
    ///
    /// # Errors
    ///
    /// Returns an error if no board has been opened.
    pub fn board_mut(&mut self) -> Result<&mut TestBoard, eyre::Report> {
        self.board
            .as_mut()
            .ok_or_else(|| eyre::eyre!("board has not been opened in scenario world"))
    }
}

impl Default for DragWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> DragWorld {
    DragWorld::default()
}

/// Splits a comma-separated list of card titles.
pub fn titles(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
