//! Port contracts for the pipeline board.
//!
//! Ports define infrastructure-agnostic interfaces used by board services.

pub mod chat;
pub mod feed;
pub mod store;

pub use chat::{
    ChatCompletionClient, ChatCompletionError, ChatCompletionResult, ChatMessage, ChatRole,
};
pub use feed::{ChangeEvent, ChangeKind, ChangeSubscription};
pub use store::{StatusFilter, TaskOrder, TaskQuery, TaskStore, TaskStoreError, TaskStoreResult};
