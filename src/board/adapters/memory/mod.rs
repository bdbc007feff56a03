//! In-memory adapters for tests and single-process use.

mod store;

pub use store::InMemoryTaskStore;
