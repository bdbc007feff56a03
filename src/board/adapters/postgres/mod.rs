//! `PostgreSQL` adapters for board task storage.

mod models;
mod schema;
mod store;

pub use store::{BoardPgPool, PostgresTaskStore};
