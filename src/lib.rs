//! Agency board: role-based pipeline task board.
//!
//! Each agency role moves its tasks through a fixed pipeline of stages. The
//! crate keeps a client-side board in sync with a shared task store,
//! reconciles drag gestures into reorders or stage transitions, exports CSV
//! reports, and proxies a task assistant to an external chat gateway.
//!
//! # Architecture
//!
//! The board follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, HTTP, memory)
//!
//! # Modules
//!
//! - [`board`]: Pipelines, board state, drag reconciliation, and services
//! - [`config`]: Environment-driven configuration

pub mod board;
pub mod config;
