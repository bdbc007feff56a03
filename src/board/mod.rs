//! Pipeline board for the agency's role-based task workflow.
//!
//! Tasks belong to a role and move through that role's pipeline of stages.
//! The board keeps a client-side snapshot of one role's tasks in sync with
//! the backing store, and reconciles drag gestures into either a dense
//! position rewrite (reorder within a stage) or a status transition (move
//! between stages). The module follows hexagonal architecture:
//!
//! - Domain types and decision logic in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
