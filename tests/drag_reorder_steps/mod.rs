//! Step definitions for drag and drop BDD scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
