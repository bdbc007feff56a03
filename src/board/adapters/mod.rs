//! Adapter implementations for board ports.

pub mod feed;
pub mod gateway;
pub mod memory;
pub mod postgres;
