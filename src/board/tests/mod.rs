//! Unit tests for the pipeline board.

mod assistant_tests;
mod support;
