//! Ducklings Test Harness - fixtures, scenarios and fuzzing
//!
//! This crate provides:
//! - Fixture ducklings (counters, toggles, keyed and nested trees)
//! - Scenario runner over a recording store
//! - Seeded action-sequence fuzzing
//! - End-to-end integration tests

pub mod fixtures;
pub mod fuzzer;
pub mod integration;

pub use fuzzer::*;
pub use integration::*;
