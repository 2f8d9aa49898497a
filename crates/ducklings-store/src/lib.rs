//! Ducklings Store - reference dispatcher for resolved ducklings
//!
//! Holds one state value and applies dispatchable values to it:
//! - Actions run through the resolved reducer under a lock
//! - Batches apply their members in order
//! - Thunks get the store back as a [`ducklings_core::Dispatcher`]
//!
//! The `logging` module installs a `tracing` subscriber for binaries and tests.

pub mod logging;
pub mod store;

pub use store::*;
