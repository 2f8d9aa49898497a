//! Ducklings Core - Fundamental types and primitives
//!
//! This crate defines the primitives every duckling is built from:
//! - Namespaces (action type prefixes, state focusing)
//! - Actions, action types and action creators
//! - Handlers, reducers and reducer combinators
//! - Dispatchable values (actions, batches, thunks)
//! - Error types

pub mod action;
pub mod dispatch;
pub mod error;
pub mod namespace;
pub mod reducer;
pub mod state;

pub use action::*;
pub use dispatch::*;
pub use error::*;
pub use namespace::*;
pub use reducer::*;
pub use state::*;
