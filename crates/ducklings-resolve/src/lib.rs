//! Ducklings Resolver - composes ducklings into one application
//!
//! This crate implements the recursive resolver:
//! - Leaf declaration with namespaced actions and scoped selectors
//! - Combined (flat state) composition with ordered handler sets
//! - Keyed composition with per-key state slices
//! - Reset synthesis at every scope
//! - Merge conflict detection
//! - Selector tree combination

pub mod app;
pub mod config;
pub mod duckling;
pub mod reset;
pub mod resolve;
pub mod selectors;

pub use app::*;
pub use config::*;
pub use duckling::*;
pub use reset::{reset_action, reset_type};
pub use resolve::*;
pub use selectors::*;
