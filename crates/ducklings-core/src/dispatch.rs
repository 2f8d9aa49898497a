//! Dispatchable values
//!
//! Anything a store can be asked to apply: a plain action, an ordered batch
//! (how fan-out resets travel), or a thunk that dispatches on its own.
//! A dispatcher applies batch members in order.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::{Action, DispatchResult};

/// Something that applies dispatchable values and exposes the current state
pub trait Dispatcher {
    fn dispatch(&self, item: Dispatch) -> DispatchResult<()>;

    fn state(&self) -> Value;
}

/// Deferred dispatch function
pub type ThunkFn = dyn Fn(&dyn Dispatcher) -> DispatchResult<()> + Send + Sync;

/// A value handed to a dispatcher
#[derive(Clone)]
pub enum Dispatch {
    Action(Action),
    Batch(Vec<Dispatch>),
    Thunk(Arc<ThunkFn>),
}

impl Dispatch {
    pub fn thunk<F>(thunk: F) -> Self
    where
        F: Fn(&dyn Dispatcher) -> DispatchResult<()> + Send + Sync + 'static,
    {
        Dispatch::Thunk(Arc::new(thunk))
    }

    pub fn batch<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Dispatch>,
    {
        Dispatch::Batch(items.into_iter().map(Into::into).collect())
    }

    /// Actions reachable without running thunks, in dispatch order
    pub fn actions(&self) -> Vec<&Action> {
        let mut actions = Vec::new();
        self.collect_actions(&mut actions);
        actions
    }

    fn collect_actions<'a>(&'a self, out: &mut Vec<&'a Action>) {
        match self {
            Dispatch::Action(action) => out.push(action),
            Dispatch::Batch(items) => {
                for item in items {
                    item.collect_actions(out);
                }
            }
            Dispatch::Thunk(_) => {}
        }
    }
}

impl From<Action> for Dispatch {
    fn from(action: Action) -> Self {
        Dispatch::Action(action)
    }
}

impl fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dispatch::Action(action) => f.debug_tuple("Action").field(action).finish(),
            Dispatch::Batch(items) => f.debug_tuple("Batch").field(items).finish(),
            Dispatch::Thunk(_) => write!(f, "Thunk"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_batch_actions_in_order() {
        let dispatch = Dispatch::batch([
            Dispatch::from(Action::new("a/RESET")),
            Dispatch::batch([Action::new("b/c/RESET"), Action::new("b/d/RESET")]),
            Dispatch::thunk(|_| Ok(())),
        ]);
        let types: Vec<&str> = dispatch
            .actions()
            .into_iter()
            .map(|a| a.action_type.as_str())
            .collect();
        assert_eq!(types, vec!["a/RESET", "b/c/RESET", "b/d/RESET"]);
    }
}
