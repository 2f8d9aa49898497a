//! Reset synthesis
//!
//! Flat scopes get a terminal reset handler that restores the scope's full
//! initial state. Keyed scopes get a fan-out command that batches every
//! child's own reset; the dispatcher applies the batch in key order.

use std::collections::BTreeMap;

use ducklings_core::{ActionCreator, ActionType, Dispatch, Namespace, Reducer};
use serde_json::Value;
use tracing::trace;

use crate::{AppEntry, Command, Resolved, ResolverConfig};

/// Namespaced reset action creator for a scope
pub fn reset_action(namespace: &Namespace, config: &ResolverConfig) -> ActionCreator {
    ActionCreator::new(reset_type(namespace, config))
}

/// Namespaced reset action type for a scope
pub fn reset_type(namespace: &Namespace, config: &ResolverConfig) -> ActionType {
    ActionType::new(namespace.prefix_type(&config.reset_type, config.separator))
}

/// Wrap a flat reducer so the reset type replaces its state with `initial_state`
pub(crate) fn with_reset(
    reducer: Reducer,
    reset_type: ActionType,
    initial_state: Value,
) -> Reducer {
    Reducer::new(move |state, action| {
        if action.action_type == reset_type {
            return initial_state.clone();
        }
        reducer.reduce(state, action)
    })
}

/// Command dispatching every child's reset, in key order
pub(crate) fn fan_out(children: &BTreeMap<String, Resolved>, reset_key: &str) -> Command {
    let resets: Vec<AppEntry> = children
        .values()
        .filter_map(|child| child.app.get(reset_key).cloned())
        .collect();
    Command::new(move |_| {
        trace!(children = resets.len(), "fan-out reset");
        Dispatch::Batch(resets.iter().filter_map(|reset| reset.dispatch(&[])).collect())
    })
}
