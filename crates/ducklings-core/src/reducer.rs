//! Handlers, reducers and reducer combinators
//!
//! A [`Reducer`] maps `(state, action)` to the next state. An unset state
//! (`None`) is seeded with the reducer's initial state. Reducers are total:
//! unmatched action types pass the state through unchanged.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::{child_state, empty_state, shallow_merge, Action, ActionType};

/// Handler function: current state and action to a partial update
pub type HandlerFn = dyn Fn(&Value, &Action) -> Value + Send + Sync;

/// A single action handler
#[derive(Clone)]
pub struct Handler(Arc<HandlerFn>);

impl Handler {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&Value, &Action) -> Value + Send + Sync + 'static,
    {
        Handler(Arc::new(handler))
    }

    #[inline]
    pub fn apply(&self, state: &Value, action: &Action) -> Value {
        (self.0)(state, action)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler")
    }
}

/// Handler table keyed by action type
#[derive(Clone, Debug, Default)]
pub struct Handlers {
    table: BTreeMap<ActionType, Handler>,
}

impl Handlers {
    pub fn new() -> Self {
        Handlers::default()
    }

    /// Add a handler (builder style)
    pub fn on<T, F>(mut self, action_type: T, handler: F) -> Self
    where
        T: Into<ActionType>,
        F: Fn(&Value, &Action) -> Value + Send + Sync + 'static,
    {
        self.insert(action_type, Handler::new(handler));
        self
    }

    /// Insert a handler, returning the one it replaced
    pub fn insert(
        &mut self,
        action_type: impl Into<ActionType>,
        handler: Handler,
    ) -> Option<Handler> {
        self.table.insert(action_type.into(), handler)
    }

    pub fn get(&self, action_type: &str) -> Option<&Handler> {
        self.table.get(action_type)
    }

    pub fn contains(&self, action_type: &str) -> bool {
        self.table.contains_key(action_type)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn action_types(&self) -> impl Iterator<Item = &ActionType> {
        self.table.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, ActionType, Handler> {
        self.table.iter()
    }
}

/// Reducer function over an optional (unset) state
pub type ReduceFn = dyn Fn(Option<Value>, &Action) -> Value + Send + Sync;

/// A composed reducer
#[derive(Clone)]
pub struct Reducer(Arc<ReduceFn>);

impl Reducer {
    pub fn new<F>(reduce: F) -> Self
    where
        F: Fn(Option<Value>, &Action) -> Value + Send + Sync + 'static,
    {
        Reducer(Arc::new(reduce))
    }

    /// Reducer that returns its input (unset becomes `{}`)
    pub fn identity() -> Self {
        Reducer::new(|state, _| state.unwrap_or_else(empty_state))
    }

    #[inline]
    pub fn reduce(&self, state: Option<Value>, action: &Action) -> Value {
        (self.0)(state, action)
    }

    /// State produced from an unset state by the init action
    pub fn init(&self) -> Value {
        self.reduce(None, &Action::init())
    }
}

impl fmt::Debug for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reducer")
    }
}

/// Reduce state by action type with a single handler table
pub fn handle_actions(handlers: Handlers, initial_state: Value) -> Reducer {
    reduce_handler_sets(vec![handlers], initial_state)
}

/// Apply handler tables in order, each shallow-merging its update over the
/// running state
pub fn reduce_handler_sets(sets: Vec<Handlers>, initial_state: Value) -> Reducer {
    Reducer::new(move |state, action| {
        let mut state = state.unwrap_or_else(|| initial_state.clone());
        for handlers in &sets {
            if let Some(handler) = handlers.get(action.action_type.as_str()) {
                let update = handler.apply(&state, action);
                state = shallow_merge(state, update);
            }
        }
        state
    })
}

/// Chain reducers, shallow-merging each result over the running state
pub fn reduce_reducers(reducers: Vec<Reducer>, initial_state: Value) -> Reducer {
    Reducer::new(move |state, action| {
        let state = state.unwrap_or_else(|| initial_state.clone());
        reducers.iter().fold(state, |state, reducer| {
            let update = reducer.reduce(Some(state.clone()), action);
            shallow_merge(state, update)
        })
    })
}

/// Merge independent reducers keyed by field
///
/// The result holds exactly the known keys; any other key is dropped.
pub fn combine_reducers(children: BTreeMap<String, Reducer>) -> Reducer {
    Reducer::new(move |state, action| {
        let mut next = Map::new();
        for (key, reducer) in &children {
            let child = child_state(state.as_ref(), key);
            next.insert(key.clone(), reducer.reduce(child, action));
        }
        Value::Object(next)
    })
}

/// Wrap a keyed reducer so state keys it does not know are carried through
pub fn carry_unknown_keys(reducer: Reducer) -> Reducer {
    Reducer::new(move |state, action| {
        let base = state.clone().unwrap_or_else(empty_state);
        shallow_merge(base, reducer.reduce(state, action))
    })
}
