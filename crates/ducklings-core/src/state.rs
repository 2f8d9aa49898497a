//! State helpers
//!
//! State is an opaque JSON tree whose composed levels are objects. Handlers
//! return partial updates which are shallow-merged onto the current state:
//! - an object update overwrites only the keys it names
//! - a `null` update leaves the state unchanged
//! - any other update replaces the state

use serde_json::{Map, Value};

/// An empty object state
pub fn empty_state() -> Value {
    Value::Object(Map::new())
}

/// `null` and `{}` both count as empty
pub fn is_empty_state(state: &Value) -> bool {
    match state {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Shallow-merge a partial update onto a state
pub fn shallow_merge(state: Value, update: Value) -> Value {
    match (state, update) {
        (state, Value::Null) => state,
        (Value::Object(mut base), Value::Object(patch)) => {
            base.extend(patch);
            Value::Object(base)
        }
        (_, update) => update,
    }
}

/// Child state under `key`; missing and `null` children are unset
pub fn child_state(state: Option<&Value>, key: &str) -> Option<Value> {
    state
        .and_then(|state| state.get(key))
        .filter(|child| !child.is_null())
        .cloned()
}
