//! Action definitions
//!
//! Actions are flux-standard: a namespaced type plus optional payload and
//! meta. An [`ActionCreator`] carries its action type as its identity, so it
//! can key a handler table directly.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Type dispatched by stores when they compute their initial state
pub const INIT_ACTION_TYPE: &str = "@@ducklings/INIT";

/// Fully namespaced action type
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionType(String);

impl ActionType {
    #[inline]
    pub fn new(action_type: impl Into<String>) -> Self {
        ActionType(action_type.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActionType({})", self.0)
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ActionType {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ActionType {
    fn from(action_type: &str) -> Self {
        ActionType::new(action_type)
    }
}

impl From<String> for ActionType {
    fn from(action_type: String) -> Self {
        ActionType(action_type)
    }
}

impl From<&ActionType> for ActionType {
    fn from(action_type: &ActionType) -> Self {
        action_type.clone()
    }
}

impl From<&ActionCreator> for ActionType {
    fn from(creator: &ActionCreator) -> Self {
        creator.action_type.clone()
    }
}

/// A dispatched action
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl Action {
    pub fn new(action_type: impl Into<ActionType>) -> Self {
        Action {
            action_type: action_type.into(),
            payload: None,
            error: false,
            meta: None,
        }
    }

    /// The action a store reduces once to obtain its initial state
    pub fn init() -> Self {
        Action::new(INIT_ACTION_TYPE)
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Mark the payload as an error
    pub fn as_error(mut self) -> Self {
        self.error = true;
        self
    }

    /// Payload, or `Value::Null` when absent
    pub fn payload(&self) -> &Value {
        self.payload.as_ref().unwrap_or(&Value::Null)
    }

    #[inline]
    pub fn is(&self, action_type: &str) -> bool {
        self.action_type.as_str() == action_type
    }
}

/// Builds a payload (or meta) from the arguments an action creator was called with
pub type PayloadFn = dyn Fn(&[Value]) -> Option<Value> + Send + Sync;

/// Creates actions of one type
///
/// Without a payload creator the first argument becomes the payload.
#[derive(Clone)]
pub struct ActionCreator {
    action_type: ActionType,
    payload: Option<Arc<PayloadFn>>,
    meta: Option<Arc<PayloadFn>>,
}

impl ActionCreator {
    pub fn new(action_type: impl Into<ActionType>) -> Self {
        ActionCreator {
            action_type: action_type.into(),
            payload: None,
            meta: None,
        }
    }

    pub fn with_payload<F>(mut self, payload: F) -> Self
    where
        F: Fn(&[Value]) -> Option<Value> + Send + Sync + 'static,
    {
        self.payload = Some(Arc::new(payload));
        self
    }

    pub fn with_meta<F>(mut self, meta: F) -> Self
    where
        F: Fn(&[Value]) -> Option<Value> + Send + Sync + 'static,
    {
        self.meta = Some(Arc::new(meta));
        self
    }

    #[inline]
    pub fn action_type(&self) -> &ActionType {
        &self.action_type
    }

    /// Create an action from call arguments
    pub fn create(&self, args: &[Value]) -> Action {
        let payload = match &self.payload {
            Some(payload) => payload(args),
            None => args.first().cloned(),
        };
        let meta = self.meta.as_ref().and_then(|meta| meta(args));
        Action {
            action_type: self.action_type.clone(),
            payload,
            error: false,
            meta,
        }
    }

    /// Create an action without arguments
    pub fn call(&self) -> Action {
        self.create(&[])
    }
}

impl fmt::Debug for ActionCreator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionCreator")
            .field("action_type", &self.action_type)
            .field("payload", &self.payload.is_some())
            .field("meta", &self.meta.is_some())
            .finish()
    }
}

impl fmt::Display for ActionCreator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.action_type, f)
    }
}
