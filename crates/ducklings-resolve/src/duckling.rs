//! Duckling definitions
//!
//! A duckling is one of three shapes, fixed when it is built:
//! - [`Duckling::Leaf`] declares state, handlers and an app fragment
//! - [`Duckling::Combined`] shares one flat state between its members
//! - [`Duckling::Keyed`] gives every child its own namespace and state slice

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use ducklings_core::{
    child_state, shallow_merge, Action, ActionCreator, ActionType, Handler, Handlers, Namespace,
    Reducer,
};
use serde_json::Value;

use crate::{App, AppEntry, Selector};

/// Leaf function: resolution context to declaration
pub type LeafFn = dyn Fn(&Context<'_>) -> Declaration + Send + Sync;

/// A leaf duckling, invoked once during resolution
#[derive(Clone)]
pub struct Leaf(Arc<LeafFn>);

impl Leaf {
    pub fn new<F>(declare: F) -> Self
    where
        F: Fn(&Context<'_>) -> Declaration + Send + Sync + 'static,
    {
        Leaf(Arc::new(declare))
    }

    #[inline]
    pub fn declare(&self, ctx: &Context<'_>) -> Declaration {
        (self.0)(ctx)
    }
}

impl fmt::Debug for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Leaf")
    }
}

/// Composition tree of ducklings
#[derive(Clone, Debug)]
pub enum Duckling {
    Leaf(Leaf),
    Combined(Vec<Duckling>),
    Keyed(BTreeMap<String, Duckling>),
}

impl Duckling {
    pub fn leaf<F>(declare: F) -> Self
    where
        F: Fn(&Context<'_>) -> Declaration + Send + Sync + 'static,
    {
        Duckling::Leaf(Leaf::new(declare))
    }

    pub fn combined<I>(members: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Duckling>,
    {
        Duckling::Combined(members.into_iter().map(Into::into).collect())
    }

    pub fn keyed<I, K>(children: I) -> Self
    where
        I: IntoIterator<Item = (K, Duckling)>,
        K: Into<String>,
    {
        Duckling::Keyed(
            children
                .into_iter()
                .map(|(key, child)| (key.into(), child))
                .collect(),
        )
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Duckling::Leaf(_) => "leaf",
            Duckling::Combined(_) => "combined",
            Duckling::Keyed(_) => "keyed",
        }
    }

    /// Collapse nested combined ducklings into one ordered sequence of
    /// leaves and keyed ducklings
    pub fn flatten(&self) -> Vec<&Duckling> {
        let mut flat = Vec::new();
        self.flatten_into(&mut flat);
        flat
    }

    fn flatten_into<'a>(&'a self, flat: &mut Vec<&'a Duckling>) {
        match self {
            Duckling::Combined(members) => {
                for member in members {
                    member.flatten_into(flat);
                }
            }
            other => flat.push(other),
        }
    }
}

impl From<Leaf> for Duckling {
    fn from(leaf: Leaf) -> Self {
        Duckling::Leaf(leaf)
    }
}

impl From<Vec<Duckling>> for Duckling {
    fn from(members: Vec<Duckling>) -> Self {
        Duckling::Combined(members)
    }
}

impl From<BTreeMap<String, Duckling>> for Duckling {
    fn from(children: BTreeMap<String, Duckling>) -> Self {
        Duckling::Keyed(children)
    }
}

/// Combine ducklings into one flat-state duckling
#[macro_export]
macro_rules! combine {
    ($($duckling:expr),* $(,)?) => {
        $crate::Duckling::Combined(vec![$($crate::Duckling::from($duckling)),*])
    };
}

/// What a leaf declares
#[derive(Clone, Debug, Default)]
pub struct Declaration {
    /// Initial state; `null` means `{}`
    pub initial_state: Value,
    pub handlers: Handlers,
    pub app: App,
}

impl Declaration {
    pub fn new() -> Self {
        Declaration::default()
    }

    pub fn with_initial_state(mut self, initial_state: Value) -> Self {
        self.initial_state = initial_state;
        self
    }

    /// Handle an action type with a partial-update handler
    pub fn on<T, F>(mut self, action_type: T, handler: F) -> Self
    where
        T: Into<ActionType>,
        F: Fn(&Value, &Action) -> Value + Send + Sync + 'static,
    {
        self.handlers.insert(action_type, Handler::new(handler));
        self
    }

    pub fn with_handlers(mut self, handlers: Handlers) -> Self {
        self.handlers = handlers;
        self
    }

    /// Expose an app entry
    pub fn with(mut self, key: impl Into<String>, entry: impl Into<AppEntry>) -> Self {
        self.app.insert(key, entry);
        self
    }

    pub fn with_app(mut self, app: App) -> Self {
        self.app.merge(app);
        self
    }
}

/// Context handed to a leaf while it declares itself
pub struct Context<'a> {
    namespace: &'a Namespace,
    app: &'a App,
    reduce: Option<&'a ReduceHelper>,
    separator: char,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        namespace: &'a Namespace,
        app: &'a App,
        reduce: Option<&'a ReduceHelper>,
        separator: char,
    ) -> Self {
        Context {
            namespace,
            app,
            reduce,
            separator,
        }
    }

    /// Action creator for a bare type name in this namespace
    pub fn action(&self, name: &str) -> ActionCreator {
        ActionCreator::new(self.namespace.prefix_type(name, self.separator))
    }

    /// Action creator with a payload creator
    pub fn action_with<F>(&self, name: &str, payload: F) -> ActionCreator
    where
        F: Fn(&[Value]) -> Option<Value> + Send + Sync + 'static,
    {
        self.action(name).with_payload(payload)
    }

    /// Wrap a function of local state into a selector over root state
    pub fn selector<F>(&self, select: F) -> Selector
    where
        F: Fn(&Value, &[Value]) -> Value + Send + Sync + 'static,
    {
        let namespace = self.namespace.clone();
        Selector::new(move |state, args| {
            let local = namespace.focus(state).unwrap_or(&Value::Null);
            select(local, args)
        })
    }

    pub fn namespace(&self) -> &Namespace {
        self.namespace
    }

    /// Interface merged so far from earlier siblings
    pub fn app(&self) -> &App {
        self.app
    }

    /// Child reducer helper, present in a combined duckling with keyed members
    pub fn reduce(&self) -> Option<&ReduceHelper> {
        self.reduce
    }
}

/// One step for [`ReduceHelper::reduce`]: call `action` of `child` with `args`
#[derive(Clone, Debug, PartialEq)]
pub struct ChildAction {
    pub child: String,
    pub action: String,
    pub args: Vec<Value>,
}

impl ChildAction {
    pub fn new(child: impl Into<String>, action: impl Into<String>) -> Self {
        ChildAction {
            child: child.into(),
            action: action.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }
}

/// Applies keyed children's own actions to their state slices directly
#[derive(Clone, Debug, Default)]
pub struct ReduceHelper {
    apps: BTreeMap<String, App>,
    reducers: BTreeMap<String, Reducer>,
}

impl ReduceHelper {
    pub(crate) fn insert(&mut self, key: &str, app: App, reducer: Reducer) {
        self.apps.insert(key.to_string(), app);
        self.reducers.insert(key.to_string(), reducer);
    }

    pub fn children(&self) -> impl Iterator<Item = &str> {
        self.reducers.keys().map(String::as_str)
    }

    /// Fold child actions over a state; unknown children or actions are skipped
    pub fn reduce(&self, state: &Value, steps: &[ChildAction]) -> Value {
        steps.iter().fold(state.clone(), |state, step| {
            let (Some(app), Some(reducer)) =
                (self.apps.get(&step.child), self.reducers.get(&step.child))
            else {
                return state;
            };
            let Some(creator) = app.action(&step.action) else {
                return state;
            };
            let child = child_state(Some(&state), &step.child);
            let next = reducer.reduce(child, &creator.create(&step.args));
            let mut update = serde_json::Map::new();
            update.insert(step.child.clone(), next);
            shallow_merge(state, Value::Object(update))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn identity() -> Duckling {
        Duckling::leaf(|_| Declaration::new())
    }

    #[test]
    fn test_flatten_preserves_order() {
        let keyed = Duckling::keyed([("a", identity())]);
        let tree = Duckling::combined([
            Duckling::combined([identity(), Duckling::combined([keyed.clone()])]),
            identity(),
        ]);
        let kinds: Vec<&str> = tree.flatten().into_iter().map(Duckling::kind).collect();
        assert_eq!(kinds, vec!["leaf", "keyed", "leaf"]);
        assert_eq!(keyed.flatten().len(), 1);
    }

    #[test]
    fn test_combine_macro() {
        let tree = combine![identity(), vec![identity(), identity()]];
        assert_eq!(tree.kind(), "combined");
        assert_eq!(tree.flatten().len(), 3);
    }

    #[test]
    fn test_context_helpers() {
        let namespace = Namespace::root().child("deep").child("path");
        let app = App::new();
        let ctx = Context::new(&namespace, &app, None, '/');

        assert_eq!(ctx.action("TEST").action_type().as_str(), "deep/path/TEST");
        let selector = ctx.selector(|local, _| local["test"].clone());
        let state = json!({"deep": {"path": {"test": "value"}}});
        assert_eq!(selector.get(&state), json!("value"));
        assert_eq!(selector.get(&json!({})), Value::Null);
        assert!(ctx.reduce().is_none());
    }

    #[test]
    fn test_reduce_helper_skips_unknown() {
        let helper = ReduceHelper::default();
        let state = json!({"a": 1});
        assert_eq!(helper.reduce(&state, &[ChildAction::new("a", "increment")]), state);
    }
}
