//! App interface tree
//!
//! The resolved public interface mirrors the duckling tree: keyed ducklings
//! become nested scopes, leaves contribute action creators, selectors and
//! commands. Every scope carries a synthesized reset entry.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use ducklings_core::{ActionCreator, Dispatch};
use serde_json::Value;

/// Selector function over a root state plus call arguments
pub type SelectorFn = dyn Fn(&Value, &[Value]) -> Value + Send + Sync;

/// Reads a value from root state
#[derive(Clone)]
pub struct Selector(Arc<SelectorFn>);

impl Selector {
    pub fn new<F>(select: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Value + Send + Sync + 'static,
    {
        Selector(Arc::new(select))
    }

    #[inline]
    pub fn select(&self, state: &Value, args: &[Value]) -> Value {
        (self.0)(state, args)
    }

    /// Select without extra arguments
    #[inline]
    pub fn get(&self, state: &Value) -> Value {
        self.select(state, &[])
    }

    /// Selector reading from `state[key]` instead of `state`
    pub fn focused(&self, key: impl Into<String>) -> Selector {
        let key = key.into();
        let inner = self.clone();
        Selector::new(move |state, args| {
            let local = state.get(&key).unwrap_or(&Value::Null);
            inner.select(local, args)
        })
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Selector")
    }
}

/// Command function: call arguments to a dispatchable value
pub type CommandFn = dyn Fn(&[Value]) -> Dispatch + Send + Sync;

/// Caller-defined multi-step action (thunk style), also used for fan-out resets
#[derive(Clone)]
pub struct Command(Arc<CommandFn>);

impl Command {
    pub fn new<F>(command: F) -> Self
    where
        F: Fn(&[Value]) -> Dispatch + Send + Sync + 'static,
    {
        Command(Arc::new(command))
    }

    #[inline]
    pub fn invoke(&self, args: &[Value]) -> Dispatch {
        (self.0)(args)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Command")
    }
}

/// One entry of the app tree
#[derive(Clone, Debug)]
pub enum AppEntry {
    Action(ActionCreator),
    Selector(Selector),
    Command(Command),
    Scope(App),
}

impl AppEntry {
    pub fn kind(&self) -> &'static str {
        match self {
            AppEntry::Action(_) => "action",
            AppEntry::Selector(_) => "selector",
            AppEntry::Command(_) => "command",
            AppEntry::Scope(_) => "scope",
        }
    }

    /// Dispatchable value for actions and commands
    pub fn dispatch(&self, args: &[Value]) -> Option<Dispatch> {
        match self {
            AppEntry::Action(creator) => Some(Dispatch::Action(creator.create(args))),
            AppEntry::Command(command) => Some(command.invoke(args)),
            AppEntry::Selector(_) | AppEntry::Scope(_) => None,
        }
    }
}

impl From<ActionCreator> for AppEntry {
    fn from(creator: ActionCreator) -> Self {
        AppEntry::Action(creator)
    }
}

impl From<Selector> for AppEntry {
    fn from(selector: Selector) -> Self {
        AppEntry::Selector(selector)
    }
}

impl From<Command> for AppEntry {
    fn from(command: Command) -> Self {
        AppEntry::Command(command)
    }
}

impl From<App> for AppEntry {
    fn from(app: App) -> Self {
        AppEntry::Scope(app)
    }
}

/// A scope of the app tree
#[derive(Clone, Debug, Default)]
pub struct App {
    entries: BTreeMap<String, AppEntry>,
}

impl App {
    pub fn new() -> Self {
        App::default()
    }

    /// Add an entry (builder style)
    pub fn with(mut self, key: impl Into<String>, entry: impl Into<AppEntry>) -> Self {
        self.insert(key, entry);
        self
    }

    /// Insert an entry, returning the one it replaced
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        entry: impl Into<AppEntry>,
    ) -> Option<AppEntry> {
        self.entries.insert(key.into(), entry.into())
    }

    /// Merge another scope into this one; entries of `other` win
    pub fn merge(&mut self, other: App) {
        self.entries.extend(other.entries);
    }

    pub fn get(&self, key: &str) -> Option<&AppEntry> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, AppEntry> {
        self.entries.iter()
    }

    pub fn action(&self, key: &str) -> Option<&ActionCreator> {
        match self.get(key)? {
            AppEntry::Action(creator) => Some(creator),
            _ => None,
        }
    }

    pub fn selector(&self, key: &str) -> Option<&Selector> {
        match self.get(key)? {
            AppEntry::Selector(selector) => Some(selector),
            _ => None,
        }
    }

    pub fn command(&self, key: &str) -> Option<&Command> {
        match self.get(key)? {
            AppEntry::Command(command) => Some(command),
            _ => None,
        }
    }

    pub fn scope(&self, key: &str) -> Option<&App> {
        match self.get(key)? {
            AppEntry::Scope(scope) => Some(scope),
            _ => None,
        }
    }

    /// Look up an entry by path, outermost key first
    pub fn at(&self, path: &[&str]) -> Option<&AppEntry> {
        let (last, scopes) = path.split_last()?;
        let mut scope = self;
        for key in scopes {
            scope = scope.scope(key)?;
        }
        scope.get(last)
    }
}

impl IntoIterator for App {
    type Item = (String, AppEntry);
    type IntoIter = btree_map::IntoIter<String, AppEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a App {
    type Item = (&'a String, &'a AppEntry);
    type IntoIter = btree_map::Iter<'a, String, AppEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
