//! Ducklings Store - serialized dispatch over a resolved reducer

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ducklings_core::{Action, Dispatch, DispatchError, DispatchResult, Dispatcher, Reducer};
use ducklings_resolve::{AppEntry, Resolved, Selector};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tracing::{debug, trace, warn};

/// Store configuration
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Maximum nesting of batches and thunks
    pub max_dispatch_depth: usize,
    /// Keep every applied action in a journal
    pub record_actions: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            max_dispatch_depth: 32,
            record_actions: false,
        }
    }
}

impl StoreConfig {
    /// Default limits with the action journal enabled
    pub fn recording() -> Self {
        StoreConfig {
            record_actions: true,
            ..StoreConfig::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub actions_applied: u64,
    pub batches: u64,
    pub thunks: u64,
    pub refused: u64,
    pub notifications: u64,
}

/// State change listener
pub type Listener = Arc<dyn Fn(&Value) + Send + Sync>;

/// Handle returned by [`Store::subscribe`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

/// Reference store: one state, one reducer, synchronous dispatch
pub struct Store {
    reducer: Reducer,
    state: RwLock<Value>,
    config: StoreConfig,
    listeners: Mutex<Vec<(Subscription, Listener)>>,
    next_subscription: AtomicU64,
    journal: Mutex<Vec<Action>>,
    stats: Mutex<StoreStats>,
}

impl Store {
    /// Create a store with default configuration
    pub fn new(reducer: Reducer) -> Self {
        Self::with_config(reducer, StoreConfig::default())
    }

    /// Create a store from a resolved duckling tree
    pub fn from_resolved(resolved: &Resolved) -> Self {
        Self::new(resolved.reducer.clone())
    }

    /// Create a store with custom configuration
    pub fn with_config(reducer: Reducer, config: StoreConfig) -> Self {
        let state = reducer.init();
        debug!(record_actions = config.record_actions, "store created");
        Store {
            reducer,
            state: RwLock::new(state),
            config,
            listeners: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(0),
            journal: Mutex::new(Vec::new()),
            stats: Mutex::new(StoreStats::default()),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Snapshot of the current state
    pub fn state(&self) -> Value {
        self.state.read().clone()
    }

    /// Run a selector against the current state
    pub fn select(&self, selector: &Selector, args: &[Value]) -> Value {
        selector.select(&self.state.read(), args)
    }

    /// Dispatch an action or command app entry
    pub fn invoke(&self, entry: &AppEntry, args: &[Value]) -> DispatchResult<()> {
        match entry.dispatch(args) {
            Some(item) => self.dispatch(item),
            None => Err(DispatchError::NotDispatchable(entry.kind().to_string())),
        }
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let subscription = Subscription(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.listeners.lock().push((subscription, Arc::new(listener)));
        subscription
    }

    /// Remove a listener; returns whether it was registered
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(id, _)| *id != subscription);
        listeners.len() != before
    }

    pub fn stats(&self) -> StoreStats {
        self.stats.lock().clone()
    }

    /// Actions applied so far, empty unless `record_actions` is set
    pub fn dispatched(&self) -> Vec<Action> {
        self.journal.lock().clone()
    }

    /// Action types applied so far, in order
    pub fn dispatched_types(&self) -> Vec<String> {
        self.journal
            .lock()
            .iter()
            .map(|action| action.action_type.to_string())
            .collect()
    }

    pub fn clear_journal(&self) {
        self.journal.lock().clear();
    }

    fn dispatch_at(&self, item: Dispatch, depth: usize) -> DispatchResult<()> {
        if depth > self.config.max_dispatch_depth {
            self.stats.lock().refused += 1;
            warn!(depth, limit = self.config.max_dispatch_depth, "dispatch refused");
            return Err(DispatchError::DepthExceeded {
                limit: self.config.max_dispatch_depth,
            });
        }

        match item {
            Dispatch::Action(action) => {
                self.apply(action);
                Ok(())
            }
            Dispatch::Batch(items) => {
                self.stats.lock().batches += 1;
                for item in items {
                    self.dispatch_at(item, depth + 1)?;
                }
                Ok(())
            }
            Dispatch::Thunk(thunk) => {
                self.stats.lock().thunks += 1;
                let scoped = ScopedDispatcher {
                    store: self,
                    depth: depth + 1,
                };
                (*thunk)(&scoped)
            }
        }
    }

    fn apply(&self, action: Action) {
        trace!(action_type = %action.action_type, "applying action");
        let snapshot = {
            let mut state = self.state.write();
            let current = std::mem::take(&mut *state);
            *state = self.reducer.reduce(Some(current), &action);
            state.clone()
        };

        if self.config.record_actions {
            self.journal.lock().push(action);
        }

        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        {
            let mut stats = self.stats.lock();
            stats.actions_applied += 1;
            stats.notifications += listeners.len() as u64;
        }
        for listener in listeners {
            (*listener)(&snapshot);
        }
    }
}

impl Dispatcher for Store {
    fn dispatch(&self, item: Dispatch) -> DispatchResult<()> {
        self.dispatch_at(item, 0)
    }

    fn state(&self) -> Value {
        Store::state(self)
    }
}

/// Dispatcher handed to thunks, tracking nesting depth
struct ScopedDispatcher<'a> {
    store: &'a Store,
    depth: usize,
}

impl Dispatcher for ScopedDispatcher<'_> {
    fn dispatch(&self, item: Dispatch) -> DispatchResult<()> {
        self.store.dispatch_at(item, self.depth)
    }

    fn state(&self) -> Value {
        self.store.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ducklings_core::{handle_actions, Handlers};
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> Reducer {
        let handlers = Handlers::new()
            .on("INCREMENT", |state, _| {
                json!({"count": state["count"].as_i64().unwrap_or(0) + 1})
            })
            .on("SET", |_, action| json!({"count": action.payload().clone()}));
        handle_actions(handlers, json!({"count": 0}))
    }

    #[test]
    fn test_initial_state_from_init_action() {
        let store = Store::new(counter());
        assert_eq!(store.state(), json!({"count": 0}));
    }

    #[test]
    fn test_dispatch_action_and_batch() {
        let store = Store::with_config(counter(), StoreConfig::recording());
        store.dispatch(Action::new("INCREMENT").into()).unwrap();
        store
            .dispatch(Dispatch::batch([
                Action::new("INCREMENT"),
                Action::new("SET").with_payload(json!(10)),
                Action::new("INCREMENT"),
            ]))
            .unwrap();

        assert_eq!(store.state(), json!({"count": 11}));
        assert_eq!(
            store.dispatched_types(),
            vec!["INCREMENT", "INCREMENT", "SET", "INCREMENT"]
        );
        let stats = store.stats();
        assert_eq!(stats.actions_applied, 4);
        assert_eq!(stats.batches, 1);
    }

    #[test]
    fn test_thunk_sees_intermediate_state() {
        let store = Store::new(counter());
        let thunk = Dispatch::thunk(|dispatcher| {
            dispatcher.dispatch(Action::new("INCREMENT").into())?;
            let count = dispatcher.state()["count"].as_i64().unwrap_or(0);
            dispatcher.dispatch(Action::new("SET").with_payload(json!(count * 5)).into())
        });
        store.dispatch(thunk).unwrap();
        assert_eq!(store.state(), json!({"count": 5}));
        assert_eq!(store.stats().thunks, 1);
    }

    #[test]
    fn test_runaway_thunk_is_refused() {
        fn recurse() -> Dispatch {
            Dispatch::thunk(|dispatcher| dispatcher.dispatch(recurse()))
        }
        let store = Store::with_config(
            counter(),
            StoreConfig {
                max_dispatch_depth: 4,
                record_actions: false,
            },
        );
        assert_eq!(
            store.dispatch(recurse()),
            Err(DispatchError::DepthExceeded { limit: 4 })
        );
        assert_eq!(store.stats().refused, 1);
    }

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let store = Store::new(counter());
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let subscription = store.subscribe(move |state| {
            assert!(state["count"].is_i64());
            seen.fetch_add(1, Ordering::SeqCst);
        });

        store.dispatch(Action::new("INCREMENT").into()).unwrap();
        assert!(store.unsubscribe(subscription));
        assert!(!store.unsubscribe(subscription));
        store.dispatch(Action::new("INCREMENT").into()).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_invoke_rejects_selectors() {
        let store = Store::new(counter());
        let selector = Selector::new(|state, _| state["count"].clone());
        let entry = AppEntry::Selector(selector.clone());
        assert_eq!(
            store.invoke(&entry, &[]),
            Err(DispatchError::NotDispatchable("selector".to_string()))
        );
        assert_eq!(store.select(&selector, &[]), json!(0));
    }

    #[test]
    fn test_failed_thunk_keeps_earlier_actions() {
        let store = Store::with_config(counter(), StoreConfig::recording());
        let thunk = Dispatch::thunk(|dispatcher| {
            dispatcher.dispatch(Action::new("INCREMENT").into())?;
            Err(DispatchError::Thunk("count unavailable".to_string()))
        });
        let batch = Dispatch::batch([thunk, Action::new("INCREMENT").into()]);

        assert_eq!(
            store.dispatch(batch),
            Err(DispatchError::Thunk("count unavailable".to_string()))
        );
        assert_eq!(store.state(), json!({"count": 1}));
        assert_eq!(store.dispatched_types(), vec!["INCREMENT"]);
    }
}
