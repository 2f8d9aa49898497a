//! End-to-end Integration Test Suite
//!
//! Resolves fixture ducklings, runs them in a recording store and checks:
//! - Namespaced action types reach the store
//! - Keyed and flat state shapes
//! - Reset at every scope
//! - Merge conflicts in both orders

use ducklings_core::{DispatchError, DispatchResult, DucklingResult};
use ducklings_resolve::{resolve, AppEntry, Duckling, Resolved};
use ducklings_store::{Store, StoreConfig};
use serde_json::Value;

// ============================================================================
// SCENARIO
// ============================================================================

/// A resolved duckling running in a store that records every applied action
pub struct Scenario {
    pub resolved: Resolved,
    pub store: Store,
}

impl Scenario {
    pub fn new(duckling: &Duckling) -> DucklingResult<Self> {
        let resolved = resolve(duckling)?;
        let store = Store::with_config(resolved.reducer.clone(), StoreConfig::recording());
        Ok(Scenario { resolved, store })
    }

    fn entry(&self, path: &str) -> DispatchResult<&AppEntry> {
        let segments: Vec<&str> = path.split('.').collect();
        self.resolved
            .app
            .at(&segments)
            .ok_or_else(|| DispatchError::NotDispatchable(format!("no app entry at `{path}`")))
    }

    /// Invoke the action or command at a dotted app path
    pub fn call(&self, path: &str, args: &[Value]) -> DispatchResult<()> {
        let entry = self.entry(path)?;
        self.store.invoke(entry, args)
    }

    /// Run the selector at a dotted app path against the current state
    pub fn select(&self, path: &str) -> Value {
        match self.entry(path) {
            Ok(AppEntry::Selector(selector)) => self.store.select(selector, &[]),
            _ => Value::Null,
        }
    }

    pub fn state(&self) -> Value {
        self.store.state()
    }

    /// Whether an action of this type has been applied
    pub fn dispatched(&self, action_type: &str) -> bool {
        self.store
            .dispatched()
            .iter()
            .any(|action| action.is(action_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use ducklings_core::{Action, Dispatcher, DucklingError, MergeDirection};
    use proptest::prelude::*;
    use serde_json::json;

    fn scenario(duckling: Duckling) -> Scenario {
        Scenario::new(&duckling).unwrap()
    }

    fn merge_error(duckling: Duckling) -> DucklingError {
        match resolve(&duckling) {
            Err(err) => err,
            Ok(resolved) => panic!("resolved to {}", resolved.initial_state),
        }
    }

    #[test]
    fn test_identity_duckling() {
        let s = scenario(fixtures::identity());
        assert_eq!(s.state(), json!({}));

        s.store.dispatch(Action::new("TEST").into()).unwrap();
        assert_eq!(s.state(), json!({}));

        let keys: Vec<&str> = s.resolved.app.keys().collect();
        assert_eq!(keys, vec!["reset"]);
    }

    #[test]
    fn test_incrementer() {
        let s = scenario(fixtures::incrementer());
        assert_eq!(s.select("getCountUp"), json!(0));

        s.call("increment", &[]).unwrap();
        assert!(s.dispatched("INCREMENT"));
        assert_eq!(s.select("getCountUp"), json!(1));

        s.call("reset", &[]).unwrap();
        assert!(s.dispatched("RESET"));
        assert_eq!(s.select("getCountUp"), json!(0));
    }

    #[test]
    fn test_multiple_incrementers() {
        let s = scenario(fixtures::multiple_incrementers());
        assert_eq!(
            s.state(),
            json!({"incrementer1": {"countUp": 0}, "incrementer2": {"countUp": 0}})
        );

        s.call("incrementer1.increment", &[]).unwrap();
        assert!(s.dispatched("incrementer1/INCREMENT"));
        assert_eq!(s.select("incrementer1.getCountUp"), json!(1));
        assert_eq!(s.select("incrementer2.getCountUp"), json!(0));

        s.call("incrementer1.reset", &[]).unwrap();
        assert!(s.dispatched("incrementer1/RESET"));
        assert_eq!(s.select("incrementer1.getCountUp"), json!(0));
        assert_eq!(s.select("incrementer2.getCountUp"), json!(0));
    }

    #[test]
    fn test_merged_combined_reset_cascades() {
        let s = scenario(fixtures::merged_combined());
        for i in 1..=4 {
            assert_eq!(s.select(&format!("incrementer{i}.getCountUp")), json!(0));
        }

        s.call("incrementer1.increment", &[]).unwrap();
        s.call("incrementer3.increment", &[]).unwrap();
        assert!(s.dispatched("incrementer1/INCREMENT"));
        assert!(s.dispatched("incrementer3/INCREMENT"));
        assert_eq!(s.select("incrementer1.getCountUp"), json!(1));
        assert_eq!(s.select("incrementer2.getCountUp"), json!(0));
        assert_eq!(s.select("incrementer3.getCountUp"), json!(1));
        assert_eq!(s.select("incrementer4.getCountUp"), json!(0));

        s.store.clear_journal();
        s.call("reset", &[]).unwrap();
        assert_eq!(
            s.store.dispatched_types(),
            vec![
                "incrementer1/RESET",
                "incrementer2/RESET",
                "incrementer3/RESET",
                "incrementer4/RESET"
            ]
        );
        assert_eq!(s.state(), s.resolved.initial_state);
    }

    #[test]
    fn test_decrementer_incrementer() {
        let s = scenario(fixtures::decrementer_incrementer());
        assert_eq!(s.state(), json!({"countUp": 0, "countDown": 0}));

        s.call("increment", &[]).unwrap();
        assert!(s.dispatched("INCREMENT"));
        s.call("decrement", &[]).unwrap();
        assert!(s.dispatched("DECREMENT"));
        assert_eq!(s.select("getCountUp"), json!(1));
        assert_eq!(s.select("getCountDown"), json!(-1));

        s.call("reset", &[]).unwrap();
        assert_eq!(s.select("getCountUp"), json!(0));
        assert_eq!(s.select("getCountDown"), json!(0));
    }

    #[test]
    fn test_deeply_composed() {
        let s = scenario(fixtures::decrementer_incrementer_toggle());
        assert_eq!(
            s.state(),
            json!({"countUp": 0, "countDown": 0, "toggle": false})
        );

        s.call("increment", &[]).unwrap();
        s.call("decrement", &[]).unwrap();
        s.call("toggle", &[]).unwrap();
        assert!(s.dispatched("TOGGLE"));
        assert_eq!(s.state(), json!({"countUp": 1, "countDown": -1, "toggle": true}));

        s.call("reset", &[]).unwrap();
        assert_eq!(s.state(), json!({"countUp": 0, "countDown": 0, "toggle": false}));
    }

    #[test]
    fn test_container_increment_all() {
        let s = scenario(fixtures::container());
        s.call("incrementAll", &[]).unwrap();
        assert_eq!(s.select("incrementer1.getCountUp"), json!(1));
        assert_eq!(s.select("incrementer2.getCountUp"), json!(1));
        assert_eq!(s.store.stats().thunks, 1);

        s.call("reset", &[]).unwrap();
        assert_eq!(s.select("incrementer1.getCountUp"), json!(0));
        assert_eq!(s.select("incrementer2.getCountUp"), json!(0));
    }

    #[test]
    fn test_namespaced() {
        let s = scenario(fixtures::namespaced());
        assert_eq!(s.select("deep.path.getTest"), json!(""));

        s.call("deep.path.setTest", &[]).unwrap();
        assert!(s.dispatched("deep/path/TEST"));
        assert_eq!(s.select("deep.path.getTest"), json!("path.deep"));

        s.call("deep.reset", &[]).unwrap();
        assert!(s.dispatched("deep/path/RESET"));
        assert_eq!(s.select("deep.path.getTest"), json!(""));
    }

    #[test]
    fn test_selectors_are_not_dispatchable() {
        let s = scenario(fixtures::incrementer());
        assert_eq!(
            s.call("getCountUp", &[]),
            Err(DispatchError::NotDispatchable("selector".to_string()))
        );
        assert!(matches!(
            s.call("missing", &[]),
            Err(DispatchError::NotDispatchable(_))
        ));
    }

    #[test]
    fn test_merge_errors() {
        let cases = [
            (
                fixtures::error_merge_initial_state_with_combined(),
                MergeDirection::InitialStateIntoMap,
                "Cannot merge a non empty `initialState` with duckling map",
            ),
            (
                fixtures::error_merge_combined_with_initial_state(),
                MergeDirection::MapIntoInitialState,
                "Cannot merge a non empty `initialState` with duckling map",
            ),
            (
                fixtures::error_merge_handlers_with_combined(),
                MergeDirection::HandlersIntoMap,
                "Cannot merge non empty `handlers` with duckling map",
            ),
            (
                fixtures::error_merge_combined_with_handlers(),
                MergeDirection::MapIntoHandlers,
                "Cannot merge non empty `handlers` with duckling map",
            ),
        ];
        for (duckling, expected, message) in cases {
            let err = merge_error(duckling);
            assert!(err.to_string().starts_with(message), "{err}");
            assert_eq!(
                err,
                DucklingError::IncompatibleMergeShape {
                    direction: expected,
                    namespace: "<root>".to_string(),
                }
            );
        }
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let first = scenario(fixtures::merged_combined());
        let second = scenario(fixtures::merged_combined());
        for path in ["incrementer2.increment", "incrementer4.increment", "incrementer2.reset"] {
            first.call(path, &[]).unwrap();
            second.call(path, &[]).unwrap();
        }
        assert_eq!(first.state(), second.state());
        assert_eq!(first.store.dispatched(), second.store.dispatched());
    }

    proptest! {
        #[test]
        fn prop_keyed_increments_are_isolated(steps in prop::collection::vec(0usize..4, 0..40)) {
            let s = scenario(fixtures::merged_combined());
            let mut expected = [0i64; 4];
            for step in &steps {
                s.call(&format!("incrementer{}.increment", step + 1), &[]).unwrap();
                expected[*step] += 1;
            }
            for (i, count) in expected.iter().enumerate() {
                prop_assert_eq!(
                    s.select(&format!("incrementer{}.getCountUp", i + 1)),
                    json!(count)
                );
            }

            s.call("reset", &[]).unwrap();
            prop_assert_eq!(s.state(), s.resolved.initial_state.clone());
        }
    }
}
