//! Action Sequence Fuzzer - randomized dispatch against resolved ducklings
//!
//! Tests:
//! - Resolution is deterministic (two resolutions, same states)
//! - Root reset restores the initial state
//! - Unknown action types leave state unchanged

use ducklings_core::{Action, Dispatch, Dispatcher, DucklingResult};
use ducklings_resolve::{resolve, App, AppEntry, Duckling, Resolved};
use ducklings_store::{Store, StoreConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};
use tracing::debug;

/// Fuzzer configuration
#[derive(Clone, Debug)]
pub struct FuzzerConfig {
    /// Number of dispatch steps
    pub steps: usize,
    /// Probability of dispatching an unknown action type
    pub noise_prob: f64,
    /// Probability of a root reset mid-run
    pub reset_prob: f64,
    /// Random seed
    pub seed: u64,
}

impl Default for FuzzerConfig {
    fn default() -> Self {
        FuzzerConfig {
            steps: 500,
            noise_prob: 0.1,
            reset_prob: 0.02,
            seed: 42,
        }
    }
}

impl FuzzerConfig {
    /// Light fuzzing for quick tests
    pub fn light() -> Self {
        FuzzerConfig {
            steps: 50,
            noise_prob: 0.1,
            reset_prob: 0.0,
            seed: 42,
        }
    }

    /// Heavy fuzzing for thorough testing
    pub fn heavy() -> Self {
        FuzzerConfig {
            steps: 5000,
            noise_prob: 0.2,
            reset_prob: 0.05,
            seed: 42,
        }
    }
}

/// Result of a fuzz run
#[derive(Clone, Debug, Default)]
pub struct FuzzResult {
    pub steps: usize,
    pub actions_applied: u64,
    /// Steps at which the two stores disagreed
    pub divergences: Vec<usize>,
    /// Unknown actions that changed state
    pub noise_violations: usize,
    pub dispatch_errors: usize,
    /// Whether the final root reset restored the initial state
    pub reset_restored: bool,
}

impl FuzzResult {
    pub fn is_clean(&self) -> bool {
        self.divergences.is_empty()
            && self.noise_violations == 0
            && self.dispatch_errors == 0
            && self.reset_restored
    }
}

/// Drives two independently resolved stores with the same random dispatches
pub struct ActionFuzzer {
    config: FuzzerConfig,
    resolved: Resolved,
    left: Store,
    right: Store,
    entries: Vec<Vec<String>>,
    rng: StdRng,
}

impl ActionFuzzer {
    /// Resolve `duckling` twice; resolution errors are returned as is
    pub fn new(duckling: &Duckling, config: FuzzerConfig) -> DucklingResult<Self> {
        let resolved = resolve(duckling)?;
        let twin = resolve(duckling)?;
        let entries = dispatchable_paths(&resolved.app);
        Ok(ActionFuzzer {
            rng: StdRng::seed_from_u64(config.seed),
            left: Store::new(resolved.reducer.clone()),
            right: Store::with_config(twin.reducer, StoreConfig::default()),
            resolved,
            entries,
            config,
        })
    }

    /// Paths of every action and command in the app tree
    pub fn entries(&self) -> &[Vec<String>] {
        &self.entries
    }

    pub fn run(&mut self) -> FuzzResult {
        let mut result = FuzzResult {
            steps: self.config.steps,
            ..FuzzResult::default()
        };

        for step in 0..self.config.steps {
            if self.rng.gen::<f64>() < self.config.noise_prob {
                let before = self.left.state();
                let noise = Action::new(format!("@@fuzz/NOISE_{}", self.rng.gen::<u32>()));
                self.dispatch_both(noise.into(), &mut result);
                if self.left.state() != before {
                    result.noise_violations += 1;
                }
            } else if self.rng.gen::<f64>() < self.config.reset_prob {
                self.reset(&mut result);
            } else if !self.entries.is_empty() {
                let index = self.rng.gen_range(0..self.entries.len());
                let args = [json!(self.rng.gen_range(-100..100))];
                if let Some(item) = self.entry(index).and_then(|entry| entry.dispatch(&args)) {
                    self.dispatch_both(item, &mut result);
                }
            }

            if self.left.state() != self.right.state() {
                result.divergences.push(step);
            }
        }

        self.reset(&mut result);
        result.reset_restored = self.left.state() == self.resolved.initial_state
            && self.right.state() == self.resolved.initial_state;
        result.actions_applied = self.left.stats().actions_applied;

        debug!(
            steps = result.steps,
            actions = result.actions_applied,
            divergences = result.divergences.len(),
            "fuzz run complete"
        );
        result
    }

    fn entry(&self, index: usize) -> Option<&AppEntry> {
        let path: Vec<&str> = self.entries[index].iter().map(String::as_str).collect();
        self.resolved.app.at(&path)
    }

    fn reset(&mut self, result: &mut FuzzResult) {
        if let Some(item) = self.resolved.app.get("reset").and_then(|reset| reset.dispatch(&[])) {
            self.dispatch_both(item, result);
        }
    }

    fn dispatch_both(&self, item: Dispatch, result: &mut FuzzResult) {
        if self.left.dispatch(item.clone()).is_err() {
            result.dispatch_errors += 1;
        }
        if self.right.dispatch(item).is_err() {
            result.dispatch_errors += 1;
        }
    }

    pub fn state(&self) -> Value {
        self.left.state()
    }
}

/// Paths to actions and commands, in key order
pub fn dispatchable_paths(app: &App) -> Vec<Vec<String>> {
    let mut paths = Vec::new();
    collect_paths(app, &mut Vec::new(), &mut paths);
    paths
}

fn collect_paths(app: &App, prefix: &mut Vec<String>, paths: &mut Vec<Vec<String>>) {
    for (key, entry) in app {
        prefix.push(key.clone());
        match entry {
            AppEntry::Action(_) | AppEntry::Command(_) => paths.push(prefix.clone()),
            AppEntry::Scope(scope) => collect_paths(scope, prefix, paths),
            AppEntry::Selector(_) => {}
        }
        prefix.pop();
    }
}

/// Property checks
pub mod properties {
    use super::*;

    /// Property: an unknown action type leaves state unchanged
    pub fn unknown_action_is_identity(resolved: &Resolved, state: &Value) -> bool {
        let next = resolved
            .reducer
            .reduce(Some(state.clone()), &Action::new("@@fuzz/UNKNOWN"));
        next == *state
    }

    /// Property: reducing from unset state yields the initial state
    pub fn init_matches_initial_state(resolved: &Resolved) -> bool {
        resolved.reducer.init() == resolved.initial_state
    }

    /// Property: the root reset maps any reachable state back to the initial state
    pub fn reset_restores(resolved: &Resolved, state: Value) -> bool {
        let Some(reset) = resolved.app.get("reset").and_then(|reset| reset.dispatch(&[])) else {
            return false;
        };
        let restored = reset
            .actions()
            .into_iter()
            .fold(state, |state, action| resolved.reducer.reduce(Some(state), action));
        restored == resolved.initial_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_fuzzer_light() {
        for duckling in [
            fixtures::incrementer(),
            fixtures::multiple_incrementers(),
            fixtures::decrementer_incrementer_toggle(),
            fixtures::merged_combined(),
            fixtures::container(),
            fixtures::namespaced(),
        ] {
            let mut fuzzer = ActionFuzzer::new(&duckling, FuzzerConfig::light()).unwrap();
            let result = fuzzer.run();
            assert!(result.is_clean(), "{result:?}");
        }
    }

    #[test]
    fn test_fuzzer_default_nested() {
        let duckling = fixtures::nested_incrementers(3, 3);
        let mut fuzzer = ActionFuzzer::new(&duckling, FuzzerConfig::default()).unwrap();
        let result = fuzzer.run();
        assert!(result.is_clean(), "{result:?}");
        assert!(result.actions_applied > 0);
    }

    #[test]
    fn test_dispatchable_paths() {
        let resolved = resolve(&fixtures::container()).unwrap();
        let paths = dispatchable_paths(&resolved.app);
        let rendered: Vec<String> = paths.iter().map(|path| path.join(".")).collect();
        assert_eq!(
            rendered,
            vec![
                "incrementAll",
                "incrementer1.increment",
                "incrementer1.reset",
                "incrementer2.increment",
                "incrementer2.reset",
                "reset",
            ]
        );
    }

    #[test]
    fn test_properties_on_fixtures() {
        let resolved = resolve(&fixtures::decrementer_incrementer()).unwrap();
        let state = json!({"countDown": -3, "countUp": 7});
        assert!(properties::unknown_action_is_identity(&resolved, &state));
        assert!(properties::init_matches_initial_state(&resolved));
        assert!(properties::reset_restores(&resolved, state));
    }
}
