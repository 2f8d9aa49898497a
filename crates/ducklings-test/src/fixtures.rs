//! Duckling fixtures shared by scenario tests, the fuzzer and benches

use ducklings_core::{Dispatch, Dispatcher};
use ducklings_resolve::{Command, Declaration, Duckling};
use serde_json::{json, Value};

fn count(state: &Value, field: &str) -> i64 {
    state[field].as_i64().unwrap_or(0)
}

/// Declares nothing
pub fn identity() -> Duckling {
    Duckling::leaf(|_| Declaration::new())
}

/// `countUp` counter with `increment` and `getCountUp`
pub fn incrementer() -> Duckling {
    Duckling::leaf(|ctx| {
        let increment = ctx.action("INCREMENT");
        Declaration::new()
            .with_initial_state(json!({"countUp": 0}))
            .on(&increment, |state, _| json!({"countUp": count(state, "countUp") + 1}))
            .with("increment", increment)
            .with("getCountUp", ctx.selector(|state, _| state["countUp"].clone()))
    })
}

/// `countDown` counter with `decrement` and `getCountDown`
pub fn decrementer() -> Duckling {
    Duckling::leaf(|ctx| {
        let decrement = ctx.action("DECREMENT");
        Declaration::new()
            .with_initial_state(json!({"countDown": 0}))
            .on(&decrement, |state, _| {
                json!({"countDown": count(state, "countDown") - 1})
            })
            .with("decrement", decrement)
            .with("getCountDown", ctx.selector(|state, _| state["countDown"].clone()))
    })
}

pub fn toggle() -> Duckling {
    Duckling::leaf(|ctx| {
        let toggle = ctx.action("TOGGLE");
        Declaration::new()
            .with_initial_state(json!({"toggle": false}))
            .on(&toggle, |state, _| {
                json!({"toggle": !state["toggle"].as_bool().unwrap_or(false)})
            })
            .with("toggle", toggle)
            .with("getToggle", ctx.selector(|state, _| state["toggle"].clone()))
    })
}

/// `{incrementer1, incrementer2}`
pub fn multiple_incrementers() -> Duckling {
    Duckling::keyed([("incrementer1", incrementer()), ("incrementer2", incrementer())])
}

/// `[decrementer, incrementer]`, one flat state
pub fn decrementer_incrementer() -> Duckling {
    Duckling::combined([decrementer(), incrementer()])
}

/// `[[decrementer, incrementer], toggle]`
pub fn decrementer_incrementer_toggle() -> Duckling {
    Duckling::combined([decrementer_incrementer(), toggle()])
}

/// `{deep: {path: leaf}}` whose `setTest` command stores the joined namespace
pub fn namespaced() -> Duckling {
    let path = Duckling::leaf(|ctx| {
        let test = ctx.action("TEST");
        let joined = Value::String(ctx.namespace().join("."));
        let set = test.clone();
        let set_test = Command::new(move |_| {
            let action = set.create(&[joined.clone()]);
            Dispatch::thunk(move |dispatcher: &dyn Dispatcher| {
                dispatcher.dispatch(action.clone().into())
            })
        });
        Declaration::new()
            .with_initial_state(json!({"test": ""}))
            .on(&test, |_, action| json!({"test": action.payload().clone()}))
            .with("getTest", ctx.selector(|state, _| state["test"].clone()))
            .with("setTest", set_test)
    });
    Duckling::keyed([("deep", Duckling::keyed([("path", path)]))])
}

/// Two keyed mappings merged in one list
pub fn merged_combined() -> Duckling {
    Duckling::combined([
        multiple_incrementers(),
        Duckling::keyed([("incrementer3", incrementer()), ("incrementer4", incrementer())]),
    ])
}

/// Keyed incrementers plus a leaf exposing `incrementAll` built from their app
pub fn container() -> Duckling {
    let increment_all = Duckling::leaf(|ctx| {
        let creators: Vec<_> = ["incrementer1", "incrementer2"]
            .iter()
            .filter_map(|key| ctx.app().scope(key)?.action("increment").cloned())
            .collect();
        let increment_all = Command::new(move |_| {
            let creators = creators.clone();
            Dispatch::thunk(move |dispatcher: &dyn Dispatcher| {
                for creator in &creators {
                    dispatcher.dispatch(creator.call().into())?;
                }
                Ok(())
            })
        });
        Declaration::new().with("incrementAll", increment_all)
    });
    Duckling::combined([multiple_incrementers(), increment_all])
}

/// Leaf with a non-empty initial state
pub fn with_initial_state() -> Duckling {
    Duckling::leaf(|_| Declaration::new().with_initial_state(json!({"value": true})))
}

/// Leaf with a non-empty handler table
pub fn with_handlers() -> Duckling {
    Duckling::leaf(|_| Declaration::new().on("ACTION", |state, _| state.clone()))
}

pub fn error_merge_initial_state_with_combined() -> Duckling {
    Duckling::combined([with_initial_state(), multiple_incrementers()])
}

pub fn error_merge_combined_with_initial_state() -> Duckling {
    Duckling::combined([multiple_incrementers(), with_initial_state()])
}

pub fn error_merge_handlers_with_combined() -> Duckling {
    Duckling::combined([with_handlers(), multiple_incrementers()])
}

pub fn error_merge_combined_with_handlers() -> Duckling {
    Duckling::combined([multiple_incrementers(), with_handlers()])
}

/// Keyed tree `depth` levels deep with `width` incrementers per level
pub fn nested_incrementers(depth: usize, width: usize) -> Duckling {
    let leaves = (0..width).map(|i| (format!("incrementer{}", i + 1), incrementer()));
    if depth <= 1 {
        return Duckling::keyed(leaves);
    }
    let mut children: Vec<(String, Duckling)> = leaves.collect();
    children.push(("nested".to_string(), nested_incrementers(depth - 1, width)));
    Duckling::keyed(children)
}
