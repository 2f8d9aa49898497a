//! Selector tree combination
//!
//! For hand-assembled selector trees written against local state: every
//! selector under a top-level key is remapped to read `state[key]`.
//! Top-level selectors are kept as they are. Nested scopes below a key are
//! remapped with that same top-level key.

use crate::{App, AppEntry};

/// Remap a selector tree so each top-level scope reads its own state slice
pub fn combine_selectors(tree: &App) -> App {
    let mut combined = App::new();
    for (key, entry) in tree {
        let entry = match entry {
            AppEntry::Scope(scope) => AppEntry::Scope(remap(scope, key)),
            other => other.clone(),
        };
        combined.insert(key.as_str(), entry);
    }
    combined
}

fn remap(scope: &App, key: &str) -> App {
    let mut remapped = App::new();
    for (name, entry) in scope {
        let entry = match entry {
            AppEntry::Selector(selector) => AppEntry::Selector(selector.focused(key)),
            AppEntry::Scope(inner) => AppEntry::Scope(remap(inner, key)),
            other => other.clone(),
        };
        remapped.insert(name.as_str(), entry);
    }
    remapped
}
