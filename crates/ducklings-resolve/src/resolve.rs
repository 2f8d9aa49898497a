//! Recursive duckling resolution
//!
//! `resolve` walks a duckling tree once and produces the merged app tree, a
//! single reducer and the initial state.
//!
//! Pipeline for a combined duckling:
//! 1. Flatten nested combined members (order preserved)
//! 2. Fold members left to right into an accumulator: leaves merge into a
//!    flat form, keyed members into a keyed form
//! 3. Reject leaf state or handlers meeting keyed members (either order)
//! 4. Synthesize the scope's reset and build the reducer

use std::collections::BTreeMap;

use ducklings_core::{
    carry_unknown_keys, combine_reducers, reduce_handler_sets, DucklingError, DucklingResult,
    Handlers, MergeDirection, Namespace, Reducer,
};
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::reset::{fan_out, reset_action, reset_type, with_reset};
use crate::{App, AppEntry, Context, Declaration, Duckling, Leaf, ReduceHelper, ResolverConfig};

/// A resolved duckling tree
#[derive(Clone, Debug)]
pub struct Resolved {
    pub app: App,
    pub reducer: Reducer,
    pub initial_state: Value,
}

/// Resolve a duckling tree at the root namespace with the default configuration
pub fn resolve(duckling: &Duckling) -> DucklingResult<Resolved> {
    Resolver::new().resolve(duckling)
}

/// Duckling resolver
#[derive(Clone, Debug, Default)]
pub struct Resolver {
    config: ResolverConfig,
}

impl Resolver {
    pub fn new() -> Self {
        Resolver::default()
    }

    pub fn with_config(config: ResolverConfig) -> Self {
        Resolver { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve at the root namespace
    pub fn resolve(&self, duckling: &Duckling) -> DucklingResult<Resolved> {
        self.resolve_in(duckling, &Namespace::root())
    }

    /// Resolve at a given namespace
    pub fn resolve_in(
        &self,
        duckling: &Duckling,
        namespace: &Namespace,
    ) -> DucklingResult<Resolved> {
        debug!(namespace = %namespace, kind = duckling.kind(), "resolving duckling");
        match duckling {
            Duckling::Leaf(leaf) => self.resolve_leaf(leaf, namespace),
            Duckling::Combined(_) => self.resolve_combined(duckling.flatten(), namespace),
            Duckling::Keyed(children) => self.resolve_keyed(children, namespace),
        }
    }

    fn resolve_leaf(&self, leaf: &Leaf, namespace: &Namespace) -> DucklingResult<Resolved> {
        let mut fold = Fold::new(namespace);
        fold.merge_leaf(leaf, &self.config)?;
        Ok(fold.finish(&self.config))
    }

    fn resolve_combined(
        &self,
        members: Vec<&Duckling>,
        namespace: &Namespace,
    ) -> DucklingResult<Resolved> {
        let mut fold = Fold::new(namespace);
        for (index, member) in members.into_iter().enumerate() {
            trace!(namespace = %namespace, index, kind = member.kind(), "folding member");
            match member {
                Duckling::Leaf(leaf) => fold.merge_leaf(leaf, &self.config)?,
                Duckling::Keyed(children) => fold.merge_keyed(self, children)?,
                Duckling::Combined(_) => {
                    return Err(invalid(namespace, "combined member survived flattening"));
                }
            }
        }
        Ok(fold.finish(&self.config))
    }

    fn resolve_keyed(
        &self,
        children: &BTreeMap<String, Duckling>,
        namespace: &Namespace,
    ) -> DucklingResult<Resolved> {
        let mut fold = Fold::new(namespace);
        fold.merge_keyed(self, children)?;
        Ok(fold.finish(&self.config))
    }
}

/// Accumulated shape of a scope
enum Form {
    /// Leaves sharing one flat state
    Flat {
        sets: Vec<Handlers>,
        initial_state: Map<String, Value>,
    },
    /// Keyed children, each owning a state slice
    Keyed {
        children: BTreeMap<String, Resolved>,
        reduce: ReduceHelper,
    },
}

/// Left-to-right accumulator for one scope
struct Fold<'n> {
    namespace: &'n Namespace,
    app: App,
    form: Form,
}

impl<'n> Fold<'n> {
    fn new(namespace: &'n Namespace) -> Self {
        Fold {
            namespace,
            app: App::new(),
            form: Form::Flat {
                sets: Vec::new(),
                initial_state: Map::new(),
            },
        }
    }

    fn merge_leaf(&mut self, leaf: &Leaf, config: &ResolverConfig) -> DucklingResult<()> {
        let declaration = {
            let reduce = match &self.form {
                Form::Keyed { reduce, .. } => Some(reduce),
                Form::Flat { .. } => None,
            };
            let ctx = Context::new(self.namespace, &self.app, reduce, config.separator);
            leaf.declare(&ctx)
        };
        self.merge_declaration(declaration, config)
    }

    fn merge_declaration(
        &mut self,
        declaration: Declaration,
        config: &ResolverConfig,
    ) -> DucklingResult<()> {
        let Declaration {
            initial_state,
            handlers,
            app,
        } = declaration;
        let initial_state = object_state(initial_state, self.namespace)?;

        // Shape conflicts take precedence over reserved names
        if let Form::Keyed { children, .. } = &self.form {
            if !initial_state.is_empty() {
                return Err(incompatible(MergeDirection::MapIntoInitialState, self.namespace));
            }
            if !handlers.is_empty() {
                return Err(incompatible(MergeDirection::MapIntoHandlers, self.namespace));
            }
            if let Some(key) = app.keys().find(|key| children.contains_key(*key)) {
                return Err(DucklingError::InvalidMapMerge {
                    namespace: self.namespace.to_string(),
                    key: key.to_string(),
                    reason: "would shadow a keyed child scope".to_string(),
                });
            }
        }

        if config.reject_reserved {
            check_reserved(&handlers, &app, self.namespace, config)?;
        }

        if let Form::Flat {
            sets,
            initial_state: merged,
        } = &mut self.form
        {
            if !handlers.is_empty() {
                sets.push(handlers);
            }
            merged.extend(initial_state);
        }

        self.app.merge(app);
        Ok(())
    }

    fn merge_keyed(
        &mut self,
        resolver: &Resolver,
        children: &BTreeMap<String, Duckling>,
    ) -> DucklingResult<()> {
        if let Form::Flat {
            sets,
            initial_state,
        } = &self.form
        {
            if !initial_state.is_empty() {
                return Err(incompatible(MergeDirection::InitialStateIntoMap, self.namespace));
            }
            if !sets.is_empty() {
                return Err(incompatible(MergeDirection::HandlersIntoMap, self.namespace));
            }
            self.form = Form::Keyed {
                children: BTreeMap::new(),
                reduce: ReduceHelper::default(),
            };
        }

        let separator = resolver.config().separator;
        if let Form::Keyed {
            children: resolved,
            reduce,
        } = &mut self.form
        {
            for (key, child) in children {
                if !Namespace::is_valid_segment(key, separator) {
                    return Err(invalid(
                        self.namespace,
                        &format!("key `{key}` must be non-empty and free of `{separator}`"),
                    ));
                }
                if *key == resolver.config().reset_key {
                    return Err(DucklingError::Reserved {
                        name: key.clone(),
                        namespace: self.namespace.to_string(),
                    });
                }
                if resolved.contains_key(key) {
                    return Err(DucklingError::InvalidMapMerge {
                        namespace: self.namespace.to_string(),
                        key: key.clone(),
                        reason: "is declared by more than one duckling map".to_string(),
                    });
                }
                if self.app.contains_key(key) {
                    return Err(DucklingError::InvalidMapMerge {
                        namespace: self.namespace.to_string(),
                        key: key.clone(),
                        reason: "would shadow an app entry declared earlier".to_string(),
                    });
                }

                let child_namespace = self.namespace.child(key.as_str());
                let child_resolved = resolver.resolve_in(child, &child_namespace)?;
                reduce.insert(key, child_resolved.app.clone(), child_resolved.reducer.clone());
                self.app.insert(key.as_str(), AppEntry::Scope(child_resolved.app.clone()));
                resolved.insert(key.clone(), child_resolved);
            }
        }
        Ok(())
    }

    fn finish(self, config: &ResolverConfig) -> Resolved {
        let Fold {
            namespace,
            mut app,
            form,
        } = self;

        match form {
            Form::Flat {
                sets,
                initial_state,
            } => {
                let initial_state = Value::Object(initial_state);
                debug!(namespace = %namespace, handler_sets = sets.len(), "resolved flat scope");
                let reducer = with_reset(
                    reduce_handler_sets(sets, initial_state.clone()),
                    reset_type(namespace, config),
                    initial_state.clone(),
                );
                app.insert(config.reset_key.as_str(), reset_action(namespace, config));
                Resolved {
                    app,
                    reducer,
                    initial_state,
                }
            }
            Form::Keyed { children, .. } => {
                debug!(namespace = %namespace, children = children.len(), "resolved keyed scope");
                let initial_state = Value::Object(
                    children
                        .iter()
                        .map(|(key, child)| (key.clone(), child.initial_state.clone()))
                        .collect(),
                );
                let reducer = carry_unknown_keys(combine_reducers(
                    children
                        .iter()
                        .map(|(key, child)| (key.clone(), child.reducer.clone()))
                        .collect(),
                ));
                app.insert(config.reset_key.as_str(), fan_out(&children, &config.reset_key));
                Resolved {
                    app,
                    reducer,
                    initial_state,
                }
            }
        }
    }
}

fn object_state(initial_state: Value, namespace: &Namespace) -> DucklingResult<Map<String, Value>> {
    match initial_state {
        Value::Null => Ok(Map::new()),
        Value::Object(map) => Ok(map),
        other => Err(invalid(
            namespace,
            &format!("initialState must be an object, got `{other}`"),
        )),
    }
}

fn check_reserved(
    handlers: &Handlers,
    app: &App,
    namespace: &Namespace,
    config: &ResolverConfig,
) -> DucklingResult<()> {
    let reset_type = reset_type(namespace, config);
    if handlers.contains(reset_type.as_str()) {
        return Err(DucklingError::Reserved {
            name: reset_type.to_string(),
            namespace: namespace.to_string(),
        });
    }
    if app.contains_key(&config.reset_key) {
        return Err(DucklingError::Reserved {
            name: config.reset_key.clone(),
            namespace: namespace.to_string(),
        });
    }
    Ok(())
}

fn invalid(namespace: &Namespace, reason: &str) -> DucklingError {
    DucklingError::InvalidDuckling {
        namespace: namespace.to_string(),
        reason: reason.to_string(),
    }
}

fn incompatible(direction: MergeDirection, namespace: &Namespace) -> DucklingError {
    DucklingError::IncompatibleMergeShape {
        direction,
        namespace: namespace.to_string(),
    }
}
