//! Namespaces - the position of a duckling in the composition tree
//!
//! Segments are stored innermost first, so descending into a keyed child
//! prepends its key. The root namespace is empty.
//!
//! For the namespace `[path, deep]` (innermost `path`):
//! - action types are prefixed outermost first: `deep/path/TYPE`
//! - state is focused outermost first: `state["deep"]["path"]`
//! - [`Namespace::join`] keeps storage order: `path.deep`

use std::fmt;

use serde_json::Value;

use crate::ActionType;

/// Default separator between namespace segments in action types
pub const DEFAULT_SEPARATOR: char = '/';

/// Ordered namespace segments, innermost first
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Namespace {
    segments: Vec<String>,
}

impl Namespace {
    /// The root namespace
    pub fn root() -> Self {
        Namespace::default()
    }

    /// Build a namespace from segments given innermost first
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Namespace {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Namespace of a keyed child: `[key, ...self]`
    pub fn child(&self, key: impl Into<String>) -> Namespace {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.push(key.into());
        segments.extend(self.segments.iter().cloned());
        Namespace { segments }
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segments, innermost first
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Innermost segment (the key this duckling was declared under)
    pub fn innermost(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }

    /// Prefix a bare type name with every segment, innermost closest to the name
    pub fn prefix_type(&self, name: &str, separator: char) -> String {
        self.segments.iter().fold(name.to_string(), |type_so_far, segment| {
            format!("{segment}{separator}{type_so_far}")
        })
    }

    /// Namespaced action type using the default separator
    pub fn action_type(&self, name: &str) -> ActionType {
        ActionType::new(self.prefix_type(name, DEFAULT_SEPARATOR))
    }

    /// Focus a root state down to this namespace, outermost segment first
    pub fn focus<'a>(&self, state: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .rev()
            .try_fold(state, |state, segment| state.get(segment))
    }

    /// Join segments in storage order (innermost first)
    pub fn join(&self, separator: &str) -> String {
        self.segments.join(separator)
    }

    /// A segment is usable as a key if it is non-empty and free of the separator
    pub fn is_valid_segment(segment: &str, separator: char) -> bool {
        !segment.is_empty() && !segment.contains(separator)
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Namespace({self})")
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return write!(f, "<root>");
        }
        let outward: Vec<&str> = self.segments.iter().rev().map(String::as_str).collect();
        write!(f, "{}", outward.join("/"))
    }
}
