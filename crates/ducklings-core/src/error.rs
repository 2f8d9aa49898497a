//! Error types for ducklings
//!
//! Resolution errors are configuration errors raised once, while the duckling
//! tree is resolved. Reducers never fail. Dispatch errors belong to the store.

use std::fmt;

use thiserror::Error;

/// Which side of a leaf/map merge carried the offending declaration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MergeDirection {
    /// A leaf with a non-empty initial state, followed by a duckling map
    InitialStateIntoMap,
    /// A duckling map, followed by a leaf with a non-empty initial state
    MapIntoInitialState,
    /// A leaf with non-empty handlers, followed by a duckling map
    HandlersIntoMap,
    /// A duckling map, followed by a leaf with non-empty handlers
    MapIntoHandlers,
}

impl MergeDirection {
    /// Name of the declaration field that could not be merged
    pub fn field(self) -> &'static str {
        match self {
            MergeDirection::InitialStateIntoMap | MergeDirection::MapIntoInitialState => {
                "initialState"
            }
            MergeDirection::HandlersIntoMap | MergeDirection::MapIntoHandlers => "handlers",
        }
    }

    /// Opening of the merge error message for this field
    pub fn subject(self) -> &'static str {
        match self {
            MergeDirection::InitialStateIntoMap | MergeDirection::MapIntoInitialState => {
                "Cannot merge a non empty `initialState`"
            }
            MergeDirection::HandlersIntoMap | MergeDirection::MapIntoHandlers => {
                "Cannot merge non empty `handlers`"
            }
        }
    }
}

impl fmt::Display for MergeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeDirection::InitialStateIntoMap => write!(f, "initialState into duckling map"),
            MergeDirection::MapIntoInitialState => write!(f, "duckling map into initialState"),
            MergeDirection::HandlersIntoMap => write!(f, "handlers into duckling map"),
            MergeDirection::MapIntoHandlers => write!(f, "duckling map into handlers"),
        }
    }
}

/// Resolution errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DucklingError {
    #[error("invalid duckling at `{namespace}`: {reason}")]
    InvalidDuckling { namespace: String, reason: String },

    #[error(
        "{} with duckling map ({direction}) at `{namespace}`",
        .direction.subject()
    )]
    IncompatibleMergeShape {
        direction: MergeDirection,
        namespace: String,
    },

    #[error("invalid duckling map merge at `{namespace}`: key `{key}` {reason}")]
    InvalidMapMerge {
        namespace: String,
        key: String,
        reason: String,
    },

    #[error("`{name}` is reserved for the synthesized reset at `{namespace}`")]
    Reserved { name: String, namespace: String },
}

/// Dispatch errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Dispatch depth exceeded: limit {limit}")]
    DepthExceeded { limit: usize },

    #[error("Not dispatchable: {0}")]
    NotDispatchable(String),

    #[error("Thunk failed: {0}")]
    Thunk(String),
}

/// Result type for resolution
pub type DucklingResult<T> = Result<T, DucklingError>;

/// Result type for dispatch
pub type DispatchResult<T> = Result<T, DispatchError>;
