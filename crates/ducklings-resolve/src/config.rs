//! Resolver configuration

use ducklings_core::DEFAULT_SEPARATOR;

/// Reset action type synthesized at every scope
pub const RESET_ACTION_TYPE: &str = "RESET";

/// App key of the synthesized reset entry
pub const RESET_ACTION_CREATOR: &str = "reset";

/// Resolver configuration
#[derive(Clone, Debug)]
pub struct ResolverConfig {
    /// Bare type of the synthesized reset action
    pub reset_type: String,
    /// App key exposing the reset action or fan-out command
    pub reset_key: String,
    /// Separator between namespace segments in action types
    pub separator: char,
    /// Reject leaves that declare the reserved reset type or key
    pub reject_reserved: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            reset_type: RESET_ACTION_TYPE.to_string(),
            reset_key: RESET_ACTION_CREATOR.to_string(),
            separator: DEFAULT_SEPARATOR,
            reject_reserved: true,
        }
    }
}

impl ResolverConfig {
    /// Let declarations shadow the reserved reset (the synthesized one wins)
    pub fn permissive() -> Self {
        ResolverConfig {
            reject_reserved: false,
            ..ResolverConfig::default()
        }
    }
}
