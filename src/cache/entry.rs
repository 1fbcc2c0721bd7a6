//! Resolved-entry record stored in the resolution cache.

use std::time::SystemTime;

/// The result of resolving one identifier.
///
/// Immutable once constructed; cache repopulation replaces entries wholesale.
/// An empty `resolved_path` is the "unresolved" sentinel - resolution misses
/// are values, never errors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedEntry {
    /// The stripped identifier this entry was resolved from.
    pub identifier: String,
    /// The service-side location, scheme and all. Empty if unresolved.
    pub url: String,
    /// The concrete fetchable location: a plain filesystem path for local
    /// assets, the url otherwise. Empty if unresolved.
    pub resolved_path: String,
    /// Opaque version token reported by the service. May be empty.
    pub version: String,
    /// Wall-clock modification instant, when the service reported one.
    pub modified: Option<SystemTime>,
    /// Size in bytes.
    pub size: u64,
}

impl ResolvedEntry {
    /// The "not found" sentinel for an identifier.
    pub fn unresolved(identifier: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            ..Self::default()
        }
    }

    /// Whether this entry carries a concrete location.
    pub fn is_resolved(&self) -> bool {
        !self.resolved_path.is_empty()
    }
}
