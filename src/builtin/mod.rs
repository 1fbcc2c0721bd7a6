//! Builtin identifier registry.
//!
//! Builtins are a shared library of assets (material modules, mostly) that
//! are referenced by bare name from nearly every document. Anchoring them to
//! the referencing document and probing the remote service would fail almost
//! every time, so when the bypass is enabled they skip anchoring entirely and
//! resolve only via configured search paths.

use parking_lot::RwLock;
use rustc_hash::FxHashSet;

use crate::config::ResolverConfig;

/// Process-wide set of identifiers exempt from anchoring.
///
/// The enable flag is captured at construction and never re-read; whether a
/// later configuration change should take effect is deliberately left
/// unresolved. The name set itself can be swapped at any time with
/// [`replace`](Self::replace).
#[derive(Debug)]
pub struct BuiltinRegistry {
    enabled: bool,
    names: RwLock<FxHashSet<String>>,
}

impl BuiltinRegistry {
    /// Build a registry from configuration.
    pub fn new(config: &ResolverConfig) -> Self {
        Self {
            enabled: config.builtin_bypass,
            names: RwLock::new(config.builtin_paths.iter().cloned().collect()),
        }
    }

    /// Atomically replace the entire builtin set. Never additive.
    pub fn replace(&self, names: impl IntoIterator<Item = String>) {
        let names: FxHashSet<String> = names.into_iter().collect();
        crate::debug!("builtin"; "replaced builtin set ({} entries)", names.len());
        *self.names.write() = names;
    }

    /// Check whether an identifier is a builtin. Always false when the
    /// bypass is disabled; otherwise requires exact membership.
    pub fn is_builtin(&self, identifier: &str) -> bool {
        self.enabled && self.names.read().contains(identifier)
    }

    /// Whether the bypass was enabled when this registry was built.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of registered builtin identifiers.
    pub fn len(&self) -> usize {
        self.names.read().len()
    }

    /// Check if the builtin set is empty.
    pub fn is_empty(&self) -> bool {
        self.names.read().is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
