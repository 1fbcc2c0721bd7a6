//! Asset path resolution.
//!
//! [`Resolver`] ties the pieces together: identifier construction anchors
//! relative references to the active base location (with the builtin bypass
//! and "look here first" tie-breaks), and resolution goes through the
//! per-thread scoped cache before falling back to the asset service.

mod engine;
mod identifier;

use std::sync::Arc;

use crate::builtin::BuiltinRegistry;
use crate::cache::{ScopeHandle, ScopedCacheStack};
use crate::config::ResolverConfig;
use crate::context::{BoundContext, ContextBindingStack};
use crate::core::url;
use crate::notify::Notifier;
use crate::service::AssetService;

/// Version and location metadata for a resolved asset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetInfo {
    pub version: String,
    pub url: String,
    pub size: u64,
}

/// Outcome of a write pre-check: allowed or denied with a readable reason.
#[derive(Debug, Clone, PartialEq)]
pub struct WritePermission {
    pub can_write: bool,
    pub reason: Option<String>,
}

impl WritePermission {
    fn allowed() -> Self {
        Self {
            can_write: true,
            reason: None,
        }
    }

    fn denied(reason: Option<String>) -> Self {
        Self {
            can_write: false,
            reason,
        }
    }
}

/// Resolves logical asset paths into concrete, fetchable locations.
pub struct Resolver {
    service: Arc<dyn AssetService>,
    config: ResolverConfig,
    builtins: BuiltinRegistry,
    cache: ScopedCacheStack,
    contexts: ContextBindingStack,
    notifier: Notifier,
}

impl Resolver {
    pub fn new(service: Arc<dyn AssetService>, config: ResolverConfig) -> Self {
        let builtins = BuiltinRegistry::new(&config);
        Self {
            service,
            config,
            builtins,
            cache: ScopedCacheStack::new(),
            contexts: ContextBindingStack::new(),
            notifier: Notifier::new(),
        }
    }

    /// Build a resolver configured from the process environment snapshot.
    pub fn from_env(service: Arc<dyn AssetService>) -> Self {
        Self::new(service, ResolverConfig::from_env().clone())
    }

    /// The builtin registry (e.g. to [`replace`](BuiltinRegistry::replace)
    /// the builtin set).
    pub fn builtins(&self) -> &BuiltinRegistry {
        &self.builtins
    }

    /// The event sink registry.
    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Begin a resolution cache scope on the calling thread.
    pub fn begin_cache_scope(&self) -> ScopeHandle {
        self.cache.begin_scope()
    }

    /// End a resolution cache scope.
    pub fn end_cache_scope(&self, handle: ScopeHandle) {
        self.cache.end_scope(handle);
    }

    /// Bind an anchor as the active base location for the calling thread,
    /// for the lifetime of the returned guard.
    pub fn enter_context(&self, anchor: &str) -> BoundContext<'_> {
        self.contexts.enter(anchor)
    }

    /// The calling thread's active base location; empty when none is bound.
    pub fn current_context(&self) -> String {
        self.contexts.current()
    }

    pub(crate) fn service(&self) -> &dyn AssetService {
        self.service.as_ref()
    }

    pub(crate) fn cache(&self) -> &ScopedCacheStack {
        &self.cache
    }

    pub(crate) fn contexts(&self) -> &ContextBindingStack {
        &self.contexts
    }

    /// Combine a path with the active base location, falling back to the
    /// current working directory when nothing is bound.
    pub(crate) fn combine_with_base(&self, path: &str) -> String {
        let base = self.contexts.current();
        if base.is_empty() {
            let cwd = std::env::current_dir()
                .map(|dir| dir.to_string_lossy().into_owned())
                .unwrap_or_default();
            return url::combine(&format!("{cwd}/"), path);
        }
        url::combine(&base, path)
    }

    /// Whether a location lives on a scheme whose version tokens increase
    /// monotonically.
    pub(crate) fn is_versioned_remote(&self, location: &str) -> bool {
        url::scheme_of(location).is_some_and(|scheme| {
            self.config
                .versioned_schemes
                .iter()
                .any(|versioned| scheme.eq_ignore_ascii_case(versioned))
        })
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("config", &self.config)
            .field("builtins", &self.builtins)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Test Support
// ============================================================================
