//! scenepath - asset path resolution with scoped caching.
//!
//! Resolves logical asset paths (relative references, search paths, or
//! absolute URLs appearing inside scene-description documents) into
//! concrete, fetchable locations, and caches the result for the lifetime of
//! a well-defined scope. It sits between a document composition engine and
//! an asset-delivery service: the engine asks what a path means and where
//! its content lives, the service fetches the bytes.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use scenepath::{FsAssetService, Resolver, ResolverConfig};
//!
//! let resolver = Resolver::new(Arc::new(FsAssetService::new()), ResolverConfig::default());
//!
//! // one document load = one cache scope
//! let scope = resolver.begin_cache_scope();
//! let ctx = resolver.enter_context("/projects/city/scene.usd");
//!
//! let identifier = resolver.create_identifier("./props/car.usd", ctx.anchor());
//! let location = resolver.resolve(&identifier);
//!
//! drop(ctx);
//! resolver.end_cache_scope(scope);
//! # let _ = location;
//! ```

pub mod builtin;
pub mod cache;
pub mod config;
pub mod context;
pub mod core;
pub mod logger;
pub mod notify;
pub mod resolver;
pub mod service;

pub use builtin::BuiltinRegistry;
pub use cache::{ResolutionCache, ResolvedEntry, ScopeHandle, ScopedCacheStack};
pub use config::{ConfigError, ResolverConfig};
pub use context::{BoundContext, ContextBindingStack};
pub use notify::{EventState, Notifier, ResolverEvent};
pub use resolver::{AssetInfo, Resolver, WritePermission};
pub use service::{AssetService, FsAssetService, ServiceEntry, ServiceError, StatEntry};
