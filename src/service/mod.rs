//! External asset-delivery service contract.
//!
//! The resolver core never fetches bytes itself; it asks an [`AssetService`]
//! where an identifier's content actually lives. Implementations are
//! selected at runtime by classifying the location (local filesystem vs.
//! scheme-based remote), not by inheritance.

mod fs;

use std::time::SystemTime;

use thiserror::Error;

pub use fs::FsAssetService;

/// Failures of the external service.
///
/// The resolution engine collapses all of these to "unresolved" - retry
/// policy, if any, belongs to the service implementation.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("connection to asset service failed: {0}")]
    Connection(String),

    #[error("asset service denied access to `{0}`")]
    AccessDenied(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Metadata the service reports for a resolved identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceEntry {
    /// The concrete location the identifier maps to.
    pub url: String,
    /// Opaque version token. Empty when the backing store has no notion of
    /// versions (plain files, for instance).
    pub version: String,
    /// Wall-clock modification instant.
    pub modified: SystemTime,
    /// Size in bytes.
    pub size: u64,
}

/// Metadata the service reports for a write pre-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatEntry {
    /// The location is a folder (or folder-like container).
    pub is_container: bool,
    /// The caller may write to (or under) the location.
    pub writable: bool,
}

/// Blocking contract with the asset-delivery service.
///
/// Calls are synchronous from the resolver's point of view; a hung service
/// call hangs the calling thread. Cancellation of in-flight work is the
/// service's responsibility.
pub trait AssetService: Send + Sync {
    /// Resolve an identifier to a concrete location.
    ///
    /// `base` is the active base location and may be empty (builtins are
    /// resolved with an empty base on purpose). `search_paths` are consulted
    /// when the identifier does not resolve against the base. Returns
    /// `Ok(None)` when the identifier does not resolve at all.
    fn resolve(
        &self,
        identifier: &str,
        search_paths: &[String],
        base: &str,
    ) -> Result<Option<ServiceEntry>, ServiceError>;

    /// Stat a location ahead of a write. Returns `Ok(None)` when the
    /// location does not exist, which is fine - it can be created.
    fn stat(&self, url: &str) -> Result<Option<StatEntry>, ServiceError>;
}
