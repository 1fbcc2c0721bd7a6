//! Scoped resolution caching.

mod entry;
mod scope;
mod store;

pub use entry::ResolvedEntry;
pub use scope::{ScopeHandle, ScopedCacheStack};
pub use store::ResolutionCache;
