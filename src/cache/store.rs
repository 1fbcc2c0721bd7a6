//! Key-value store for resolved entries.

use dashmap::DashMap;

use super::ResolvedEntry;

/// A cache mapping stripped identifiers to their resolutions.
///
/// One instance belongs to exactly one scope on one thread, but nested
/// callbacks on that thread may touch it re-entrantly, so the map must stay
/// safe under concurrent use anyway.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    entries: DashMap<String, ResolvedEntry>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an entry. Entries are copied out, never aliased.
    pub fn get(&self, key: &str) -> Option<ResolvedEntry> {
        self.entries.get(key).map(|entry| entry.clone())
    }

    /// Insert an entry if the key is absent. First writer wins within a
    /// scope; an existing entry is left untouched.
    pub fn add(&self, key: &str, entry: ResolvedEntry) {
        self.entries.entry(key.to_string()).or_insert(entry);
    }

    /// Remove an entry. Returns true if one was present.
    pub fn remove(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str) -> ResolvedEntry {
        ResolvedEntry {
            identifier: "a.usd".to_string(),
            url: path.to_string(),
            resolved_path: path.to_string(),
            ..ResolvedEntry::default()
        }
    }

    #[test]
    fn test_get_after_add_returns_exact_entry() {
        let cache = ResolutionCache::new();
        let stored = entry("omniverse://host/a.usd");
        cache.add("a.usd", stored.clone());
        assert_eq!(cache.get("a.usd"), Some(stored));
    }

    #[test]
    fn test_get_after_remove_returns_absent() {
        let cache = ResolutionCache::new();
        cache.add("a.usd", entry("omniverse://host/a.usd"));
        assert!(cache.remove("a.usd"));
        assert_eq!(cache.get("a.usd"), None);
        assert!(!cache.remove("a.usd"));
    }

    #[test]
    fn test_first_writer_wins() {
        let cache = ResolutionCache::new();
        cache.add("a.usd", entry("first"));
        cache.add("a.usd", entry("second"));
        assert_eq!(cache.get("a.usd").unwrap().resolved_path, "first");
        assert_eq!(cache.len(), 1);
    }
}
