//! Cached resolution engine.
//!
//! Every metadata query funnels through [`Resolver::resolve_through_cache`]:
//! strip the format-argument suffix, consult the calling thread's active
//! cache scope, fall back to the asset service and repopulate. With no scope
//! active nothing is cached and every call re-queries the service.

use std::time::UNIX_EPOCH;

use crate::cache::ResolvedEntry;
use crate::core::url;
use crate::notify::{EventState, ResolverEvent};

use super::{AssetInfo, Resolver, WritePermission};

impl Resolver {
    /// Resolve an asset path to its concrete location. Empty if unresolved.
    pub fn resolve(&self, asset_path: &str) -> String {
        let entry = self.resolve_through_cache(asset_path);
        crate::debug!("resolver"; "{asset_path} -> {}", entry.resolved_path);
        entry.resolved_path
    }

    /// Resolve a location for an asset that is about to be created.
    ///
    /// Intentionally uncached: the asset does not exist yet, so there is no
    /// service-side metadata worth keeping. Folders are created on demand
    /// when the asset is opened for writing.
    pub fn resolve_for_new_asset(&self, asset_path: &str) -> String {
        let combined = self.combine_with_base(asset_path);
        let resolved = if url::is_local(&combined) {
            url::local_path(&combined)
        } else {
            combined
        };
        crate::debug!("resolver"; "{asset_path} -> {resolved} (new asset)");
        resolved
    }

    /// Timestamp used for reload detection.
    ///
    /// Versioned-remote locations use their version token parsed as a
    /// number: those backends only guarantee second precision on wall-clock
    /// times, and two saves within one second would otherwise look
    /// unmodified. Everything else uses the wall-clock instant. 0.0 when
    /// unresolved.
    pub fn modification_timestamp(&self, asset_path: &str) -> f64 {
        let entry = self.resolve_through_cache(asset_path);
        if !entry.is_resolved() {
            return 0.0;
        }

        if !entry.version.is_empty() && self.is_versioned_remote(&entry.url) {
            crate::debug!(
                "resolver";
                "using version {} as timestamp for {}",
                entry.version,
                entry.resolved_path
            );
            return parse_version_number(&entry.version);
        }

        entry
            .modified
            .and_then(|instant| instant.duration_since(UNIX_EPOCH).ok())
            .map(|elapsed| elapsed.as_secs_f64())
            .unwrap_or(0.0)
    }

    /// Version and location metadata for an asset path.
    pub fn asset_info(&self, asset_path: &str) -> AssetInfo {
        let entry = self.resolve_through_cache(asset_path);
        AssetInfo {
            version: entry.version,
            url: entry.url,
            size: entry.size,
        }
    }

    /// The extension that selects a document format for this path.
    pub fn extension(&self, asset_path: &str) -> String {
        url::extension_of(asset_path)
    }

    /// Pre-check a write against a resolved location.
    ///
    /// The corresponding cache entry is evicted regardless of the answer:
    /// the caller is about to write, and the next resolve must observe fresh
    /// size and modification metadata.
    pub fn can_write(&self, resolved: &str) -> WritePermission {
        let permission = self.check_write(resolved);

        if let Some(cache) = self.cache().current() {
            let key = url::strip_format_args(resolved);
            if cache.remove(key) {
                crate::debug!("cache"; "evicted {key} ahead of write");
            }
        }

        permission
    }

    pub(crate) fn resolve_through_cache(&self, identifier: &str) -> ResolvedEntry {
        let key = url::strip_format_args(identifier);

        let Some(cache) = self.cache().current() else {
            return self.resolve_uncached(key);
        };

        if let Some(entry) = cache.get(key) {
            crate::debug!("cache"; "hit for {key}");
            return entry;
        }

        let entry = self.resolve_uncached(key);
        // misses are cached too; a missing asset stays missing for the scope
        cache.add(key, entry.clone());
        entry
    }

    fn resolve_uncached(&self, key: &str) -> ResolvedEntry {
        self.notifier()
            .send(key, ResolverEvent::Resolving, EventState::Started, 0);

        // A builtin must resolve via configured search paths only, never
        // against the current document's base location.
        let base = if self.builtins().is_builtin(key) {
            crate::debug!("builtin"; "clearing base location to resolve {key}");
            String::new()
        } else {
            self.contexts().current()
        };

        match self.service().resolve(key, &[], &base) {
            Ok(Some(found)) => {
                let resolved_path = if url::is_local(&found.url) {
                    // local files are read directly, no round-trip needed
                    url::local_path(&found.url)
                } else {
                    found.url.clone()
                };
                let entry = ResolvedEntry {
                    identifier: key.to_string(),
                    url: found.url,
                    resolved_path,
                    version: found.version,
                    modified: Some(found.modified),
                    size: found.size,
                };
                self.notifier()
                    .send(key, ResolverEvent::Resolving, EventState::Success, entry.size);
                entry
            }
            Ok(None) => {
                self.notifier()
                    .send(key, ResolverEvent::Resolving, EventState::Failure, 0);
                ResolvedEntry::unresolved(key)
            }
            Err(err) => {
                // service failures collapse to "unresolved"; retry policy
                // belongs to the service
                crate::debug!("resolver"; "service error for {key}: {err}");
                self.notifier()
                    .send(key, ResolverEvent::Resolving, EventState::Failure, 0);
                ResolvedEntry::unresolved(key)
            }
        }
    }

    fn check_write(&self, resolved: &str) -> WritePermission {
        if resolved.is_empty() {
            return WritePermission::denied(None);
        }

        // the resolved location itself decides when it exists
        match self.service().stat(resolved) {
            Ok(Some(stat)) => {
                return if stat.is_container {
                    WritePermission::denied(Some(format!("{resolved} is a folder")))
                } else if !stat.writable {
                    WritePermission::denied(Some(format!(
                        "You do not have permission to write to {resolved}"
                    )))
                } else {
                    WritePermission::allowed()
                };
            }
            Ok(None) => {}
            Err(err) => return WritePermission::denied(Some(err.to_string())),
        }

        // otherwise the nearest existing ancestor decides
        for parent in url::parent_locations(resolved) {
            match self.service().stat(&parent) {
                Ok(Some(stat)) => {
                    return if !stat.is_container {
                        WritePermission::denied(Some(format!(
                            "{parent} can not have children written underneath it"
                        )))
                    } else if !stat.writable {
                        WritePermission::denied(Some(format!(
                            "You do not have permission to write to folder {parent}"
                        )))
                    } else {
                        WritePermission::allowed()
                    };
                }
                Ok(None) => continue,
                Err(err) => return WritePermission::denied(Some(err.to_string())),
            }
        }

        // nothing exists yet along the path; creation is assumed possible
        WritePermission::allowed()
    }
}

/// Lenient numeric parse for version tokens.
///
/// Tokens are not guaranteed numeric ("2-good" happens in the wild); the
/// longest numeric prefix is used so such tokens still order by their leading
/// number. A fully non-numeric token becomes 0.0, which may not reload
/// correctly - a known limitation.
fn parse_version_number(version: &str) -> f64 {
    let mut value = 0.0;
    for end in 1..=version.len() {
        if !version.is_char_boundary(end) {
            continue;
        }
        if let Ok(parsed) = version[..end].parse::<f64>() {
            value = parsed;
        }
    }
    value
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::{Duration, SystemTime};

    use crate::config::ResolverConfig;
    use crate::resolver::testing::{ScriptedService, bypass_config, remote_entry, resolver_with};
    use crate::service::{ServiceEntry, StatEntry};

    use super::parse_version_number;

    const REMOTE: &str = "omniverse://host/a.usd";

    #[test]
    fn test_resolve_hit_and_miss() {
        let service = Arc::new(ScriptedService::new());
        service.insert(REMOTE, remote_entry(REMOTE, "3"));
        let (resolver, _) = resolver_with(service, ResolverConfig::default());

        assert_eq!(resolver.resolve(REMOTE), REMOTE);
        assert_eq!(resolver.resolve("omniverse://host/missing.usd"), "");
    }

    #[test]
    fn test_local_results_become_plain_paths() {
        let service = Arc::new(ScriptedService::new());
        service.insert(
            "file:///tmp/foo.usd",
            ServiceEntry {
                url: "file:///tmp/foo.usd".to_string(),
                version: String::new(),
                modified: SystemTime::UNIX_EPOCH + Duration::from_secs(500),
                size: 7,
            },
        );
        let (resolver, _) = resolver_with(service, ResolverConfig::default());

        assert_eq!(resolver.resolve("file:///tmp/foo.usd"), "/tmp/foo.usd");
    }

    #[test]
    fn test_no_scope_requeries_every_call() {
        let service = Arc::new(ScriptedService::new());
        service.insert(REMOTE, remote_entry(REMOTE, "3"));
        let (resolver, service) = resolver_with(service, ResolverConfig::default());

        resolver.resolve(REMOTE);
        resolver.resolve(REMOTE);
        assert_eq!(service.resolve_calls(), 2);
    }

    #[test]
    fn test_scope_deduplicates_queries() {
        let service = Arc::new(ScriptedService::new());
        service.insert(REMOTE, remote_entry(REMOTE, "3"));
        let (resolver, service) = resolver_with(service, ResolverConfig::default());

        let scope = resolver.begin_cache_scope();
        resolver.resolve(REMOTE);
        resolver.resolve(REMOTE);
        resolver.resolve(REMOTE);
        assert_eq!(service.resolve_calls(), 1);
        resolver.end_cache_scope(scope);
    }

    #[test]
    fn test_misses_are_cached_too() {
        let (resolver, service) = resolver_with(
            Arc::new(ScriptedService::new()),
            ResolverConfig::default(),
        );

        let scope = resolver.begin_cache_scope();
        assert_eq!(resolver.resolve(REMOTE), "");
        assert_eq!(resolver.resolve(REMOTE), "");
        assert_eq!(service.resolve_calls(), 1);
        resolver.end_cache_scope(scope);
    }

    #[test]
    fn test_format_args_share_one_cache_entry() {
        let service = Arc::new(ScriptedService::new());
        service.insert(REMOTE, remote_entry(REMOTE, "3"));
        let (resolver, service) = resolver_with(service, ResolverConfig::default());

        let scope = resolver.begin_cache_scope();
        let first = resolver.resolve(&format!("{REMOTE}:SDF_FORMAT_ARGS:x=1"));
        let second = resolver.resolve(&format!("{REMOTE}:SDF_FORMAT_ARGS:y=2"));
        assert_eq!(first, second);
        assert_eq!(service.resolve_calls(), 1);
        resolver.end_cache_scope(scope);
    }

    #[test]
    fn test_write_intent_evicts_and_requeries() {
        let service = Arc::new(ScriptedService::new());
        service.insert(REMOTE, remote_entry(REMOTE, "3"));
        let (resolver, service) = resolver_with(service, ResolverConfig::default());

        let scope = resolver.begin_cache_scope();
        resolver.resolve(REMOTE);
        assert_eq!(service.resolve_calls(), 1);

        let permission = resolver.can_write(REMOTE);
        assert!(permission.can_write);

        resolver.resolve(REMOTE);
        assert_eq!(service.resolve_calls(), 2);
        resolver.end_cache_scope(scope);
    }

    #[test]
    fn test_builtin_resolves_with_empty_base() {
        let service = Arc::new(ScriptedService::new());
        let (resolver, service) = resolver_with(service, bypass_config(&["OmniPBR.mdl"]));

        let _ctx = resolver.enter_context("omniverse://host/scene.usd");
        resolver.resolve("OmniPBR.mdl");
        resolver.resolve("omniverse://host/other.usd");

        assert_eq!(
            service.bases_seen(),
            vec!["".to_string(), "omniverse://host/scene.usd".to_string()]
        );
    }

    #[test]
    fn test_timestamp_uses_version_on_versioned_schemes() {
        let service = Arc::new(ScriptedService::new());
        service.insert(REMOTE, remote_entry(REMOTE, "12"));
        let (resolver, _) = resolver_with(service, ResolverConfig::default());

        assert_eq!(resolver.modification_timestamp(REMOTE), 12.0);
    }

    #[test]
    fn test_timestamp_uses_wall_clock_elsewhere() {
        let service = Arc::new(ScriptedService::new());
        service.insert(
            "/tmp/a.usd",
            ServiceEntry {
                url: "/tmp/a.usd".to_string(),
                // local files get a version-less entry in practice, but even
                // a version token must not win on an unversioned scheme
                version: "9".to_string(),
                modified: SystemTime::UNIX_EPOCH + Duration::from_secs(500),
                size: 1,
            },
        );
        let (resolver, _) = resolver_with(service, ResolverConfig::default());

        assert_eq!(resolver.modification_timestamp("/tmp/a.usd"), 500.0);
    }

    #[test]
    fn test_timestamp_unresolved_is_zero() {
        let (resolver, _) = resolver_with(
            Arc::new(ScriptedService::new()),
            ResolverConfig::default(),
        );
        assert_eq!(resolver.modification_timestamp(REMOTE), 0.0);
    }

    #[test]
    fn test_asset_info_carries_service_metadata() {
        let service = Arc::new(ScriptedService::new());
        service.insert(REMOTE, remote_entry(REMOTE, "7"));
        let (resolver, _) = resolver_with(service, ResolverConfig::default());

        let info = resolver.asset_info(REMOTE);
        assert_eq!(info.version, "7");
        assert_eq!(info.url, REMOTE);
        assert_eq!(info.size, 42);
    }

    #[test]
    fn test_can_write_denies_folders() {
        let service = Arc::new(ScriptedService::new());
        service.insert_stat(
            REMOTE,
            StatEntry {
                is_container: true,
                writable: true,
            },
        );
        let (resolver, _) = resolver_with(service, ResolverConfig::default());

        let permission = resolver.can_write(REMOTE);
        assert!(!permission.can_write);
        assert_eq!(permission.reason.unwrap(), format!("{REMOTE} is a folder"));
    }

    #[test]
    fn test_can_write_checks_nearest_existing_parent() {
        let service = Arc::new(ScriptedService::new());
        service.insert_stat(
            "omniverse://host/a/",
            StatEntry {
                is_container: true,
                writable: false,
            },
        );
        let (resolver, _) = resolver_with(service, ResolverConfig::default());

        // omniverse://host/a/b/new.usd does not exist, nor does a/b/; a/ is
        // the nearest existing ancestor and it denies writes
        let permission = resolver.can_write("omniverse://host/a/b/new.usd");
        assert!(!permission.can_write);
        assert!(permission.reason.unwrap().contains("folder"));
    }

    #[test]
    fn test_can_write_allows_nonexistent_paths() {
        let (resolver, _) = resolver_with(
            Arc::new(ScriptedService::new()),
            ResolverConfig::default(),
        );
        assert!(resolver.can_write("omniverse://host/new/file.usd").can_write);
    }

    #[test]
    fn test_can_write_empty_path_is_denied() {
        let (resolver, _) = resolver_with(
            Arc::new(ScriptedService::new()),
            ResolverConfig::default(),
        );
        let permission = resolver.can_write("");
        assert!(!permission.can_write);
        assert!(permission.reason.is_none());
    }

    #[test]
    fn test_parse_version_number_lenient() {
        assert_eq!(parse_version_number("12"), 12.0);
        assert_eq!(parse_version_number("2-good"), 2.0);
        assert_eq!(parse_version_number("2.5rc1"), 2.5);
        assert_eq!(parse_version_number("etag-abc123"), 0.0);
        assert_eq!(parse_version_number(""), 0.0);
    }

    #[test]
    fn test_resolver_emits_resolution_events() {
        use crate::notify::{EventState, ResolverEvent};
        use parking_lot::Mutex;

        let service = Arc::new(ScriptedService::new());
        service.insert(REMOTE, remote_entry(REMOTE, "1"));
        let (resolver, _) = resolver_with(service, ResolverConfig::default());

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        resolver.notifier().register(Box::new(move |id, event, state, _| {
            sink.lock().push((id.to_string(), event, state));
        }));

        resolver.resolve(REMOTE);
        resolver.resolve("omniverse://host/missing.usd");

        let events = seen.lock();
        assert_eq!(
            events[0],
            (REMOTE.to_string(), ResolverEvent::Resolving, EventState::Started)
        );
        assert_eq!(events[1].2, EventState::Success);
        assert_eq!(events[3].2, EventState::Failure);
    }
}
