//! Local-filesystem asset service.

use std::fs;
use std::io::ErrorKind;

use crate::core::url;

use super::{AssetService, ServiceEntry, ServiceError, StatEntry};

/// Asset service backed by the local filesystem.
///
/// Relative identifiers resolve against the active base location first, then
/// against each search path in order. Scheme-based locations other than
/// `file:` never resolve here.
#[derive(Debug, Default)]
pub struct FsAssetService;

impl FsAssetService {
    pub fn new() -> Self {
        Self
    }

    fn stat_path(&self, path: &str) -> Result<Option<ServiceEntry>, ServiceError> {
        match fs::metadata(path) {
            Ok(meta) => Ok(Some(ServiceEntry {
                url: path.to_string(),
                version: String::new(),
                modified: meta.modified()?,
                size: meta.len(),
            })),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

impl AssetService for FsAssetService {
    fn resolve(
        &self,
        identifier: &str,
        search_paths: &[String],
        base: &str,
    ) -> Result<Option<ServiceEntry>, ServiceError> {
        if !url::is_local(identifier) {
            return Ok(None);
        }

        if !url::is_relative(identifier) {
            return self.stat_path(&url::local_path(identifier));
        }

        if !base.is_empty() && url::is_local(base) {
            let candidate = url::combine(&url::local_path(base), identifier);
            if let Some(entry) = self.stat_path(&candidate)? {
                return Ok(Some(entry));
            }
        }

        for search_path in search_paths {
            let candidate = url::combine(search_path, identifier);
            if let Some(entry) = self.stat_path(&candidate)? {
                return Ok(Some(entry));
            }
        }

        Ok(None)
    }

    fn stat(&self, location: &str) -> Result<Option<StatEntry>, ServiceError> {
        match fs::metadata(url::local_path(location)) {
            Ok(meta) => Ok(Some(StatEntry {
                is_container: meta.is_dir(),
                writable: !meta.permissions().readonly(),
            })),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &std::path::Path, name: &str) -> String {
        let path = dir.join(name);
        fs::write(&path, b"test").unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_resolve_absolute_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = touch(dir.path(), "a.usd");

        let service = FsAssetService::new();
        let entry = service.resolve(&path, &[], "").unwrap().unwrap();
        assert_eq!(entry.url, path);
        assert_eq!(entry.size, 4);
        assert!(entry.version.is_empty());
    }

    #[test]
    fn test_resolve_relative_against_base() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "tex.png");
        let base = format!("{}/scene.usd", dir.path().display());

        let service = FsAssetService::new();
        let entry = service.resolve("tex.png", &[], &base).unwrap().unwrap();
        assert!(entry.url.ends_with("/tex.png"));
    }

    #[test]
    fn test_resolve_relative_via_search_path() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "Foo.mdl");
        let search = format!("{}/", dir.path().display());

        let service = FsAssetService::new();
        let entry = service
            .resolve("Foo.mdl", &[search], "")
            .unwrap()
            .unwrap();
        assert!(entry.url.ends_with("/Foo.mdl"));
    }

    #[test]
    fn test_resolve_misses_are_none() {
        let service = FsAssetService::new();
        assert!(service.resolve("missing.usd", &[], "").unwrap().is_none());
        assert!(
            service
                .resolve("omniverse://host/a.usd", &[], "")
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_stat_folder_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = touch(dir.path(), "a.usd");

        let service = FsAssetService::new();
        let folder = service
            .stat(&dir.path().to_string_lossy())
            .unwrap()
            .unwrap();
        assert!(folder.is_container);

        let file_stat = service.stat(&file).unwrap().unwrap();
        assert!(!file_stat.is_container);

        assert!(service.stat("/nonexistent/nowhere").unwrap().is_none());
    }
}
