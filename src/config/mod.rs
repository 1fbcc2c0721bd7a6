//! Resolver configuration.
//!
//! Configuration is an explicit value handed to [`Resolver::new`], never a
//! hidden process-wide singleton, so tests can run in parallel with
//! different settings. The process-environment snapshot taken by
//! [`ResolverConfig::from_env`] is captured once and reused for the process
//! lifetime.
//!
//! [`Resolver::new`]: crate::resolver::Resolver::new

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::Deserialize;
use thiserror::Error;

/// Environment variable enabling the builtin bypass.
pub const BUILTIN_BYPASS_ENV: &str = "SCENEPATH_BUILTIN_BYPASS";

/// Environment variable holding the comma-separated builtin identifier list.
pub const BUILTIN_PATHS_ENV: &str = "SCENEPATH_BUILTIN_PATHS";

/// Default builtin identifiers: the shared material-library modules that ship
/// with the renderer and must only ever resolve via configured search paths.
/// Anchoring these against the current document would produce a storm of
/// failing remote lookups, one per referencing prim.
pub const DEFAULT_BUILTIN_PATHS: &str = "OmniGlass.mdl,\
OmniGlass_Opacity.mdl,\
OmniHair.mdl,\
OmniHairPresets.mdl,\
OmniPBR.mdl,\
OmniPBR_ClearCoat.mdl,\
OmniPBR_ClearCoat_Opacity.mdl,\
OmniPBR_Opacity.mdl,\
OmniSurface.mdl,\
OmniSurfaceBlend.mdl,\
OmniSurfaceLite.mdl,\
OmniSurfacePresets.mdl,\
OmniSurface/OmniHairBase.mdl,\
OmniSurface/OmniImage.mdl,\
OmniSurface/OmniShared.mdl,\
OmniSurface/OmniSurfaceBase.mdl,\
OmniSurface/OmniSurfaceBlendBase.mdl,\
OmniSurface/OmniSurfaceLiteBase.mdl,\
OmniVolumeDensity.mdl,\
OmniVolumeNoise.mdl,\
UsdPreviewSurface.mdl,\
gltf/pbr.mdl,\
materialx/cm.mdl,\
materialx/core.mdl,\
materialx/pbrlib.mdl,\
materialx/stdlib.mdl,\
nvidia/aux_definitions.mdl,\
nvidia/core_definitions.mdl,\
nvidia/support_definitions.mdl,\
architectural.mdl,\
environment.mdl,\
omni_light.mdl";

// ============================================================================
// ConfigError
// ============================================================================

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),
}

// ============================================================================
// ResolverConfig
// ============================================================================

/// Settings consumed by the resolver.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Enable the builtin-identifier bypass (builtins skip anchoring and
    /// resolve only via configured search paths).
    pub builtin_bypass: bool,
    /// Identifiers exempt from anchoring when the bypass is enabled.
    pub builtin_paths: Vec<String>,
    /// Schemes whose version tokens increase monotonically; resolutions on
    /// these schemes use the version as their modification timestamp.
    pub versioned_schemes: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            builtin_bypass: false,
            builtin_paths: split_path_list(DEFAULT_BUILTIN_PATHS),
            versioned_schemes: vec!["omniverse".to_string(), "omni".to_string()],
        }
    }
}

impl ResolverConfig {
    /// Snapshot of the process environment, read once at first use.
    ///
    /// Later environment changes have no effect on the returned value; this
    /// matches the read-once contract of the builtin bypass flag.
    pub fn from_env() -> &'static ResolverConfig {
        static SNAPSHOT: OnceLock<ResolverConfig> = OnceLock::new();
        SNAPSHOT.get_or_init(|| {
            let mut config = ResolverConfig::default();
            if let Ok(flag) = std::env::var(BUILTIN_BYPASS_ENV) {
                config.builtin_bypass = parse_bool(&flag);
            }
            if let Ok(paths) = std::env::var(BUILTIN_PATHS_ENV) {
                config.builtin_paths = split_path_list(&paths);
            }
            crate::debug!(
                "config";
                "environment snapshot: bypass={}, {} builtins",
                config.builtin_bypass,
                config.builtin_paths.len()
            );
            config
        })
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text =
            fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&text)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Split a comma-separated identifier list, dropping empty items.
pub fn split_path_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a boolean flag the way shell environments spell them.
fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "on" | "yes"
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::default();
        assert!(!config.builtin_bypass);
        assert!(config.builtin_paths.contains(&"OmniPBR.mdl".to_string()));
        assert!(config.versioned_schemes.contains(&"omniverse".to_string()));
    }

    #[test]
    fn test_from_toml_str() {
        let config = ResolverConfig::from_toml_str(
            r#"
            builtin_bypass = true
            builtin_paths = ["Base.mdl", "materials/Extra.mdl"]
            "#,
        )
        .unwrap();
        assert!(config.builtin_bypass);
        assert_eq!(config.builtin_paths.len(), 2);
        // unspecified fields keep their defaults
        assert!(!config.versioned_schemes.is_empty());
    }

    #[test]
    fn test_from_toml_str_rejects_bad_types() {
        assert!(ResolverConfig::from_toml_str("builtin_bypass = \"maybe\"").is_err());
    }

    #[test]
    fn test_split_path_list() {
        assert_eq!(
            split_path_list("A.mdl, B.mdl,,C.mdl"),
            vec!["A.mdl", "B.mdl", "C.mdl"]
        );
        assert!(split_path_list("").is_empty());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("1"));
        assert!(parse_bool("TRUE"));
        assert!(parse_bool(" on "));
        assert!(!parse_bool("0"));
        assert!(!parse_bool("off"));
        assert!(!parse_bool(""));
    }
}
