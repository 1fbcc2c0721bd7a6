//! Identifier construction.
//!
//! An identifier is the normalized name a document uses to refer to an
//! asset. Construction anchors relative references to a base location, with
//! two deliberate exceptions: builtin identifiers are never anchored, and
//! search-path-like references are anchored only when the anchored form
//! actually resolves ("look here first").

use crate::core::url;

use super::Resolver;

impl Resolver {
    /// Build the identifier for an asset that is expected to exist.
    ///
    /// With no usable anchor the path is returned normalized but
    /// unanchored - deferred to later search-path resolution rather than
    /// guessed against the working directory.
    pub fn create_identifier(&self, asset_path: &str, anchor: &str) -> String {
        if asset_path.is_empty() {
            crate::debug!("resolver"; "create_identifier: empty asset path");
            return String::new();
        }

        if anchor.is_empty() || url::is_relative(anchor) {
            // Without an absolute anchor there is not much to anchor against.
            // A malformed or relative anchor degrades to this same branch
            // rather than failing.
            crate::debug!(
                "resolver";
                "create_identifier: {} anchor for {asset_path}",
                if anchor.is_empty() { "empty" } else { "relative" }
            );
            return url::normalize(asset_path);
        }

        if self.builtins().is_builtin(asset_path) {
            // Builtins resolve only via configured search paths. Anchoring
            // them would probe the service once per referencing document,
            // failing nearly every time.
            crate::debug!("builtin"; "{asset_path} bypasses anchoring");
            return asset_path.to_string();
        }

        let anchored = url::combine(anchor, asset_path);

        if url::is_search_path(asset_path) && self.resolve(&anchored).is_empty() {
            // Look here first: prefer the anchored form, but when it does
            // not resolve hand the bare search path back for the configured
            // search paths to deal with later.
            crate::debug!("resolver"; "{asset_path} deferred to search paths");
            return url::normalize(asset_path);
        }

        crate::debug!("resolver"; "{asset_path} -> {anchored}");
        anchored
    }

    /// Build the identifier for an asset that is about to be created.
    ///
    /// Unlike [`create_identifier`](Self::create_identifier), a relative
    /// path with no usable anchor is anchored to the active base location
    /// (or the working directory): the result must always name somewhere
    /// writable.
    pub fn create_identifier_for_new_asset(&self, asset_path: &str, anchor: &str) -> String {
        if asset_path.is_empty() {
            crate::debug!("resolver"; "create_identifier_for_new_asset: empty asset path");
            return String::new();
        }

        if url::is_relative(asset_path) {
            let anchor = if anchor.is_empty() || url::is_relative(anchor) {
                // "." joined with the base names the base's directory
                self.combine_with_base(".")
            } else {
                anchor.to_string()
            };
            return self.create_identifier(asset_path, &anchor);
        }

        let identifier = url::normalize(asset_path);
        crate::debug!("resolver"; "{asset_path} -> {identifier}");
        identifier
    }
}

// ============================================================================
// Tests
// ============================================================================
