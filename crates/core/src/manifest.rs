//! Asset manifest for install-time cache pre-population.
//!
//! The manifest is a fixed, ordered list of URLs known at build time:
//! the application shell, its versioned stylesheets, the web manifest,
//! and two external font/icon stylesheets. External entries require a
//! cross-origin-tolerant request mode during pre-population.

use serde::{Deserialize, Serialize};

/// Current cache generation name.
pub const DEFAULT_VERSION_TAG: &str = "juriste-virtuel-v1.0.0";

/// Default pre-cache list. Order is preserved when populating.
pub fn default_assets() -> Vec<String> {
    [
        "/",
        "/static/css/conversation-small-j9iamy23.css",
        "/static/css/codemirror-nauedrd6.css",
        "/static/css/cot-message-n4x930jt.css",
        "/static/css/comments-plugin-tah3dlup.css",
        "/static/manifest.json",
        "https://fonts.googleapis.com/css2?family=Inter:wght@300;400;500;600;700&display=swap",
        "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.4.0/css/all.min.css",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// A cache generation's identity plus the assets to pre-populate it with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetManifest {
    /// Version-qualified generation name; exactly one generation is current.
    pub version_tag: String,
    /// Ordered URLs to store on install. May mix app-relative paths and
    /// absolute cross-origin URLs.
    pub assets: Vec<String>,
}

impl Default for AssetManifest {
    fn default() -> Self {
        Self { version_tag: DEFAULT_VERSION_TAG.to_string(), assets: default_assets() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_manifest() {
        let manifest = AssetManifest::default();
        assert_eq!(manifest.version_tag, "juriste-virtuel-v1.0.0");
        assert_eq!(manifest.assets.len(), 8);
        assert_eq!(manifest.assets[0], "/");
        assert_eq!(manifest.assets[5], "/static/manifest.json");
    }

    #[test]
    fn test_default_manifest_external_entries() {
        let manifest = AssetManifest::default();
        let external: Vec<_> = manifest.assets.iter().filter(|u| u.contains("://")).collect();
        assert_eq!(external.len(), 2);
        assert!(external.iter().all(|u| u.starts_with("https://")));
    }
}
