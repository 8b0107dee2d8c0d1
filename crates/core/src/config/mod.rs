//! Application configuration with layered loading.
//!
//! Configuration is loaded with figment from multiple sources:
//!
//! 1. Environment variables (GUICHET_*)
//! 2. TOML config file (if GUICHET_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

use crate::manifest::{self, AssetManifest};

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (GUICHET_*)
/// 2. TOML config file (if GUICHET_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to SQLite cache database.
    ///
    /// Set via GUICHET_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Origin of the application the proxy fronts. App-relative asset
    /// paths resolve against this, and same-origin responses classify
    /// as "basic".
    ///
    /// Set via GUICHET_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Name of the current cache generation.
    ///
    /// Set via GUICHET_VERSION_TAG environment variable. Changing it and
    /// re-running install/activate supersedes and evicts older generations.
    #[serde(default = "default_version_tag")]
    pub version_tag: String,

    /// Path marker identifying API calls, which get the network-first
    /// strategy instead of cache-first.
    ///
    /// Set via GUICHET_API_MARKER environment variable.
    #[serde(default = "default_api_marker")]
    pub api_marker: String,

    /// Ordered list of URLs to pre-populate on install.
    ///
    /// Set via GUICHET_PRECACHE environment variable.
    #[serde(default = "manifest::default_assets")]
    pub precache: Vec<String>,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via GUICHET_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to buffer per response.
    ///
    /// Set via GUICHET_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via GUICHET_TIMEOUT_MS environment variable. The source worker
    /// had no timeout at all; a bounded one is the hardening improvement
    /// the design allows, and a timed-out fetch resolves like any other
    /// network failure.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./guichet-cache.sqlite")
}

fn default_origin() -> String {
    "http://localhost:5000".into()
}

fn default_version_tag() -> String {
    manifest::DEFAULT_VERSION_TAG.into()
}

fn default_api_marker() -> String {
    "/ask".into()
}

fn default_user_agent() -> String {
    "guichet/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            origin: default_origin(),
            version_tag: default_version_tag(),
            api_marker: default_api_marker(),
            precache: manifest::default_assets(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The manifest describing the current generation and its pre-cache list.
    pub fn manifest(&self) -> AssetManifest {
        AssetManifest { version_tag: self.version_tag.clone(), assets: self.precache.clone() }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `GUICHET_`
    /// 2. TOML file from `GUICHET_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("GUICHET_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("GUICHET_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
