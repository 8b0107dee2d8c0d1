//! HTTP fetch seam for the offline cache proxy.
//!
//! The proxy never talks to reqwest directly; it is injected with a
//! [`Fetch`] implementation so the strategy executor can be tested
//! against a scripted network. [`HttpFetcher`] is the production
//! implementation.
//!
//! Response bodies are fully buffered into [`Bytes`] before being handed
//! back. The interception model treats bodies as single-read streams that
//! must be duplicated before any branch consumes them; buffering makes
//! the store copy and the returned copy cheap independent clones.

pub mod url;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub use url::{UrlError, canonicalize, is_same_origin};

use guichet_core::{AppConfig, Error, StoredResponse};

/// Cross-origin tolerance for an outgoing request.
///
/// Manifest pre-population uses `NoCors` so cross-origin font and icon
/// stylesheets come back opaque instead of failing the install.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    Cors,
    NoCors,
}

/// Classification of a fetched response, mirroring the interception
/// point's basic/cors/opaque taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    /// Same-origin response; the only kind eligible for opportunistic caching.
    Basic,
    /// Cross-origin response fetched with CORS tolerance.
    Cors,
    /// Cross-origin response fetched with `NoCors`.
    Opaque,
}

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// App origin used to resolve relative URLs and classify responses.
    pub origin: String,

    /// User agent string.
    pub user_agent: String,

    /// Maximum response body size in bytes.
    pub max_bytes: usize,

    /// Request timeout.
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost:5000".to_string(),
            user_agent: "guichet/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20_000),
        }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            origin: config.origin.clone(),
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
        }
    }
}

/// A fetched response with a fully buffered body.
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    /// The canonicalized URL that was requested (the cache key).
    pub url: ::url::Url,
    /// The final URL after redirects.
    pub final_url: ::url::Url,
    /// HTTP status code.
    pub status: u16,
    /// basic/cors/opaque classification.
    pub kind: ResponseKind,
    /// Response headers.
    pub headers: Vec<(String, String)>,
    /// Response body bytes.
    pub bytes: Bytes,
}

impl FetchedResponse {
    /// Whether this response qualifies for opportunistic caching:
    /// a basic, status-200 response.
    pub fn is_basic_ok(&self) -> bool {
        self.status == 200 && self.kind == ResponseKind::Basic
    }

    /// Snapshot this response for the cache store.
    ///
    /// The body is a clone of the buffer, so the snapshot and the
    /// response still in flight to the caller stay independent.
    pub fn to_stored(&self) -> StoredResponse {
        StoredResponse::new(self.status, self.headers.clone(), self.bytes.to_vec())
    }
}

/// The injected network dependency.
///
/// `url` may be app-relative (`/static/...`) or absolute; implementations
/// canonicalize before issuing the request. A returned `Ok` carries
/// whatever status the server produced, including errors; `Err` means no
/// response was produced at all (the "network unavailable" case).
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn get(&self, url: &str, mode: RequestMode) -> Result<FetchedResponse, Error>;
}

/// reqwest-backed fetch client.
pub struct HttpFetcher {
    http: Client,
    config: FetchConfig,
    origin: ::url::Url,
}

impl HttpFetcher {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let origin = ::url::Url::parse(&config.origin).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::HttpClient(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config, origin })
    }

    fn classify(&self, mode: RequestMode, final_url: &::url::Url) -> ResponseKind {
        if is_same_origin(final_url, &self.origin) {
            ResponseKind::Basic
        } else {
            match mode {
                RequestMode::Cors => ResponseKind::Cors,
                RequestMode::NoCors => ResponseKind::Opaque,
            }
        }
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn get(&self, url: &str, mode: RequestMode) -> Result<FetchedResponse, Error> {
        let start = Instant::now();
        let url = canonicalize(url, &self.origin).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        let response = self
            .http
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status().as_u16();

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let final_url = response.url().clone();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.to_string(), v.to_string())))
            .collect::<Vec<_>>();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("failed to read response: {e}")))?;

        if bytes.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!(
                "{} bytes exceeds {}",
                bytes.len(),
                self.config.max_bytes
            )));
        }

        let kind = self.classify(mode, &final_url);

        tracing::debug!(
            url = %url,
            status,
            ?kind,
            bytes = bytes.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "fetched"
        );

        Ok(FetchedResponse { url, final_url, status, kind, headers, bytes })
    }
}
