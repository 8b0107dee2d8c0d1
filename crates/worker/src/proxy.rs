//! The offline cache proxy service.
//!
//! A long-lived service object with injected dependencies: the cache
//! store and the network fetcher. The hosting adapter drives it through
//! `on_install`, `on_activate`, and `handle_fetch`; none of these touch
//! global state, so independent interception events can run concurrently
//! against the same proxy.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use guichet_client::fetch::url::canonicalize;
use guichet_client::{Fetch, RequestMode};
use guichet_core::{AppConfig, AssetManifest, CacheDb, Error, InterceptedRequest};

use crate::events::EventScope;
use crate::router::classify;
use crate::strategy::FetchOutcome;

pub struct OfflineProxy {
    pub(crate) cache: CacheDb,
    pub(crate) fetcher: Arc<dyn Fetch>,
    manifest: AssetManifest,
    origin: url::Url,
    api_marker: String,
    skip_waiting: AtomicBool,
}

impl OfflineProxy {
    pub fn new(cache: CacheDb, fetcher: Arc<dyn Fetch>, config: &AppConfig) -> Result<Self, Error> {
        let origin = url::Url::parse(&config.origin).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        Ok(Self {
            cache,
            fetcher,
            manifest: config.manifest(),
            origin,
            api_marker: config.api_marker.clone(),
            skip_waiting: AtomicBool::new(false),
        })
    }

    /// Name of the current cache generation.
    pub fn generation(&self) -> &str {
        &self.manifest.version_tag
    }

    /// Canonical cache key for a raw request URL.
    ///
    /// The install path and the interception path must agree on this or
    /// pre-populated assets would never hit.
    pub(crate) fn canonical_key(&self, raw: &str) -> Result<String, Error> {
        let url = canonicalize(raw, &self.origin).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        Ok(url.into())
    }

    /// Activate the new version without waiting for old clients to finish.
    pub fn skip_waiting(&self) {
        if !self.skip_waiting.swap(true, Ordering::SeqCst) {
            tracing::info!("skipping waiting phase");
        }
    }

    /// Install: open the current generation and pre-populate it with the
    /// asset manifest.
    ///
    /// Each asset is fetched with cross-origin tolerance and stored under
    /// its canonical URL. A failing asset is logged and skipped; install
    /// itself never fails on one. Returns the number of assets stored.
    pub async fn on_install(&self) -> Result<u64, Error> {
        let mut stored = 0u64;
        for asset in &self.manifest.assets {
            match self.precache_asset(asset).await {
                Ok(()) => stored += 1,
                Err(err) => {
                    tracing::warn!(asset = %asset, error = %err, "failed to pre-cache asset, skipping");
                }
            }
        }
        tracing::info!(
            generation = %self.generation(),
            stored,
            total = self.manifest.assets.len(),
            "install complete"
        );
        self.skip_waiting();
        Ok(stored)
    }

    async fn precache_asset(&self, asset: &str) -> Result<(), Error> {
        // Opaque cross-origin responses are stored as-is, like the rest.
        let response = self.fetcher.get(asset, RequestMode::NoCors).await?;
        let key = response.url.as_str().to_string();
        self.cache.put(self.generation(), "GET", &key, &response.to_stored()).await
    }

    /// Activate: evict every generation whose name differs from the
    /// current version tag, then claim open clients.
    ///
    /// Returns the number of generations evicted.
    pub async fn on_activate(&self) -> Result<u64, Error> {
        let current = self.generation().to_string();
        let mut evicted = 0u64;
        for name in self.cache.list_generations().await? {
            if name != current {
                let entries = self.cache.delete_generation(&name).await?;
                tracing::info!(generation = %name, entries, "deleted stale cache generation");
                evicted += 1;
            }
        }
        tracing::info!(generation = %current, "claimed open clients");
        Ok(evicted)
    }

    /// Handle one intercepted fetch: classify, then execute the strategy.
    pub async fn handle_fetch(
        &self, request: &InterceptedRequest, scope: &mut EventScope,
    ) -> Result<FetchOutcome, Error> {
        let strategy = classify(request, &self.api_marker);
        tracing::debug!(method = %request.method, url = %request.url, ?strategy, "classified request");
        self.execute(strategy, request, scope).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockFetch, Scripted};
    use guichet_client::ResponseKind;

    async fn proxy_with(config: AppConfig, mock: MockFetch) -> OfflineProxy {
        let cache = CacheDb::open_in_memory().await.unwrap();
        OfflineProxy::new(cache, Arc::new(mock), &config).unwrap()
    }

    fn two_asset_config() -> AppConfig {
        AppConfig { precache: vec!["/".into(), "/static/css/a.css".into()], ..Default::default() }
    }

    #[tokio::test]
    async fn test_install_populates_current_generation() {
        let mock = MockFetch::new();
        mock.script("/", Scripted::ok(200, ResponseKind::Basic, b"<html></html>", "text/html"));
        mock.script("/static/css/a.css", Scripted::ok(200, ResponseKind::Basic, b"body{}", "text/css"));
        let proxy = proxy_with(two_asset_config(), mock).await;

        let stored = proxy.on_install().await.unwrap();

        assert_eq!(stored, 2);
        assert_eq!(proxy.cache.generation_len("juriste-virtuel-v1.0.0").await.unwrap(), 2);
        let hit = proxy
            .cache
            .lookup("juriste-virtuel-v1.0.0", "GET", "http://localhost:5000/")
            .await
            .unwrap();
        assert!(hit.is_some());
    }

    #[tokio::test]
    async fn test_install_skips_failing_asset() {
        let mock = MockFetch::new();
        mock.script("/", Scripted::ok(200, ResponseKind::Basic, b"<html></html>", "text/html"));
        mock.script("/static/css/a.css", Scripted::NetworkDown);
        let proxy = proxy_with(two_asset_config(), mock).await;

        let stored = proxy.on_install().await.unwrap();

        assert_eq!(stored, 1);
        assert_eq!(proxy.cache.generation_len(proxy.generation()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_install_stores_opaque_cross_origin_assets() {
        let config = AppConfig {
            precache: vec!["https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.4.0/css/all.min.css".into()],
            ..Default::default()
        };
        let mock = MockFetch::new();
        mock.script(
            "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.4.0/css/all.min.css",
            Scripted::ok(200, ResponseKind::Opaque, b".fa{}", "text/css"),
        );
        let proxy = proxy_with(config, mock).await;

        assert_eq!(proxy.on_install().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_activate_evicts_stale_generations() {
        let proxy = proxy_with(AppConfig::default(), MockFetch::new()).await;
        let stale = guichet_core::StoredResponse::new(200, vec![], b"old".to_vec());
        proxy
            .cache
            .put("juriste-virtuel-v0.9.0", "GET", "http://localhost:5000/", &stale)
            .await
            .unwrap();
        proxy
            .cache
            .put("juriste-virtuel-v1.0.0", "GET", "http://localhost:5000/", &stale)
            .await
            .unwrap();

        let evicted = proxy.on_activate().await.unwrap();

        assert_eq!(evicted, 1);
        assert_eq!(
            proxy.cache.list_generations().await.unwrap(),
            vec!["juriste-virtuel-v1.0.0"]
        );
    }

    #[tokio::test]
    async fn test_activate_with_only_current_generation_is_noop() {
        let proxy = proxy_with(AppConfig::default(), MockFetch::new()).await;
        let entry = guichet_core::StoredResponse::new(200, vec![], b"x".to_vec());
        proxy
            .cache
            .put(proxy.generation(), "GET", "http://localhost:5000/", &entry)
            .await
            .unwrap();

        assert_eq!(proxy.on_activate().await.unwrap(), 0);
        assert_eq!(proxy.cache.generation_len(proxy.generation()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_canonical_key_matches_install_key() {
        let mock = MockFetch::new();
        mock.script("/", Scripted::ok(200, ResponseKind::Basic, b"<html></html>", "text/html"));
        let proxy = proxy_with(AppConfig { precache: vec!["/".into()], ..Default::default() }, mock).await;
        proxy.on_install().await.unwrap();

        let key = proxy.canonical_key("/").unwrap();
        assert!(proxy.cache.lookup(proxy.generation(), "GET", &key).await.unwrap().is_some());
    }
}
