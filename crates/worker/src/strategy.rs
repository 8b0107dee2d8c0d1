//! Strategy execution.
//!
//! Network-first for API calls, cache-first for everything else. Both
//! strategies resolve to a terminal outcome: a response (from network,
//! cache, or synthesized offline payload) or no response at all.

use guichet_client::{FetchedResponse, RequestMode};
use guichet_core::{Destination, Error, InterceptedRequest, OfflinePayload, StoredResponse};
use serde::{Deserialize, Serialize};

use crate::events::EventScope;
use crate::proxy::OfflineProxy;
use crate::router::Strategy;

/// Where a proxied response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServedFrom {
    Network,
    Cache,
    OfflineFallback,
}

/// A response the proxy hands back to the interception point.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub served_from: ServedFrom,
}

impl ProxyResponse {
    fn from_network(response: &FetchedResponse) -> Self {
        Self {
            status: response.status,
            headers: response.headers.clone(),
            body: response.bytes.to_vec(),
            served_from: ServedFrom::Network,
        }
    }

    fn from_stored(stored: StoredResponse) -> Self {
        Self { status: stored.status, headers: stored.headers, body: stored.body, served_from: ServedFrom::Cache }
    }
}

/// Terminal state of one intercepted fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The proxy produced a response.
    Response(ProxyResponse),
    /// Cache and network both failed with no sensible substitute; the
    /// failure propagates to the caller.
    NoResponse,
    /// The proxy did not intervene.
    Passthrough,
}

impl OfflineProxy {
    /// Execute a strategy for a request.
    ///
    /// Once a strategy begins it runs to a terminal state; there is no
    /// cancellation.
    pub async fn execute(
        &self, strategy: Strategy, request: &InterceptedRequest, scope: &mut EventScope,
    ) -> Result<FetchOutcome, Error> {
        match strategy {
            Strategy::Passthrough => Ok(FetchOutcome::Passthrough),
            Strategy::NetworkFirst => self.network_first(request).await,
            Strategy::CacheFirst => self.cache_first(request, scope).await,
        }
    }

    /// Network-first, for API calls.
    ///
    /// A status-200 network response is returned verbatim and never
    /// persisted. Anything else, non-200 status or transport failure
    /// alike, becomes a synthesized offline payload, so the caller never
    /// observes a failed API call.
    async fn network_first(&self, request: &InterceptedRequest) -> Result<FetchOutcome, Error> {
        match self.fetcher.get(&request.url, RequestMode::Cors).await {
            Ok(response) if response.status == 200 => Ok(FetchOutcome::Response(ProxyResponse::from_network(&response))),
            Ok(response) => {
                tracing::debug!(url = %request.url, status = response.status, "API response not ok, going offline");
                self.offline_fallback(request)
            }
            Err(err) => {
                tracing::warn!(url = %request.url, error = %err, "API fetch failed, going offline");
                self.offline_fallback(request)
            }
        }
    }

    fn offline_fallback(&self, request: &InterceptedRequest) -> Result<FetchOutcome, Error> {
        let payload = OfflinePayload::for_request(request);
        let body = serde_json::to_vec(&payload)?;
        Ok(FetchOutcome::Response(ProxyResponse {
            status: 200,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body,
            served_from: ServedFrom::OfflineFallback,
        }))
    }

    /// Cache-first, for static assets and navigations.
    ///
    /// A hit is returned verbatim without revalidation. On a miss the
    /// network is consulted; a basic 200 response is returned immediately
    /// while a snapshot is written to the cache as a tracked background
    /// task. Total network failure falls back to the cached root for
    /// document navigations and to no response otherwise.
    async fn cache_first(
        &self, request: &InterceptedRequest, scope: &mut EventScope,
    ) -> Result<FetchOutcome, Error> {
        let generation = self.generation().to_string();
        let key = self.canonical_key(&request.url)?;

        if let Some(stored) = self.cache.lookup(&generation, &request.method, &key).await? {
            return Ok(FetchOutcome::Response(ProxyResponse::from_stored(stored)));
        }

        match self.fetcher.get(&request.url, RequestMode::Cors).await {
            Err(err) => {
                tracing::warn!(url = %request.url, error = %err, "network failed on cache miss");
                if request.destination == Destination::Document {
                    let root = self.canonical_key("/")?;
                    if let Some(stored) = self.cache.lookup(&generation, "GET", &root).await? {
                        return Ok(FetchOutcome::Response(ProxyResponse::from_stored(stored)));
                    }
                }
                Ok(FetchOutcome::NoResponse)
            }
            Ok(response) if response.is_basic_ok() => {
                let stored = response.to_stored();
                let cache = self.cache.clone();
                let method = request.method.to_uppercase();
                let write_key = key.clone();
                scope.wait_until(async move {
                    if let Err(err) = cache.put(&generation, &method, &write_key, &stored).await {
                        // Non-fatal: the response is already in flight to the caller.
                        tracing::warn!(url = %write_key, error = %err, "background cache write failed");
                    }
                });
                Ok(FetchOutcome::Response(ProxyResponse::from_network(&response)))
            }
            // Opaque, redirect, or error response: return as-is, never store.
            Ok(response) => Ok(FetchOutcome::Response(ProxyResponse::from_network(&response))),
        }
    }
}
