//! Request routing.
//!
//! Every intercepted request is classified into a strategy before any I/O
//! happens. Classification is pure: it depends only on the request's
//! method and URL string, never on cache or network state.

use guichet_core::InterceptedRequest;

/// The strategy a request is dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Do not intervene; the request proceeds through the normal network
    /// path, unmodified and uncached.
    Passthrough,
    /// Prefer the live network result; synthesize an offline payload on
    /// failure. Used for API calls.
    NetworkFirst,
    /// Prefer stored content; fall back to network only on miss. Used for
    /// static assets and navigations.
    CacheFirst,
}

/// Classify an intercepted request.
///
/// Non-GET requests are never intervened on. GET requests whose URL
/// contains the API marker segment get network-first; everything else
/// gets cache-first.
pub fn classify(request: &InterceptedRequest, api_marker: &str) -> Strategy {
    if !request.is_get() {
        return Strategy::Passthrough;
    }
    if request.url.contains(api_marker) {
        return Strategy::NetworkFirst;
    }
    Strategy::CacheFirst
}
