//! Scripted network for strategy and dispatch tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use guichet_client::fetch::url::canonicalize;
use guichet_client::{Fetch, FetchedResponse, RequestMode, ResponseKind};
use guichet_core::Error;

/// What a scripted URL should produce.
pub enum Scripted {
    Respond { status: u16, kind: ResponseKind, body: Vec<u8>, content_type: String },
    NetworkDown,
}

impl Scripted {
    pub fn ok(status: u16, kind: ResponseKind, body: &[u8], content_type: &str) -> Self {
        Scripted::Respond { status, kind, body: body.to_vec(), content_type: content_type.to_string() }
    }
}

/// In-memory `Fetch` implementation keyed by canonical URL.
///
/// Unscripted URLs behave like a dead network, which is what most
/// offline-path tests want.
pub struct MockFetch {
    origin: url::Url,
    scripts: Mutex<HashMap<String, Scripted>>,
    calls: AtomicUsize,
}

impl MockFetch {
    pub fn new() -> Self {
        Self {
            origin: url::Url::parse("http://localhost:5000").unwrap(),
            scripts: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Script a response for a URL (relative or absolute).
    pub fn script(&self, url: &str, scripted: Scripted) {
        let key = canonicalize(url, &self.origin).unwrap().to_string();
        self.scripts.lock().unwrap().insert(key, scripted);
    }

    /// Number of network calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetch for MockFetch {
    async fn get(&self, url: &str, _mode: RequestMode) -> Result<FetchedResponse, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let canonical = canonicalize(url, &self.origin).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        let scripts = self.scripts.lock().unwrap();
        match scripts.get(canonical.as_str()) {
            Some(Scripted::Respond { status, kind, body, content_type }) => Ok(FetchedResponse {
                url: canonical.clone(),
                final_url: canonical,
                status: *status,
                kind: *kind,
                headers: vec![("Content-Type".to_string(), content_type.clone())],
                bytes: Bytes::from(body.clone()),
            }),
            Some(Scripted::NetworkDown) | None => Err(Error::Network("connection refused".to_string())),
        }
    }
}
