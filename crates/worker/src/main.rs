//! guichet worker entry point.
//!
//! Boots the offline cache proxy and serves the event protocol on stdio:
//! one JSON event per input line, one JSON outcome per output line.
//! Logging goes to stderr to keep stdout clean for the protocol.

use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

mod error;
mod events;
mod notify;
mod proxy;
mod router;
mod strategy;
#[cfg(test)]
mod testing;

use error::WorkerError;
use events::{Event, EventDispatcher, EventOutcome};
use guichet_client::{FetchConfig, HttpFetcher};
use guichet_core::{AppConfig, CacheDb};
use proxy::OfflineProxy;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(generation = %config.version_tag, "starting offline cache proxy");

    let cache = CacheDb::open(&config.db_path).await?;
    let fetcher = HttpFetcher::new(FetchConfig::from(&config))?;
    let proxy = Arc::new(OfflineProxy::new(cache, Arc::new(fetcher), &config)?);
    let dispatcher = EventDispatcher::new(proxy);

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let mut lines = stdin.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let outcome = match serde_json::from_str::<Event>(&line) {
            Ok(event) => dispatcher.dispatch(event).await,
            Err(err) => {
                tracing::warn!(error = %err, "dropping malformed event");
                EventOutcome::Error { message: WorkerError::MalformedEvent(err.to_string()).to_string() }
            }
        };

        let mut encoded = serde_json::to_vec(&outcome)?;
        encoded.push(b'\n');
        stdout.write_all(&encoded).await?;
        stdout.flush().await?;
    }

    tracing::info!("event stream closed, shutting down");
    Ok(())
}
