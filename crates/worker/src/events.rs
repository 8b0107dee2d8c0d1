//! Event model and dispatch.
//!
//! The hosting runtime drives the proxy through named lifecycle and
//! interception events. The dispatcher is the adapter at that boundary:
//! it binds each event to the corresponding proxy method, keeps the
//! event alive until all extended work settles, and produces one wire
//! outcome per event.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;

use guichet_core::InterceptedRequest;

use crate::error::WorkerError;
use crate::notify::{self, ClickOutcome, Notification};
use crate::proxy::OfflineProxy;
use crate::strategy::{FetchOutcome, ProxyResponse, ServedFrom};

/// An event delivered by the hosting runtime.
///
/// No ordering is assumed beyond install -> activate -> fetch*.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Event {
    Install,
    Activate,
    Fetch {
        request: InterceptedRequest,
    },
    Message {
        #[serde(default)]
        data: serde_json::Value,
    },
    Push {
        #[serde(default)]
        payload: Option<String>,
    },
    NotificationClick {
        #[serde(default)]
        action: Option<String>,
    },
    Sync {
        #[serde(default)]
        tag: Option<String>,
    },
}

/// Keeps an event alive until extended async work finishes.
///
/// Work enqueued with `wait_until` runs detached from the response path,
/// but the dispatcher settles the scope before the event is considered
/// resolved, so the runtime never tears the worker down mid-write.
pub struct EventScope {
    tasks: JoinSet<()>,
}

impl EventScope {
    pub fn new() -> Self {
        Self { tasks: JoinSet::new() }
    }

    /// Extend the event's lifetime until `work` completes.
    pub fn wait_until<F>(&mut self, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tasks.spawn(work);
    }

    /// Await everything enqueued on this scope.
    pub async fn settle(&mut self) {
        while let Some(result) = self.tasks.join_next().await {
            if let Err(err) = result {
                tracing::error!(error = %err, "extended event task panicked");
            }
        }
    }

    #[cfg(test)]
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }
}

impl Default for EventScope {
    fn default() -> Self {
        Self::new()
    }
}

/// Wire form of a proxied response.
///
/// Body bytes are carried as lossy UTF-8; the protocol serves a text
/// oriented app (HTML, CSS, JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireResponse {
    pub status: u16,
    pub served_from: ServedFrom,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl From<ProxyResponse> for WireResponse {
    fn from(response: ProxyResponse) -> Self {
        Self {
            status: response.status,
            served_from: response.served_from,
            headers: response.headers,
            body: String::from_utf8_lossy(&response.body).into_owned(),
        }
    }
}

/// One outcome per dispatched event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EventOutcome {
    Installed { precached: u64 },
    Activated { evicted: u64 },
    Response { response: WireResponse },
    NoResponse,
    Passthrough,
    Notification { notification: Notification },
    OpenWindow { url: String },
    Acknowledged,
    Ignored,
    Error { message: String },
}

/// Binds events to the proxy; one instance serves the whole process.
pub struct EventDispatcher {
    proxy: Arc<OfflineProxy>,
}

impl EventDispatcher {
    pub fn new(proxy: Arc<OfflineProxy>) -> Self {
        Self { proxy }
    }

    /// Dispatch one event to its terminal outcome.
    ///
    /// Install and activate are awaited to completion before the event
    /// resolves. Fetch runs under an [`EventScope`] so detached work
    /// (the opportunistic cache write) is settled before returning.
    pub async fn dispatch(&self, event: Event) -> EventOutcome {
        match event {
            Event::Install => match self.proxy.on_install().await {
                Ok(precached) => EventOutcome::Installed { precached },
                Err(err) => EventOutcome::Error { message: WorkerError::from(err).to_string() },
            },
            Event::Activate => match self.proxy.on_activate().await {
                Ok(evicted) => EventOutcome::Activated { evicted },
                Err(err) => EventOutcome::Error { message: WorkerError::from(err).to_string() },
            },
            Event::Fetch { request } => {
                let mut scope = EventScope::new();
                let outcome = match self.proxy.handle_fetch(&request, &mut scope).await {
                    Ok(FetchOutcome::Response(response)) => EventOutcome::Response { response: response.into() },
                    Ok(FetchOutcome::NoResponse) => EventOutcome::NoResponse,
                    Ok(FetchOutcome::Passthrough) => EventOutcome::Passthrough,
                    Err(err) => EventOutcome::Error { message: WorkerError::from(err).to_string() },
                };
                scope.settle().await;
                outcome
            }
            Event::Message { data } => {
                if notify::is_skip_waiting(&data) {
                    self.proxy.skip_waiting();
                    EventOutcome::Acknowledged
                } else {
                    EventOutcome::Ignored
                }
            }
            Event::Push { payload } => {
                EventOutcome::Notification { notification: notify::notification_for_push(payload.as_deref()) }
            }
            Event::NotificationClick { action } => match notify::handle_click(action.as_deref()) {
                ClickOutcome::OpenWindow(url) => EventOutcome::OpenWindow { url },
                ClickOutcome::Dismissed => EventOutcome::Acknowledged,
            },
            Event::Sync { tag } => {
                if tag.as_deref() == Some(notify::BACKGROUND_SYNC_TAG) {
                    tracing::info!("background sync triggered");
                }
                EventOutcome::Acknowledged
            }
        }
    }
}
