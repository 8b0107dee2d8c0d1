//! Message, push, and notification handling.
//!
//! The proxy accepts a small control surface beyond fetch interception:
//! a `SKIP_WAITING` message, push payloads that surface as system
//! notifications, and clicks on those notifications.

use serde::{Deserialize, Serialize};

/// Control message instructing the worker to activate immediately.
pub const SKIP_WAITING: &str = "SKIP_WAITING";

/// Sync tag registered by the application for connection-restored work.
pub const BACKGROUND_SYNC_TAG: &str = "background-sync";

/// Notification title shown for push payloads.
const NOTIFICATION_TITLE: &str = "Juriste Virtuel";

/// Body used when a push event carries no payload.
const DEFAULT_PUSH_BODY: &str = "New legal information available";

/// A user-actionable button on a notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
}

/// A system notification the hosting runtime should display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub actions: Vec<NotificationAction>,
}

/// Build the notification for a push payload.
///
/// The payload is opaque text; absent payloads get a default body.
pub fn notification_for_push(payload: Option<&str>) -> Notification {
    Notification {
        title: NOTIFICATION_TITLE.to_string(),
        body: payload.unwrap_or(DEFAULT_PUSH_BODY).to_string(),
        icon: "/static/img/icon-192x192.png".to_string(),
        badge: "/static/img/icon-72x72.png".to_string(),
        actions: vec![
            NotificationAction { action: "view".to_string(), title: "View Details".to_string() },
            NotificationAction { action: "dismiss".to_string(), title: "Dismiss".to_string() },
        ],
    }
}

/// What a notification click resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Open the application at the given path.
    OpenWindow(String),
    /// Close the notification and do nothing else.
    Dismissed,
}

/// Handle a notification click: "view" opens the application root,
/// anything else (including a bare click) just dismisses.
pub fn handle_click(action: Option<&str>) -> ClickOutcome {
    match action {
        Some("view") => ClickOutcome::OpenWindow("/".to_string()),
        _ => ClickOutcome::Dismissed,
    }
}

/// Whether a message payload is the skip-waiting control message.
///
/// Only the `{type: "SKIP_WAITING"}` shape is recognized; all other
/// message shapes are ignored.
pub fn is_skip_waiting(data: &serde_json::Value) -> bool {
    data.get("type").and_then(|t| t.as_str()) == Some(SKIP_WAITING)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_push_with_payload() {
        let notification = notification_for_push(Some("Mise à jour du droit du travail"));
        assert_eq!(notification.title, "Juriste Virtuel");
        assert_eq!(notification.body, "Mise à jour du droit du travail");
        assert_eq!(notification.actions.len(), 2);
    }

    #[test]
    fn test_push_without_payload_gets_default_body() {
        let notification = notification_for_push(None);
        assert_eq!(notification.body, DEFAULT_PUSH_BODY);
    }

    #[test]
    fn test_click_view_opens_root() {
        assert_eq!(handle_click(Some("view")), ClickOutcome::OpenWindow("/".to_string()));
    }

    #[test]
    fn test_click_anything_else_dismisses() {
        assert_eq!(handle_click(Some("dismiss")), ClickOutcome::Dismissed);
        assert_eq!(handle_click(Some("unknown")), ClickOutcome::Dismissed);
        assert_eq!(handle_click(None), ClickOutcome::Dismissed);
    }

    #[test]
    fn test_skip_waiting_recognition() {
        assert!(is_skip_waiting(&json!({"type": "SKIP_WAITING"})));
        assert!(!is_skip_waiting(&json!({"type": "skip_waiting"})));
        assert!(!is_skip_waiting(&json!("SKIP_WAITING")));
        assert!(!is_skip_waiting(&json!(null)));
    }
}
