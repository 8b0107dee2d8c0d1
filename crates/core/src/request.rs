//! Intercepted request model.
//!
//! The proxy observes requests at the interception point and consumes only
//! three attributes: method, target URL, and destination kind. Request
//! bodies are never read.

use serde::{Deserialize, Serialize};

/// Classification of a request's purpose.
///
/// `Document` marks a full page navigation, which gets the cached root
/// fallback when both cache and network fail; everything else is a
/// sub-resource fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    Document,
    #[default]
    Resource,
}

/// A network request observed at the interception point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterceptedRequest {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub destination: Destination,
}

impl InterceptedRequest {
    /// A GET sub-resource request.
    pub fn get(url: impl Into<String>) -> Self {
        Self { method: "GET".to_string(), url: url.into(), destination: Destination::Resource }
    }

    /// A GET full-page navigation request.
    pub fn navigation(url: impl Into<String>) -> Self {
        Self { method: "GET".to_string(), url: url.into(), destination: Destination::Document }
    }

    /// Only GET requests are ever considered for caching.
    pub fn is_get(&self) -> bool {
        self.method.eq_ignore_ascii_case("GET")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_get_case_insensitive() {
        let mut request = InterceptedRequest::get("/");
        assert!(request.is_get());
        request.method = "get".to_string();
        assert!(request.is_get());
        request.method = "POST".to_string();
        assert!(!request.is_get());
    }

    #[test]
    fn test_destination_default_is_resource() {
        let request: InterceptedRequest =
            serde_json::from_str(r#"{"method":"GET","url":"/static/css/a.css"}"#).unwrap();
        assert_eq!(request.destination, Destination::Resource);
    }

    #[test]
    fn test_destination_wire_format() {
        let request: InterceptedRequest =
            serde_json::from_str(r#"{"method":"GET","url":"/","destination":"document"}"#).unwrap();
        assert_eq!(request.destination, Destination::Document);
    }
}
