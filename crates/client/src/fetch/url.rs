//! URL canonicalization for consistent cache keys.
//!
//! Cache lookups match by exact URL string, so every request URL must
//! canonicalize the same way on the install path and the interception
//! path or pre-populated assets would never hit.

/// Error type for URL canonicalization failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Canonicalize a URL string for consistent caching.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Resolve app-relative paths (`/...`) against the app origin
/// 3. Lowercase the host
/// 4. Remove fragment (#...)
/// 5. Keep query string intact (do not reorder)
pub fn canonicalize(input: &str, origin: &url::Url) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = if trimmed.starts_with('/') {
        origin.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?
    } else {
        url::Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?
    };

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if let Some(host) = parsed.host_str() {
        let lowered = host.to_lowercase();
        if lowered != host {
            parsed
                .set_host(Some(&lowered))
                .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
        }
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

/// Whether `url` shares scheme, host, and port with the app origin.
pub fn is_same_origin(url: &url::Url, origin: &url::Url) -> bool {
    url.scheme() == origin.scheme() && url.host_str() == origin.host_str() && url.port_or_known_default() == origin.port_or_known_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> url::Url {
        url::Url::parse("http://localhost:5000").unwrap()
    }

    #[test]
    fn test_canonicalize_relative_root() {
        let url = canonicalize("/", &origin()).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/");
    }

    #[test]
    fn test_canonicalize_relative_asset() {
        let url = canonicalize("/static/css/a.css", &origin()).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/static/css/a.css");
    }

    #[test]
    fn test_canonicalize_absolute_unchanged() {
        let url = canonicalize("https://fonts.googleapis.com/css2?family=Inter", &origin()).unwrap();
        assert_eq!(url.host_str(), Some("fonts.googleapis.com"));
        assert_eq!(url.query(), Some("family=Inter"));
    }

    #[test]
    fn test_canonicalize_lowercase_host() {
        let url = canonicalize("https://EXAMPLE.COM/path", &origin()).unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
    }

    #[test]
    fn test_canonicalize_remove_fragment() {
        let url = canonicalize("http://localhost:5000/page#section", &origin()).unwrap();
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_canonicalize_trim_whitespace() {
        let url = canonicalize("  /  ", &origin()).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/");
    }

    #[test]
    fn test_canonicalize_stable_for_cache_keys() {
        let first = canonicalize("/static/manifest.json", &origin()).unwrap();
        let second = canonicalize("http://LOCALHOST:5000/static/manifest.json", &origin()).unwrap();
        assert_eq!(first.as_str(), second.as_str());
    }

    #[test]
    fn test_canonicalize_unsupported_scheme() {
        let result = canonicalize("file:///etc/passwd", &origin());
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_canonicalize_empty() {
        assert!(matches!(canonicalize("", &origin()), Err(UrlError::Empty)));
        assert!(matches!(canonicalize("   ", &origin()), Err(UrlError::Empty)));
    }

    #[test]
    fn test_same_origin() {
        let o = origin();
        assert!(is_same_origin(&canonicalize("/", &o).unwrap(), &o));
        assert!(!is_same_origin(
            &canonicalize("https://cdnjs.cloudflare.com/a.css", &o).unwrap(),
            &o
        ));
    }

    #[test]
    fn test_same_origin_default_ports() {
        let o = url::Url::parse("https://example.com").unwrap();
        let explicit = url::Url::parse("https://example.com:443/x").unwrap();
        assert!(is_same_origin(&explicit, &o));
    }
}
