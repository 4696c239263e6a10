//! URL resolution against the agent scope.

/// Error type for URL resolution failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Resolve a path or URL against `base`, the way the agent resolves its
/// manifest entries relative to its own location.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Join against `base` (absolute inputs replace it)
/// 3. Require http or https
/// 4. Remove fragment (#...)
/// 5. Keep query string intact (do not reorder)
pub fn resolve(base: &url::Url, input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = base.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn scope() -> Url {
        Url::parse("https://app.example/pwa/").unwrap()
    }

    #[test]
    fn test_resolve_relative_to_scope() {
        let url = resolve(&scope(), "icon-512.png").unwrap();
        assert_eq!(url.as_str(), "https://app.example/pwa/icon-512.png");
    }

    #[test]
    fn test_resolve_root_relative() {
        let url = resolve(&scope(), "/index.html").unwrap();
        assert_eq!(url.as_str(), "https://app.example/index.html");
    }

    #[test]
    fn test_resolve_absolute_replaces_base() {
        let url = resolve(&scope(), "https://CDN.example/lib.js").unwrap();
        assert_eq!(url.as_str(), "https://cdn.example/lib.js");
    }

    #[test]
    fn test_resolve_remove_fragment() {
        let url = resolve(&scope(), "/docs#section").unwrap();
        assert_eq!(url.fragment(), None);
        assert_eq!(url.path(), "/docs");
    }

    #[test]
    fn test_resolve_preserve_query() {
        let url = resolve(&scope(), "/app.js?a=1&b=2").unwrap();
        assert_eq!(url.query(), Some("a=1&b=2"));
    }

    #[test]
    fn test_resolve_trim_whitespace() {
        let url = resolve(&scope(), "  /  ").unwrap();
        assert_eq!(url.as_str(), "https://app.example/");
    }

    #[test]
    fn test_resolve_unsupported_scheme() {
        let result = resolve(&scope(), "file:///etc/passwd");
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_resolve_empty() {
        assert!(matches!(resolve(&scope(), ""), Err(UrlError::Empty)));
        assert!(matches!(resolve(&scope(), "   "), Err(UrlError::Empty)));
    }
}
