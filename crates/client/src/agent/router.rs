//! Request classification.
//!
//! Rules are checked in a fixed order and the first match wins:
//!
//! 1. Non-GET requests are not intercepted.
//! 2. Navigations, and requests whose `Accept` asks for HTML, take the
//!    navigation route.
//! 3. Stylesheets, scripts, images and fonts take the static-asset route.
//! 4. Everything else takes the network-with-cache-fallback route.

use std::fmt;

use offline_core::Request;
use offline_core::RequestMode;
use serde::{Deserialize, Serialize};

/// Where a request is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// Left to default network handling; no cache interaction.
    Passthrough,
    /// Network first, then cache, then the offline document.
    Navigation,
    /// Cache first, then network (refreshing the runtime store).
    StaticAsset,
    /// Network first, then cache.
    NetworkFallback,
}

impl Route {
    pub fn as_str(self) -> &'static str {
        match self {
            Route::Passthrough => "passthrough",
            Route::Navigation => "navigation",
            Route::StaticAsset => "static_asset",
            Route::NetworkFallback => "network_fallback",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a request.
pub fn route(request: &Request) -> Route {
    if !request.is_get() {
        return Route::Passthrough;
    }
    if request.mode() == RequestMode::Navigate || request.accepts_html() {
        return Route::Navigation;
    }
    if request.destination().is_static_asset() {
        return Route::StaticAsset;
    }
    Route::NetworkFallback
}

#[cfg(test)]
mod tests {
    use super::*;
    use offline_core::Destination;
    use url::Url;

    fn get(path: &str) -> Request {
        Request::get(Url::parse("https://app.example/").unwrap().join(path).unwrap())
    }

    #[test]
    fn test_non_get_passes_through() {
        for method in ["POST", "PUT", "DELETE", "HEAD", "OPTIONS"] {
            let request = Request::new(method, Url::parse("https://app.example/").unwrap())
                .with_mode(RequestMode::Navigate)
                .with_destination(Destination::Image);
            assert_eq!(route(&request), Route::Passthrough, "{method}");
        }
    }

    #[test]
    fn test_navigate_mode() {
        let request = get("/about").with_mode(RequestMode::Navigate);
        assert_eq!(route(&request), Route::Navigation);
    }

    #[test]
    fn test_accept_html() {
        let request = get("/partial").with_header("accept", "text/html");
        assert_eq!(route(&request), Route::Navigation);
    }

    #[test]
    fn test_navigation_checked_before_destination() {
        let request = get("/logo.svg")
            .with_destination(Destination::Image)
            .with_header("accept", "text/html,image/svg+xml");
        assert_eq!(route(&request), Route::Navigation);
    }

    #[test]
    fn test_static_assets() {
        for destination in [Destination::Style, Destination::Script, Destination::Image, Destination::Font] {
            let request = get("/asset").with_destination(destination);
            assert_eq!(route(&request), Route::StaticAsset, "{destination}");
        }
    }

    #[test]
    fn test_everything_else() {
        let request = get("/api/items").with_header("accept", "application/json");
        assert_eq!(route(&request), Route::NetworkFallback);

        let request = get("/manifest.json").with_destination(Destination::Other);
        assert_eq!(route(&request), Route::NetworkFallback);

        let request = get("/embed").with_destination(Destination::Document);
        assert_eq!(route(&request), Route::NetworkFallback);
    }
}
