//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;
use url::Url;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `scope` is not an absolute http(s) URL
    /// - `cache_version` is empty or contains whitespace
    /// - a store prefix is empty, or both store names collide
    /// - `asset_cache_limit` or `navigation_cache_limit` is 0
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is set below 100ms or above 5 minutes
    /// - `user_agent` is empty
    ///
    /// Returns `ConfigError::Missing` if either fallback path is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scope = Url::parse(&self.scope).map_err(|e| invalid("scope", &e.to_string()))?;
        if !matches!(scope.scheme(), "http" | "https") {
            return Err(invalid("scope", "must be an http or https URL"));
        }

        if self.cache_version.is_empty() || self.cache_version.chars().any(char::is_whitespace) {
            return Err(invalid("cache_version", "must be non-empty and contain no whitespace"));
        }
        if self.precache_prefix.is_empty() {
            return Err(invalid("precache_prefix", "must not be empty"));
        }
        if self.runtime_prefix.is_empty() {
            return Err(invalid("runtime_prefix", "must not be empty"));
        }
        if self.precache_name() == self.runtime_name() {
            return Err(invalid("runtime_prefix", "precache and runtime store names must differ"));
        }

        if self.asset_cache_limit == 0 {
            return Err(invalid("asset_cache_limit", "must be greater than 0"));
        }
        if self.navigation_cache_limit == Some(0) {
            return Err(invalid("navigation_cache_limit", "must be greater than 0 when set"));
        }

        if self.offline_fallback.trim().is_empty() {
            return Err(ConfigError::Missing {
                field: "offline_fallback".into(),
                hint: "Set OFFLINE_AGENT_OFFLINE_FALLBACK to a precached document path".into(),
            });
        }
        if self.image_fallback.trim().is_empty() {
            return Err(ConfigError::Missing {
                field: "image_fallback".into(),
                hint: "Set OFFLINE_AGENT_IMAGE_FALLBACK to a precached image path".into(),
            });
        }

        if self.max_bytes == 0 {
            return Err(invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(invalid("max_bytes", "must not exceed 50MB"));
        }

        if let Some(timeout_ms) = self.timeout_ms {
            if timeout_ms < 100 {
                return Err(invalid("timeout_ms", "must be at least 100ms"));
            }
            if timeout_ms > 300_000 {
                return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
            }
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        for field in self.unprecached_fallbacks(&scope) {
            tracing::warn!(field, "fallback is not in precache_urls; it will only be served if cached at runtime");
        }

        Ok(())
    }

    /// Fallback fields whose URL, resolved against `scope`, is not one of
    /// the resolved precache URLs.
    fn unprecached_fallbacks(&self, scope: &Url) -> Vec<&'static str> {
        let resolve = |path: &str| {
            scope.join(path.trim()).ok().map(|mut url| {
                url.set_fragment(None);
                url
            })
        };
        let precached: Vec<Url> = self.precache_urls.iter().filter_map(|p| resolve(p.as_str())).collect();

        [("offline_fallback", &self.offline_fallback), ("image_fallback", &self.image_fallback)]
            .into_iter()
            .filter(|(_, path)| resolve(path.as_str()).is_none_or(|url| !precached.contains(&url)))
            .map(|(field, _)| field)
            .collect()
    }
}
