//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (OFFLINE_AGENT_*)
//! 2. TOML config file (if OFFLINE_AGENT_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (OFFLINE_AGENT_*)
/// 2. TOML config file (if OFFLINE_AGENT_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite database holding every cache store.
    ///
    /// Set via OFFLINE_AGENT_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Base URL the agent is registered at.
    ///
    /// Precache paths and fallback paths resolve against it.
    #[serde(default = "default_scope")]
    pub scope: String,

    /// Version tag embedded in both store names.
    ///
    /// Bumping it makes the next activation delete every older store.
    #[serde(default = "default_cache_version")]
    pub cache_version: String,

    /// Prefix of the precache store name.
    #[serde(default = "default_precache_prefix")]
    pub precache_prefix: String,

    /// Prefix of the runtime store name.
    #[serde(default = "default_runtime_prefix")]
    pub runtime_prefix: String,

    /// Resources fetched and stored at install, in order.
    #[serde(default = "default_precache_urls")]
    pub precache_urls: Vec<String>,

    /// Document served when a navigation fails with no cached copy.
    #[serde(default = "default_offline_fallback")]
    pub offline_fallback: String,

    /// Image served when an image request fails with no cached copy.
    #[serde(default = "default_image_fallback")]
    pub image_fallback: String,

    /// Runtime store bound applied after static-asset writes.
    #[serde(default = "default_asset_cache_limit")]
    pub asset_cache_limit: usize,

    /// Runtime store bound applied after navigation writes (none by default).
    #[serde(default)]
    pub navigation_cache_limit: Option<usize>,

    /// User-Agent string for HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to read per response.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP client timeout in milliseconds.
    ///
    /// Unset by default: a slow network keeps the request pending rather
    /// than falling back to the cache early.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./offline-agent-cache.sqlite")
}

fn default_scope() -> String {
    "http://localhost:8080/".into()
}

fn default_cache_version() -> String {
    "v1".into()
}

fn default_precache_prefix() -> String {
    "pwa-cache-".into()
}

fn default_runtime_prefix() -> String {
    "runtime-cache-".into()
}

fn default_precache_urls() -> Vec<String> {
    ["/", "/index.html", "/offline.html", "icon-256.png", "icon-512.png"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_offline_fallback() -> String {
    "offline.html".into()
}

fn default_image_fallback() -> String {
    "icon-512.png".into()
}

fn default_asset_cache_limit() -> usize {
    60
}

fn default_user_agent() -> String {
    "offline-agent/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            scope: default_scope(),
            cache_version: default_cache_version(),
            precache_prefix: default_precache_prefix(),
            runtime_prefix: default_runtime_prefix(),
            precache_urls: default_precache_urls(),
            offline_fallback: default_offline_fallback(),
            image_fallback: default_image_fallback(),
            asset_cache_limit: default_asset_cache_limit(),
            navigation_cache_limit: None,
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: None,
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest, if one is configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Name of the versioned precache store, e.g. `pwa-cache-v1`.
    pub fn precache_name(&self) -> String {
        format!("{}{}", self.precache_prefix, self.cache_version)
    }

    /// Name of the versioned runtime store, e.g. `runtime-cache-v1`.
    pub fn runtime_name(&self) -> String {
        format!("{}{}", self.runtime_prefix, self.cache_version)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `OFFLINE_AGENT_`
    /// 2. TOML file from `OFFLINE_AGENT_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("OFFLINE_AGENT_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("OFFLINE_AGENT_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
