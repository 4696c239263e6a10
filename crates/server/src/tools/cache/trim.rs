//! cache_trim tool implementation.
//!
//! Runs count-based eviction on one store.

use offline_core::cache::limit_cache_size;
use offline_core::{CacheStorage, Error};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Parameters for the cache_trim tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheTrimParams {
    /// Store to trim.
    pub store: String,

    /// Keep at most this many of the newest entries.
    pub max_entries: usize,
}

/// Output from the cache_trim tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheTrimOutput {
    /// Number of entries deleted.
    pub deleted: u64,

    /// Entries left in the store.
    pub remaining: usize,
}

/// Implementation of the cache_trim tool.
pub async fn trim_impl(storage: &CacheStorage, params: CacheTrimParams) -> Result<CallToolResult, McpError> {
    let store = storage
        .existing_store(&params.store)
        .await?
        .ok_or_else(|| Error::StoreNotFound(params.store.clone()))?;

    let deleted = limit_cache_size(storage, &params.store, params.max_entries).await?;
    let remaining = store.len().await?;
    tracing::info!(store = %params.store, deleted, remaining, "trimmed cache store");

    json_result(&CacheTrimOutput { deleted, remaining })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{activated_agent, output};

    #[tokio::test]
    async fn test_trim_keeps_newest() {
        let agent = activated_agent().await;
        let params = CacheTrimParams { store: "pwa-cache-v1".into(), max_entries: 2 };

        let result = trim_impl(agent.storage(), params).await.unwrap();
        let out: CacheTrimOutput = output(&result);
        assert_eq!(out.deleted, 3);
        assert_eq!(out.remaining, 2);

        let store = agent.storage().existing_store("pwa-cache-v1").await.unwrap().unwrap();
        let urls: Vec<String> = store.keys().await.unwrap().iter().map(|r| r.url().to_string()).collect();
        assert_eq!(urls, vec!["https://app.example/icon-256.png", "https://app.example/icon-512.png"]);
    }

    #[tokio::test]
    async fn test_trim_missing_store() {
        let agent = activated_agent().await;
        let params = CacheTrimParams { store: "runtime-cache-v0".into(), max_entries: 1 };
        assert!(trim_impl(agent.storage(), params).await.is_err());
        assert!(!agent.storage().has_store("runtime-cache-v0").await.unwrap());
    }
}
