//! cache_list tool implementation.
//!
//! Lists store names, or one store's keys in insertion order.

use offline_core::{CacheStorage, Error};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Parameters for the cache_list tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheListParams {
    /// Store to list keys of. Omit to list store names.
    pub store: Option<String>,
}

/// One cached request.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheKey {
    pub method: String,
    pub url: String,
}

/// Output from the cache_list tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum CacheListOutput {
    Stores { stores: Vec<String> },
    Keys { store: String, keys: Vec<CacheKey> },
}

/// Implementation of the cache_list tool.
pub async fn list_impl(storage: &CacheStorage, params: CacheListParams) -> Result<CallToolResult, McpError> {
    let output = match params.store {
        None => CacheListOutput::Stores { stores: storage.store_names().await? },
        Some(name) => {
            let store = storage
                .existing_store(&name)
                .await?
                .ok_or_else(|| Error::StoreNotFound(name.clone()))?;
            let keys = store
                .keys()
                .await?
                .iter()
                .map(|request| CacheKey { method: request.method().to_string(), url: request.url().to_string() })
                .collect();
            CacheListOutput::Keys { store: name, keys }
        }
    };

    json_result(&output)
}
