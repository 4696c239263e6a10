//! Per-route response strategies.
//!
//! Each strategy either produces a response or fails with
//! `Error::NoResponse` once its fallbacks are exhausted. Runtime-cache
//! writes happen on the [`Background`] set after the response has been
//! split, so the caller never waits on them.

pub mod navigation;
pub mod network_fallback;
pub mod static_asset;

use std::sync::Arc;

use offline_core::cache::limit_cache_size;
use offline_core::{CacheStorage, Request, Response};

use super::AgentSettings;
use super::background::Background;
use crate::fetch::Network;

/// Everything a strategy needs, injected by the agent.
#[derive(Clone)]
pub struct Context {
    pub storage: CacheStorage,
    pub network: Arc<dyn Network>,
    pub background: Background,
    pub settings: Arc<AgentSettings>,
}

impl Context {
    /// Store `response` in the runtime cache, then trim it to `limit`.
    ///
    /// Detached: returns immediately; failures are logged and dropped.
    pub fn cache_in_background(&self, request: Request, response: Response, limit: Option<usize>) {
        let storage = self.storage.clone();
        let store_name = self.settings.runtime_name.clone();

        self.background.spawn("runtime-cache-write", async move {
            let store = storage.open_store(&store_name).await?;
            store.put(&request, response).await?;
            if let Some(max_entries) = limit {
                limit_cache_size(&storage, &store_name, max_entries).await?;
            }
            tracing::debug!(url = %request.url(), store = %store_name, "runtime cache updated");
            Ok(())
        });
    }
}
