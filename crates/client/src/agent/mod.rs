//! The caching agent.
//!
//! ### Lifecycle
//! - `install`: precache the manifest into the versioned precache store.
//! - `activate`: delete stores from other versions, claim clients.
//!
//! ### Fetch handling
//! - Only an activated agent intercepts requests.
//! - Each request is routed ([`router::route`]) to exactly one strategy.
//! - Runtime-cache writes run detached on a [`Background`] set.

pub mod background;
pub mod lifecycle;
pub mod router;
pub mod strategy;

use std::sync::Arc;

use offline_core::config::AppConfig;
use offline_core::{CacheStorage, Error, Request, Response};
use url::Url;

pub use background::Background;
pub use lifecycle::{ActivateReport, AgentState, InstallReport};
pub use router::{Route, route};

use crate::fetch::{Network, resolve};
use lifecycle::Lifecycle;
use strategy::Context;

/// Resolved agent settings: store names and absolute URLs.
#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub scope: Url,
    pub precache_name: String,
    pub runtime_name: String,
    pub precache_urls: Vec<Url>,
    pub offline_fallback: Url,
    pub image_fallback: Url,
    pub asset_cache_limit: usize,
    pub navigation_cache_limit: Option<usize>,
}

impl AgentSettings {
    /// Resolve every configured path against the scope.
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let scope = Url::parse(&config.scope).map_err(|e| Error::InvalidUrl(format!("scope: {e}")))?;
        let resolve_path = |path: &str| resolve(&scope, path).map_err(|e| Error::InvalidUrl(format!("{path}: {e}")));

        let precache_urls = config
            .precache_urls
            .iter()
            .map(|path| resolve_path(path))
            .collect::<Result<Vec<_>, _>>()?;
        let offline_fallback = resolve_path(&config.offline_fallback)?;
        let image_fallback = resolve_path(&config.image_fallback)?;

        Ok(Self {
            scope,
            precache_name: config.precache_name(),
            runtime_name: config.runtime_name(),
            precache_urls,
            offline_fallback,
            image_fallback,
            asset_cache_limit: config.asset_cache_limit,
            navigation_cache_limit: config.navigation_cache_limit,
        })
    }
}

/// What the agent did with a fetch event.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Not intercepted; the host applies default network handling.
    Passthrough(Request),
    /// Intercepted and answered.
    Respond { route: Route, response: Response },
}

/// The caching agent.
pub struct Agent {
    ctx: Context,
    lifecycle: Lifecycle,
}

impl Agent {
    pub fn new(settings: AgentSettings, storage: CacheStorage, network: Arc<dyn Network>) -> Self {
        let ctx = Context { storage, network, background: Background::new(), settings: Arc::new(settings) };
        Self { ctx, lifecycle: Lifecycle::new() }
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.ctx.settings
    }

    pub fn storage(&self) -> &CacheStorage {
        &self.ctx.storage
    }

    pub fn network(&self) -> &Arc<dyn Network> {
        &self.ctx.network
    }

    pub fn background(&self) -> &Background {
        &self.ctx.background
    }

    pub fn state(&self) -> AgentState {
        self.lifecycle.state()
    }

    /// Whether install asked to activate without waiting for older clients.
    pub fn skip_waiting(&self) -> bool {
        self.lifecycle.skip_waiting()
    }

    /// Whether activation took control of already-open clients.
    pub fn clients_claimed(&self) -> bool {
        self.lifecycle.clients_claimed()
    }

    pub async fn install(&self) -> Result<InstallReport, Error> {
        self.lifecycle.install(&self.ctx).await
    }

    pub async fn activate(&self) -> Result<ActivateReport, Error> {
        self.lifecycle.activate(&self.ctx).await
    }

    /// Handle one fetch event.
    ///
    /// Returns `Err(Error::NoResponse)` when the chosen strategy ran out of
    /// fallbacks; the request fails.
    pub async fn handle_fetch(&self, request: Request) -> Result<FetchOutcome, Error> {
        let state = self.state();
        if state != AgentState::Activated {
            tracing::debug!(url = %request.url(), %state, "not controlling, passing through");
            return Ok(FetchOutcome::Passthrough(request));
        }

        let route = route(&request);
        tracing::debug!(method = request.method(), url = %request.url(), %route, "routing fetch");

        let response = match route {
            Route::Passthrough => return Ok(FetchOutcome::Passthrough(request)),
            Route::Navigation => strategy::navigation::handle(&self.ctx, request).await?,
            Route::StaticAsset => strategy::static_asset::handle(&self.ctx, request).await?,
            Route::NetworkFallback => strategy::network_fallback::handle(&self.ctx, request).await?,
        };

        Ok(FetchOutcome::Respond { route, response })
    }

    /// Wait for every pending background cache write.
    pub async fn settle(&self) {
        self.ctx.background.settle().await;
    }
}
