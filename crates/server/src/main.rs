//! offline-agent server entry point.
//!
//! Boots the caching agent and serves it as an MCP server on stdio.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use offline_client::{Agent, AgentSettings, FetchConfig, HttpNetwork};
use offline_core::CacheStorage;
use offline_core::config::AppConfig;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("loading configuration")?;
    tracing::info!(
        scope = %config.scope,
        version = %config.cache_version,
        db = %config.db_path.display(),
        "starting offline-agent on stdio transport"
    );

    let storage = CacheStorage::open(&config.db_path).await?;
    let network = Arc::new(HttpNetwork::new(FetchConfig::from(&config))?);
    let settings = AgentSettings::from_config(&config)?;
    let agent = Arc::new(Agent::new(settings, storage, network));

    bootstrap(&agent).await;

    let handler = handler::OfflineAgentServer::new(agent.clone());
    let server = serve_server(handler, stdio()).await?;
    server.waiting().await?;

    agent.settle().await;
    agent.storage().clone().close().await?;
    Ok(())
}

/// Install then activate once. Failures are logged; the tools can retry.
async fn bootstrap(agent: &Agent) {
    if let Err(e) = agent.install().await {
        tracing::error!(error = %e, "install failed at startup");
        return;
    }
    if let Err(e) = agent.activate().await {
        tracing::error!(error = %e, "activation failed at startup");
    }
}
