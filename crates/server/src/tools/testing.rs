//! Agent fixtures for tool tests.

use std::collections::HashMap;

use async_trait::async_trait;
use offline_client::{Agent, AgentSettings, Network};
use offline_core::config::AppConfig;
use offline_core::{CacheStorage, Error, Headers, Request, Response};
use rmcp::model::CallToolResult;
use serde::de::DeserializeOwned;

/// Network answering from a fixed table; anything else is unreachable.
pub(crate) struct TableNetwork(HashMap<String, (&'static str, &'static str)>);

#[async_trait]
impl Network for TableNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        match self.0.get(request.url().as_str()) {
            Some((content_type, body)) => {
                let headers: Headers = [("content-type", *content_type)].into_iter().collect();
                Ok(Response::new(200, headers, *body).with_url(request.url().clone()))
            }
            None => Err(Error::Network(format!("{}: unreachable", request.url()))),
        }
    }
}

/// Agent over in-memory storage whose network serves the app shell and
/// `/api/ping`.
pub(crate) async fn agent() -> Agent {
    let table = [
        ("https://app.example/", ("text/html", "<h1>home</h1>")),
        ("https://app.example/index.html", ("text/html", "<h1>index</h1>")),
        ("https://app.example/offline.html", ("text/html", "<h1>offline</h1>")),
        ("https://app.example/icon-256.png", ("image/png", "icon-256")),
        ("https://app.example/icon-512.png", ("image/png", "icon-512")),
        ("https://app.example/api/ping", ("application/json", "{\"pong\":true}")),
    ]
    .into_iter()
    .map(|(url, entry)| (url.to_string(), entry))
    .collect();

    let config = AppConfig { scope: "https://app.example/".into(), ..Default::default() };
    let settings = AgentSettings::from_config(&config).unwrap();
    let storage = CacheStorage::open_in_memory().await.unwrap();
    Agent::new(settings, storage, std::sync::Arc::new(TableNetwork(table)))
}

/// Installed and activated variant of [`agent`].
pub(crate) async fn activated_agent() -> Agent {
    let agent = agent().await;
    agent.install().await.unwrap();
    agent.activate().await.unwrap();
    agent
}

/// Decode the JSON text content of a tool result.
pub(crate) fn output<T: DeserializeOwned>(result: &CallToolResult) -> T {
    let content = serde_json::to_value(&result.content[0]).unwrap();
    let text = content
        .get("text")
        .and_then(|v| v.as_str())
        .expect("Expected text field in content");
    serde_json::from_str(text).unwrap()
}
