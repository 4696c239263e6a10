//! Scripted network and agent builders for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use offline_core::config::AppConfig;
use offline_core::{CacheStorage, Error, Headers, Request, Response};

use crate::agent::{Agent, AgentSettings};
use crate::fetch::Network;

const SCOPE: &str = "https://app.example/";

/// In-memory network: a URL table plus an online switch.
///
/// Unknown URLs answer 404; offline, every fetch fails with
/// `Error::Network`. Every attempt is recorded, online or not.
pub struct ScriptedNetwork {
    routes: Mutex<HashMap<String, (u16, String, String)>>,
    online: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl ScriptedNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { routes: Mutex::new(HashMap::new()), online: AtomicBool::new(true), calls: Mutex::new(Vec::new()) })
    }

    /// Network serving the default precache manifest under the test scope.
    pub fn with_shell() -> Arc<Self> {
        let network = Self::new();
        network.serve("https://app.example/", 200, "text/html", "<h1>home</h1>");
        network.serve("https://app.example/index.html", 200, "text/html", "<h1>index</h1>");
        network.serve("https://app.example/offline.html", 200, "text/html", "<h1>offline</h1>");
        network.serve("https://app.example/icon-256.png", 200, "image/png", "icon-256");
        network.serve("https://app.example/icon-512.png", 200, "image/png", "icon-512");
        network
    }

    pub fn serve(&self, url: &str, status: u16, content_type: &str, body: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), (status, content_type.to_string(), body.to_string()));
    }

    pub fn remove(&self, url: &str) {
        self.routes.lock().unwrap().remove(url);
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl Network for ScriptedNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let mut url = request.url().clone();
        url.set_fragment(None);
        self.calls.lock().unwrap().push(url.to_string());

        if !self.online.load(Ordering::SeqCst) {
            return Err(Error::Network(format!("{url}: offline")));
        }

        let route = self.routes.lock().unwrap().get(url.as_str()).cloned();
        let response = match route {
            Some((status, content_type, body)) => {
                let headers: Headers = [("content-type", content_type)].into_iter().collect();
                Response::new(status, headers, body)
            }
            None => Response::new(404, Headers::new(), "not found"),
        };
        Ok(response.with_url(url))
    }
}

/// Settings for the default config under the test scope.
pub fn settings() -> AgentSettings {
    let config = AppConfig { scope: SCOPE.to_string(), ..Default::default() };
    AgentSettings::from_config(&config).unwrap()
}

/// Fresh agent over in-memory storage.
pub async fn agent_with(network: Arc<ScriptedNetwork>) -> Agent {
    let storage = CacheStorage::open_in_memory().await.unwrap();
    Agent::new(settings(), storage, network)
}

/// Installed and activated agent.
pub async fn activated_agent(network: Arc<ScriptedNetwork>) -> Agent {
    let agent = agent_with(network).await;
    agent.install().await.unwrap();
    agent.activate().await.unwrap();
    agent
}
