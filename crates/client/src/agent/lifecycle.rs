//! Install and activation.
//!
//! Install precaches the manifest into the versioned precache store;
//! activation deletes every store left over from other versions and takes
//! control of open clients. Transitions are serialized; fetch handling
//! reads the state without waiting on them.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use futures_util::future::try_join_all;
use offline_core::{Error, Request};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::strategy::Context;

/// Where the agent is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AgentState::Parsed => "parsed",
            AgentState::Installing => "installing",
            AgentState::Installed => "installed",
            AgentState::Activating => "activating",
            AgentState::Activated => "activated",
        };
        f.write_str(s)
    }
}

/// Outcome of a successful install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallReport {
    /// Precache store that was populated.
    pub store: String,
    /// Number of entries written.
    pub entries: usize,
}

/// Outcome of a successful activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivateReport {
    /// Stores deleted as belonging to other versions.
    pub deleted: Vec<String>,
    /// Stores left in place.
    pub kept: Vec<String>,
}

pub(crate) struct Lifecycle {
    state: RwLock<AgentState>,
    transition: Mutex<()>,
    skip_waiting: AtomicBool,
    clients_claimed: AtomicBool,
}

impl Lifecycle {
    pub(crate) fn new() -> Self {
        Self {
            state: RwLock::new(AgentState::Parsed),
            transition: Mutex::new(()),
            skip_waiting: AtomicBool::new(false),
            clients_claimed: AtomicBool::new(false),
        }
    }

    pub(crate) fn state(&self) -> AgentState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: AgentState) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = state;
    }

    pub(crate) fn skip_waiting(&self) -> bool {
        self.skip_waiting.load(Ordering::SeqCst)
    }

    pub(crate) fn clients_claimed(&self) -> bool {
        self.clients_claimed.load(Ordering::SeqCst)
    }

    /// Precache every manifest entry, all or nothing.
    ///
    /// On failure the agent goes back to `parsed` so install can be retried.
    pub(crate) async fn install(&self, ctx: &Context) -> Result<InstallReport, Error> {
        let _guard = self.transition.lock().await;
        let state = self.state();
        if state != AgentState::Parsed {
            return Err(Error::InvalidState(format!("cannot install while {state}")));
        }

        self.set_state(AgentState::Installing);
        self.skip_waiting.store(true, Ordering::SeqCst);
        tracing::info!(
            store = %ctx.settings.precache_name,
            entries = ctx.settings.precache_urls.len(),
            "installing"
        );

        match precache(ctx).await {
            Ok(report) => {
                self.set_state(AgentState::Installed);
                tracing::info!(store = %report.store, entries = report.entries, "installed");
                Ok(report)
            }
            Err(e) => {
                self.set_state(AgentState::Parsed);
                tracing::warn!(error = %e, "install failed");
                Err(e)
            }
        }
    }

    /// Delete stale stores and claim clients.
    ///
    /// Re-running with the same version deletes nothing.
    pub(crate) async fn activate(&self, ctx: &Context) -> Result<ActivateReport, Error> {
        let _guard = self.transition.lock().await;
        let previous = self.state();
        if !matches!(previous, AgentState::Installed | AgentState::Activated) {
            return Err(Error::InvalidState(format!("cannot activate while {previous}")));
        }

        self.set_state(AgentState::Activating);

        match delete_stale_stores(ctx).await {
            Ok(report) => {
                self.clients_claimed.store(true, Ordering::SeqCst);
                self.set_state(AgentState::Activated);
                tracing::info!(deleted = ?report.deleted, kept = ?report.kept, "activated");
                Ok(report)
            }
            Err(e) => {
                self.set_state(previous);
                tracing::warn!(error = %e, "activation failed");
                Err(e)
            }
        }
    }
}

async fn precache(ctx: &Context) -> Result<InstallReport, Error> {
    let store = ctx.storage.open_store(&ctx.settings.precache_name).await?;

    let fetches = ctx.settings.precache_urls.iter().map(|url| async move {
        let request = Request::get(url.clone());
        let response = ctx
            .network
            .fetch(&request)
            .await
            .map_err(|e| Error::InstallFailed(format!("{url}: {e}")))?;
        if !response.ok() {
            return Err(Error::InstallFailed(format!("{url}: status {}", response.status())));
        }
        Ok::<_, Error>((request, response))
    });
    let entries = try_join_all(fetches).await?;
    let count = entries.len();

    store
        .put_all(entries)
        .await
        .map_err(|e| Error::InstallFailed(e.to_string()))?;

    Ok(InstallReport { store: store.name().to_string(), entries: count })
}

async fn delete_stale_stores(ctx: &Context) -> Result<ActivateReport, Error> {
    let keep = [ctx.settings.precache_name.as_str(), ctx.settings.runtime_name.as_str()];
    let (kept, stale): (Vec<String>, Vec<String>) = ctx
        .storage
        .store_names()
        .await?
        .into_iter()
        .partition(|name| keep.contains(&name.as_str()));

    try_join_all(stale.iter().map(|name| ctx.storage.delete_store(name))).await?;

    Ok(ActivateReport { deleted: stale, kept })
}
