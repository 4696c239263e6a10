//! agent_install and agent_activate tool implementations.

use offline_client::{ActivateReport, Agent, InstallReport};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Output from the agent_install tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InstallOutput {
    /// Precache store that was populated.
    pub store: String,

    /// Number of precached entries.
    pub entries: usize,

    /// Agent state after the call.
    pub state: String,
}

/// Output from the agent_activate tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ActivateOutput {
    /// Stores deleted as belonging to other versions.
    pub deleted: Vec<String>,

    /// Stores left in place.
    pub kept: Vec<String>,

    /// Whether open clients are now controlled.
    pub clients_claimed: bool,

    /// Agent state after the call.
    pub state: String,
}

/// Implementation of the agent_install tool.
pub async fn install_impl(agent: &Agent) -> Result<CallToolResult, McpError> {
    let InstallReport { store, entries } = agent.install().await?;
    json_result(&InstallOutput { store, entries, state: agent.state().to_string() })
}

/// Implementation of the agent_activate tool.
pub async fn activate_impl(agent: &Agent) -> Result<CallToolResult, McpError> {
    let ActivateReport { deleted, kept } = agent.activate().await?;
    json_result(&ActivateOutput {
        deleted,
        kept,
        clients_claimed: agent.clients_claimed(),
        state: agent.state().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{agent, output};

    #[tokio::test]
    async fn test_install_then_activate() {
        let agent = agent().await;
        agent.storage().open_store("pwa-cache-v0").await.unwrap();

        let result = install_impl(&agent).await.unwrap();
        let installed: InstallOutput = output(&result);
        assert_eq!(installed.store, "pwa-cache-v1");
        assert_eq!(installed.entries, 5);
        assert_eq!(installed.state, "installed");

        let result = activate_impl(&agent).await.unwrap();
        let activated: ActivateOutput = output(&result);
        assert_eq!(activated.deleted, vec!["pwa-cache-v0"]);
        assert_eq!(activated.kept, vec!["pwa-cache-v1"]);
        assert!(activated.clients_claimed);
        assert_eq!(activated.state, "activated");
    }

    #[tokio::test]
    async fn test_activate_before_install_errors() {
        let agent = agent().await;
        let err = activate_impl(&agent).await.unwrap_err();
        assert_eq!(err.code.0, -32021);
    }
}
