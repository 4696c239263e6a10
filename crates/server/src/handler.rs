//! MCP server handler implementation.
//!
//! This module defines the main server handler that delivers lifecycle and
//! fetch events to the agent and exposes its cache stores.
use std::sync::Arc;

use crate::tools::agent_fetch::{AgentFetchParams, fetch_impl};
use crate::tools::cache::{CacheListParams, CacheTrimParams, list_impl, trim_impl};
use crate::tools::lifecycle::{activate_impl, install_impl};

use offline_client::Agent;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for offline-agent.
#[derive(Clone)]
pub struct OfflineAgentServer {
    agent: Arc<Agent>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
#[tool_router]
impl OfflineAgentServer {
    /// Create a new server handler around a shared agent.
    pub fn new(agent: Arc<Agent>) -> Self {
        Self { agent, tool_router: Self::tool_router() }
    }

    #[tool(description = "Run the install step: precache the app shell into the versioned precache store.")]
    async fn agent_install(&self) -> Result<CallToolResult, McpError> {
        install_impl(&self.agent).await
    }

    #[tool(description = "Run the activate step: delete cache stores from other versions and claim clients.")]
    async fn agent_activate(&self) -> Result<CallToolResult, McpError> {
        activate_impl(&self.agent).await
    }

    /// Dispatch a fetch event.
    ///
    /// Requests the agent does not intercept are sent straight to the network.
    #[tool(
        description = "Dispatch a fetch event through the agent. Returns the route taken, whether it was intercepted, and the response."
    )]
    async fn agent_fetch(&self, params: Parameters<AgentFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.agent, params.0).await
    }

    #[tool(description = "List cache store names, or the keys of one store in insertion order.")]
    async fn cache_list(&self, params: Parameters<CacheListParams>) -> Result<CallToolResult, McpError> {
        list_impl(self.agent.storage(), params.0).await
    }

    #[tool(description = "Trim a cache store to at most max_entries, deleting the oldest entries first.")]
    async fn cache_trim(&self, params: Parameters<CacheTrimParams>) -> Result<CallToolResult, McpError> {
        trim_impl(self.agent.storage(), params.0).await
    }
}

impl ServerHandler for OfflineAgentServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "offline-agent".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lists_every_tool() {
        let agent = crate::tools::testing::agent().await;
        let server = OfflineAgentServer::new(Arc::new(agent));

        let mut names: Vec<String> = server.tool_router.list_all().into_iter().map(|t| t.name.to_string()).collect();
        names.sort();
        assert_eq!(names, vec!["agent_activate", "agent_fetch", "agent_install", "cache_list", "cache_trim"]);
    }

    #[tokio::test]
    async fn test_server_info() {
        let agent = crate::tools::testing::agent().await;
        let info = OfflineAgentServer::new(Arc::new(agent)).get_info();
        assert_eq!(info.server_info.name, "offline-agent");
        assert!(info.capabilities.tools.is_some());
    }
}
