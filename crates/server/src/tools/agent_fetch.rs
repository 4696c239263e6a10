//! agent_fetch tool implementation.
//!
//! Builds a request from the tool parameters and delivers it to the agent
//! as a fetch event. When the agent does not intercept, the request goes
//! to the network unchanged.

use offline_client::fetch::resolve;
use offline_client::{Agent, FetchOutcome, Network};
use offline_core::{Destination, Error, Request, RequestMode};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Parameters for the agent_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AgentFetchParams {
    /// Absolute URL, or a path resolved against the agent scope.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Accept header value, e.g. "text/html".
    pub accept: Option<String>,

    /// Request mode (default: cors).
    pub mode: Option<RequestMode>,

    /// Resource type of the target (default: other).
    pub destination: Option<Destination>,
}

fn default_method() -> String {
    "GET".to_string()
}

/// Output from the agent_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AgentFetchOutput {
    /// Request URL after resolution.
    pub url: String,

    /// Route the agent chose ("passthrough" when not intercepted).
    pub route: String,

    /// Whether the agent answered the request.
    pub intercepted: bool,

    /// HTTP status code.
    pub status: u16,

    /// Content-Type header, if present.
    pub content_type: Option<String>,

    /// Response headers in order.
    pub headers: Vec<(String, String)>,

    /// Body decoded as UTF-8, lossily.
    pub body: String,
}

impl AgentFetchParams {
    fn into_request(self, agent: &Agent) -> Result<Request, Error> {
        let method = self.method.trim().to_ascii_uppercase();
        if method.is_empty() {
            return Err(Error::InvalidInput("method must not be empty".into()));
        }

        let url = resolve(&agent.settings().scope, &self.url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let mut request = Request::new(&method, url);

        if let Some(accept) = self.accept {
            request = request.with_header("accept", accept);
        }
        if let Some(mode) = self.mode {
            request = request.with_mode(mode);
        }
        if let Some(destination) = self.destination {
            request = request.with_destination(destination);
        }

        Ok(request)
    }
}

/// Implementation of the agent_fetch tool.
pub async fn fetch_impl(agent: &Agent, params: AgentFetchParams) -> Result<CallToolResult, McpError> {
    let request = params.into_request(agent)?;
    let url = request.url().to_string();

    let (route, intercepted, response) = match agent.handle_fetch(request).await? {
        FetchOutcome::Respond { route, response } => (route.to_string(), true, response),
        FetchOutcome::Passthrough(request) => {
            let response = agent.network().fetch(&request).await?;
            ("passthrough".to_string(), false, response)
        }
    };

    let content_type = response.content_type().map(str::to_string);
    let (status, headers, _, body) = response.into_parts();
    let output = AgentFetchOutput {
        url,
        route,
        intercepted,
        status,
        content_type,
        headers: headers.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        body: String::from_utf8_lossy(&body).into_owned(),
    };

    json_result(&output)
}
