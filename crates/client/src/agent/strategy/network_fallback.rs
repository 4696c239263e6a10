//! Network, falling back to any cached copy.

use offline_core::{Error, Request, Response};

use super::Context;

pub async fn handle(ctx: &Context, request: Request) -> Result<Response, Error> {
    match ctx.network.fetch(&request).await {
        Ok(response) => Ok(response),
        Err(network_error) => {
            tracing::debug!(url = %request.url(), error = %network_error, "network failed, trying cache");
            ctx.storage
                .match_request(&request)
                .await?
                .ok_or_else(|| Error::NoResponse(format!("{}: {}", request.url(), network_error)))
        }
    }
}
