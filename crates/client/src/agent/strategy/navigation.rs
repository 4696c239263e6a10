//! Network first, then any cached copy, then the offline document.

use offline_core::{Error, Request, Response};

use super::Context;

pub async fn handle(ctx: &Context, request: Request) -> Result<Response, Error> {
    let network_error = match ctx.network.fetch(&request).await {
        Ok(response) => {
            let (returned, cached) = response.tee();
            ctx.cache_in_background(request, cached, ctx.settings.navigation_cache_limit);
            return Ok(returned);
        }
        Err(e) => e,
    };

    tracing::debug!(url = %request.url(), error = %network_error, "navigation offline, trying cache");

    if let Some(cached) = ctx.storage.match_request(&request).await? {
        return Ok(cached);
    }

    let offline = Request::get(ctx.settings.offline_fallback.clone());
    match ctx.storage.match_request(&offline).await? {
        Some(document) => {
            tracing::debug!(url = %request.url(), "serving offline document");
            Ok(document)
        }
        None => Err(Error::NoResponse(format!(
            "{}: {} and no offline document cached",
            request.url(),
            network_error
        ))),
    }
}
