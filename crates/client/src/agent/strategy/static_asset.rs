//! Cache first; on a miss, fetch and refresh the bounded runtime store.

use offline_core::{Destination, Error, Request, Response};

use super::Context;

pub async fn handle(ctx: &Context, request: Request) -> Result<Response, Error> {
    if let Some(cached) = ctx.storage.match_request(&request).await? {
        tracing::debug!(url = %request.url(), "asset cache hit");
        return Ok(cached);
    }

    let network_error = match ctx.network.fetch(&request).await {
        Ok(response) => {
            let (returned, cached) = response.tee();
            ctx.cache_in_background(request, cached, Some(ctx.settings.asset_cache_limit));
            return Ok(returned);
        }
        Err(e) => e,
    };

    tracing::debug!(url = %request.url(), error = %network_error, "asset unavailable");

    if request.destination() != Destination::Image {
        return Err(Error::NoResponse(format!("{}: {}", request.url(), network_error)));
    }

    let icon = Request::get(ctx.settings.image_fallback.clone());
    ctx.storage.match_request(&icon).await?.ok_or_else(|| {
        Error::NoResponse(format!("{}: {} and no fallback image cached", request.url(), network_error))
    })
}
