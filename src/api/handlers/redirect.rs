//! Handler for the geo-aware redirect.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use crate::api::geo::geo_signal_from_headers;
use crate::config::CounterPolicy;
use crate::domain::click_event::ClickEvent;
use crate::domain::routing;
use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short link to its geo-resolved destination.
///
/// # Endpoint
///
/// `GET /{link_id}`
///
/// # Request Flow
///
/// 1. Parse the geo signal headers
/// 2. Fetch routing configuration (one storage read, no caching)
/// 3. Resolve the destination, first-match-wins
/// 4. Fire-and-forget: live counter increment and click event enqueue
/// 5. Return 302 Found
///
/// # Fast Path Contract
///
/// The response waits only on the routing-configuration read. Neither the
/// enqueue nor the counter update is awaited, and neither can fail the
/// redirect: a dead queue or a saturated counter worker changes nothing for
/// the visitor.
///
/// # Errors
///
/// Returns 404 Not Found if the link doesn't exist (or has no destination
/// configured). Returns 400 Bad Request if a geo header is malformed.
pub async fn redirect_handler(
    Path(link_id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let geo = geo_signal_from_headers(&headers)?;

    let info = state.resolver.get_routing_info(&link_id).await?;

    let destination =
        match routing::resolve(&info.rules, &geo.country, &info.default_destination) {
            Ok(destination) => destination.to_string(),
            Err(e) => {
                // Owner-facing: the link is misconfigured. The visitor gets a 404.
                error!(%link_id, account_id = %info.account_id, error = %e, "link has no destination");
                return Err(AppError::routing(
                    "Link is not configured",
                    json!({ "link_id": link_id }),
                ));
            }
        };

    if state.counter_policy == CounterPolicy::Optimistic {
        state.aggregators.increment_detached(&info.account_id, 1);
    }

    let event = ClickEvent::new(
        link_id,
        info.account_id,
        destination.clone(),
        geo.country,
        geo.latitude,
        geo.longitude,
    );
    state.producer.dispatch(event);

    metrics::counter!("redirects_total").increment(1);

    Ok((StatusCode::FOUND, [(header::LOCATION, destination)]).into_response())
}
