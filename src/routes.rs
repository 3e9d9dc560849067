//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET /{link_id}`                  - Geo-aware redirect (public)
//! - `GET /click-stream/{account_id}`  - Live click counter WebSocket
//! - `GET /healthz`                    - Health check: storage, aggregator
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Path normalization** - Trailing slash handling

use crate::api::handlers::{click_stream_handler, health_handler, redirect_handler};
use crate::api::middleware::tracing;
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// The click-stream route is registered before the catch-all redirect route
/// so `/click-stream/{account_id}` is never treated as a link id.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let router = Router::new()
        .route("/healthz", get(health_handler))
        .route("/click-stream/{account_id}", get(click_stream_handler))
        .route("/{link_id}", get(redirect_handler))
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
