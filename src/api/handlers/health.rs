//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
    checks: HealthChecks,
}

#[derive(Serialize)]
struct HealthChecks {
    database: CheckStatus,
    aggregator: CheckStatus,
}

#[derive(Serialize)]
struct CheckStatus {
    status: String,
    message: Option<String>,
}

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /healthz`
///
/// # Response Codes
///
/// - **200 OK**: all components healthy
/// - **503 Service Unavailable**: one or more components degraded
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let db_check = check_database(&state).await;
    let aggregator_check = CheckStatus {
        status: "ok".to_string(),
        message: Some(format!("Active workers: {}", state.aggregators.len())),
    };

    let all_healthy = db_check.status == "ok";

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            database: db_check,
            aggregator: aggregator_check,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

/// Probes storage with a lookup of an id that is allowed to be absent.
async fn check_database(state: &AppState) -> CheckStatus {
    match state.resolver.get_routing_info("health-probe").await {
        Ok(_) | Err(AppError::NotFound { .. }) => CheckStatus {
            status: "ok".to_string(),
            message: Some("Connected".to_string()),
        },
        Err(e) => CheckStatus {
            status: "error".to_string(),
            message: Some(format!("Storage error: {}", e)),
        },
    }
}
