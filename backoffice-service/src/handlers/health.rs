use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;
use service_core::error::AppError;

use crate::services::metrics::get_metrics;
use crate::startup::AppState;

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Readiness gates on the record store; a service that cannot reach its
/// store should not receive traffic.
pub async fn readiness(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    state.store.health_check().await.map_err(|e| {
        tracing::warn!(error = %e, "Readiness check failed");
        AppError::ServiceUnavailable
    })?;
    Ok(Json(json!({ "status": "ready" })))
}

pub async fn metrics() -> impl IntoResponse {
    get_metrics()
}
