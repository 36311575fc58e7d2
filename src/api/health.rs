//! Liveness and readiness checks

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, AppState};

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Storage backend in use, reported by the readiness check
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
}

impl HealthResponse {
    fn new(status: &str, backend: Option<&str>) -> Self {
        Self {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            backend: backend.map(str::to_string),
        }
    }
}

/// Liveness: the process is up and serving
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Process is up", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::new("healthy", None))
}

/// Readiness: storage answers a trivial query
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    responses(
        (status = 200, description = "Storage reachable", body = HealthResponse),
        (status = 500, description = "Storage unreachable", body = crate::error::ErrorResponse)
    )
)]
pub async fn readiness_check(State(state): State<AppState>) -> AppResult<Json<HealthResponse>> {
    state.services.ping().await?;

    let backend = state.config.database.backend.as_str();
    Ok(Json(HealthResponse::new("ready", Some(backend))))
}
