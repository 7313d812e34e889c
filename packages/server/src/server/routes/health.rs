use axum::{extract::Extension, Json};
use serde::Serialize;

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    upstream: UpstreamHealth,
}

#[derive(Serialize)]
pub struct UpstreamHealth {
    provider: String,
    base_url: String,
}

/// Health check endpoint.
///
/// The connector holds no state of its own, so this only confirms the
/// process is up and reports which upstream it is configured against.
/// No upstream call is made; a probe must not burn API quota.
pub async fn health_handler(Extension(state): Extension<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        upstream: UpstreamHealth {
            provider: "firecrawl".to_string(),
            base_url: state.firecrawl.base_url().to_string(),
        },
    })
}
