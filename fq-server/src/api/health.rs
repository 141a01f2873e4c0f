//! Health check endpoint

use axum::{routing::get, Json, Router};
use fq_common::api::{HealthResponse, PATH_HEALTH};

use crate::AppState;

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "fq-server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route(PATH_HEALTH, get(health_check))
}
