//! Admin dashboard statistics

use axum::{extract::State, Json};
use fq_common::api::AdminStats;
use fq_common::db;

use super::ApiError;
use crate::AppState;

/// GET /api/admin/stats
pub async fn admin_stats(State(state): State<AppState>) -> Result<Json<AdminStats>, ApiError> {
    Ok(Json(db::order_stats(&state.db).await?))
}
