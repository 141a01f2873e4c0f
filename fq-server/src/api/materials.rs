//! Material catalog listing

use axum::{extract::State, Json};
use fq_common::api::MaterialListing;
use fq_common::db;

use super::ApiError;
use crate::AppState;

/// GET /api/materials
///
/// Active materials by `sort_order`, each with its active thicknesses.
pub async fn list_materials(
    State(state): State<AppState>,
) -> Result<Json<Vec<MaterialListing>>, ApiError> {
    Ok(Json(db::list_materials(&state.db).await?))
}
