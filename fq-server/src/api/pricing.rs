//! Quote calculation and pricing parameter administration

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    Json,
};
use fq_common::api::{CalculateRequest, CalculateResponse, UpdateParametersRequest, SKIPPED_UPDATES_HEADER};
use fq_common::params::{apply_updates, group_by_category, GroupedParameters, ParameterStore};
use fq_common::{db, pricing, Error};
use tracing::info;

use super::ApiError;
use crate::AppState;

/// POST /api/pricing/calculate
///
/// Authoritative quote: live parameter snapshot, thickness from the database.
pub async fn calculate_price(
    State(state): State<AppState>,
    payload: Result<Json<CalculateRequest>, JsonRejection>,
) -> Result<Json<CalculateResponse>, ApiError> {
    let Json(request) = payload?;
    let config = request.configuration();
    config.validate()?;

    let thickness = db::find_thickness(&state.db, &config.material_id, &config.thickness_label)
        .await?
        .ok_or_else(|| {
            Error::NotFound("Thickness not found for the given material and label".to_string())
        })?;

    // Captured once; concurrent admin writes only affect later requests
    let snapshot = state.params.snapshot().await?;
    let breakdown = pricing::compute_price(&thickness, &config, Some(&snapshot))?;

    Ok(Json(CalculateResponse::new(config.quantity, breakdown)))
}

/// GET /api/pricing/parameters
pub async fn get_parameters(
    State(state): State<AppState>,
) -> Result<Json<GroupedParameters>, ApiError> {
    let rows = state.params.load_all().await?;
    Ok(Json(group_by_category(&rows)))
}

/// PUT /api/pricing/parameters
///
/// Best-effort per item. Skipped items are counted in the
/// `X-Skipped-Updates` header; the body is the post-update grouped set.
pub async fn update_parameters(
    State(state): State<AppState>,
    payload: Result<Json<UpdateParametersRequest>, JsonRejection>,
) -> Result<(HeaderMap, Json<GroupedParameters>), ApiError> {
    let Json(request) = payload?;

    let outcome = apply_updates(&state.params, &request.updates, state.bounds_policy).await?;
    info!(
        requested = request.updates.len(),
        applied = outcome.applied,
        skipped = outcome.skipped.len(),
        "Pricing parameters updated"
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static(SKIPPED_UPDATES_HEADER),
        HeaderValue::from(outcome.skipped.len()),
    );

    Ok((headers, Json(outcome.grouped())))
}
