//! Order creation and lookup

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use fq_common::api::OrderListQuery;
use fq_common::order::{price_order, OrderDraft, OrderRecord, OrderStatus, OrderWithItems};
use fq_common::{db, Error};

use super::ApiError;
use crate::AppState;

/// POST /api/orders
///
/// Every item is re-priced here against the live snapshot; client-supplied
/// prices are only compared, never stored.
pub async fn create_order(
    State(state): State<AppState>,
    payload: Result<Json<OrderDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderWithItems>), ApiError> {
    let Json(draft) = payload?;

    let catalog = db::load_catalog(&state.db).await?;
    let snapshot = state.params.snapshot().await?;
    let order = price_order(&catalog, draft, &snapshot)?;
    let created = db::insert_order(&state.db, &order).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/orders?status=
pub async fn list_orders(
    State(state): State<AppState>,
    query: Result<Query<OrderListQuery>, QueryRejection>,
) -> Result<Json<Vec<OrderRecord>>, ApiError> {
    let Query(query) = query?;
    let status = match query.status.as_deref() {
        None | Some("") => None,
        Some(s) => Some(OrderStatus::parse(s).ok_or_else(|| {
            let valid: Vec<&str> = OrderStatus::ALL.iter().map(|st| st.as_str()).collect();
            Error::Validation(format!(
                "Invalid status. Must be one of: {}",
                valid.join(", ")
            ))
        })?),
    };

    Ok(Json(db::list_orders(&state.db, status).await?))
}

/// GET /api/orders/:id
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OrderWithItems>, ApiError> {
    db::get_order(&state.db, &id)
        .await?
        .map(Json)
        .ok_or_else(|| Error::NotFound("Order not found".to_string()).into())
}
