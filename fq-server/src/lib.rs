//! fq-server library - authoritative pricing service
//!
//! HTTP surface over the shared pricing engine: quotes, parameter
//! administration, materials, orders and dashboard stats.

use axum::Router;
use fq_common::db::SqliteParameterStore;
use fq_common::params::BoundsPolicy;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Parameter store over the same pool
    pub params: SqliteParameterStore,
    /// Range checking applied to admin parameter writes
    pub bounds_policy: BoundsPolicy,
}

impl AppState {
    pub fn new(db: SqlitePool, bounds_policy: BoundsPolicy) -> Self {
        Self {
            params: SqliteParameterStore::new(db.clone()),
            db,
            bounds_policy,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};
    use fq_common::api as paths;

    let api = Router::new()
        .route(paths::PATH_CALCULATE, post(api::calculate_price))
        .route(
            paths::PATH_PARAMETERS,
            get(api::get_parameters).put(api::update_parameters),
        )
        .route(paths::PATH_MATERIALS, get(api::list_materials))
        .route(
            paths::PATH_ORDERS,
            get(api::list_orders).post(api::create_order),
        )
        .route("/api/orders/:id", get(api::get_order))
        .route(paths::PATH_ADMIN_STATS, get(api::admin_stats));

    Router::new()
        .merge(api)
        .merge(api::health_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
