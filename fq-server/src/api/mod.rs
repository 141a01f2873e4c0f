//! HTTP API handlers for fq-server

pub mod error;
pub mod health;
pub mod materials;
pub mod orders;
pub mod pricing;
pub mod stats;

pub use error::ApiError;
pub use health::health_routes;
pub use materials::list_materials;
pub use orders::{create_order, get_order, list_orders};
pub use pricing::{calculate_price, get_parameters, update_parameters};
pub use stats::admin_stats;
