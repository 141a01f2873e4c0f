//! HTTP wire contract shared by the server and the quoting client
//!
//! Only types and route paths live here; no HTTP framework dependency.

pub mod types;

pub use types::*;

pub const PATH_HEALTH: &str = "/health";
pub const PATH_CALCULATE: &str = "/api/pricing/calculate";
pub const PATH_PARAMETERS: &str = "/api/pricing/parameters";
pub const PATH_MATERIALS: &str = "/api/materials";
pub const PATH_ORDERS: &str = "/api/orders";
pub const PATH_ADMIN_STATS: &str = "/api/admin/stats";

/// Response header carrying the number of skipped parameter updates
pub const SKIPPED_UPDATES_HEADER: &str = "x-skipped-updates";
