//! SQLite storage adapters

pub mod catalog;
pub mod init;
pub mod orders;
pub mod parameters;

pub use catalog::{count_active_materials, find_thickness, list_materials, load_catalog};
pub use init::{create_schema, init_database, seed_catalog, seed_parameters};
pub use orders::{get_order, insert_order, list_orders, order_stats, RECENT_ORDERS_LIMIT};
pub use parameters::SqliteParameterStore;
