//! # fabquote common library
//!
//! Shared code for the quoting server and the quoting client:
//! - Pricing engine (one implementation, compiled into both sides)
//! - Pricing parameters, snapshots and the bulk update protocol
//! - Material catalog and service add-ons
//! - Cart and order drafting
//! - HTTP wire types
//! - Configuration loading
//! - SQLite storage adapters (`sqlx` feature)

pub mod api;
pub mod cart;
pub mod catalog;
pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod order;
pub mod params;
pub mod pricing;
pub mod services;

pub use error::{Error, Result};
pub use params::{ParameterSnapshot, PricingParameter};
pub use pricing::{compute_price, PartConfiguration, PriceBreakdown};
