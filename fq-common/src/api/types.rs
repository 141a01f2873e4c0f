//! Request/response bodies

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::{Material, MaterialCategory, Thickness};
use crate::order::OrderRecord;
use crate::params::ParameterUpdate;
use crate::pricing::{PartConfiguration, PriceBreakdown};

/// Body of `POST /api/pricing/calculate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRequest {
    pub material_id: String,
    pub thickness_label: String,
    pub width: f64,
    pub height: f64,
    pub quantity: u32,
    #[serde(default)]
    pub services: Vec<String>,
}

impl CalculateRequest {
    pub fn configuration(&self) -> PartConfiguration {
        PartConfiguration {
            material_id: self.material_id.clone(),
            thickness_label: self.thickness_label.clone(),
            width_inches: self.width,
            height_inches: self.height,
            quantity: self.quantity,
            services: self.services.iter().cloned().collect(),
        }
    }
}

impl From<&PartConfiguration> for CalculateRequest {
    fn from(c: &PartConfiguration) -> Self {
        Self {
            material_id: c.material_id.clone(),
            thickness_label: c.thickness_label.clone(),
            width: c.width_inches,
            height: c.height_inches,
            quantity: c.quantity,
            services: c.services.iter().cloned().collect(),
        }
    }
}

/// Response of `POST /api/pricing/calculate`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateResponse {
    pub unit_price: f64,
    pub quantity: u32,
    pub discount: f64,
    pub setup_fee: f64,
    pub subtotal: f64,
}

impl CalculateResponse {
    pub fn new(quantity: u32, b: PriceBreakdown) -> Self {
        Self {
            unit_price: b.unit_price,
            quantity,
            discount: b.discount_fraction,
            setup_fee: b.setup_fee,
            subtotal: b.subtotal,
        }
    }

    pub fn breakdown(&self) -> PriceBreakdown {
        PriceBreakdown {
            unit_price: self.unit_price,
            discount_fraction: self.discount,
            setup_fee: self.setup_fee,
            subtotal: self.subtotal,
        }
    }
}

/// Body of `PUT /api/pricing/parameters`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateParametersRequest {
    #[serde(default)]
    pub updates: Vec<ParameterUpdate>,
}

/// Error body for every non-2xx response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}

/// Material as listed by `GET /api/materials`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialListing {
    pub id: String,
    pub name: String,
    pub category: MaterialCategory,
    pub description: String,
    pub color: String,
    pub sort_order: i64,
    pub active: bool,
    pub thicknesses: Vec<ThicknessListing>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThicknessListing {
    pub id: i64,
    pub material_id: String,
    pub label: String,
    pub inches: f64,
    pub base_price_per_sq_in: f64,
    pub sort_order: i64,
    pub active: bool,
}

impl From<MaterialListing> for Material {
    fn from(m: MaterialListing) -> Self {
        Material {
            id: m.id,
            name: m.name,
            category: m.category,
            description: m.description,
            color: m.color,
            thicknesses: m
                .thicknesses
                .into_iter()
                .map(|t| Thickness {
                    label: t.label,
                    inches: t.inches,
                    base_price_per_sq_in: t.base_price_per_sq_in,
                })
                .collect(),
        }
    }
}

/// Response of `GET /api/admin/stats`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_orders: i64,
    pub orders_by_status: BTreeMap<String, i64>,
    pub total_revenue: f64,
    pub active_materials: i64,
    pub recent_orders: Vec<OrderRecord>,
}

/// Query string of `GET /api/orders`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OrderListQuery {
    #[serde(default)]
    pub status: Option<String>,
}
