//! Pricing engine
//!
//! Pure, synchronous conversion of a part configuration plus a parameter
//! snapshot into a [`PriceBreakdown`]. The server and the client both call
//! [`compute_price`] from this module, so an authoritative quote and a local
//! estimate computed against the same snapshot are bit-identical.
//!
//! # Rule chain
//!
//! 1. Resolve the thickness for `(material_id, thickness_label)`
//! 2. `area = width * height`
//! 3. `material_cost = area * base_price_per_sq_in`
//! 4. `unit_base = material_cost * waste * markup * complexity`
//! 5. `unit_price = unit_base + services`, floored at `minimum_part`
//! 6. Quantity discount, setup fee, subtotal
//! 7. Round each output independently
//!
//! Missing, negative or non-finite parameters fall back to their defaults;
//! the engine never fails on numeric input.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

use crate::catalog::ThicknessLookup;
use crate::params::ParameterSnapshot;
use crate::{services, Error, Result};

mod discount;
mod rounding;
#[cfg(test)]
mod tests;

pub use discount::{discount_fraction, parse_threshold, quantity_breaks, FALLBACK_LADDER, QTY_BREAK_PREFIX};
pub use rounding::{round_cents, round_fraction};

/// Parameter ids the engine reads
pub mod keys {
    pub const KERF_WASTE_PCT: &str = "kerf_waste_pct";
    pub const BASE_MARKUP_PCT: &str = "base_markup_pct";
    pub const COMPLEXITY_SIMPLE: &str = "complexity_simple";
    pub const MINIMUM_PART: &str = "minimum_part";
    pub const SETUP_FEE: &str = "setup_fee";
    pub const SHIPPING_BASE: &str = "shipping_base";
}

/// Per-part floor when the snapshot has no usable `minimum_part`
pub const DEFAULT_MINIMUM_PART: f64 = 0.50;

/// A customer's part specification, constructed per pricing request
///
/// Services are a set: duplicates collapse and iteration order is fixed,
/// which keeps the service sum identical across evaluations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartConfiguration {
    pub material_id: String,
    pub thickness_label: String,
    pub width_inches: f64,
    pub height_inches: f64,
    pub quantity: u32,
    #[serde(default)]
    pub services: BTreeSet<String>,
}

impl PartConfiguration {
    pub fn new(
        material_id: impl Into<String>,
        thickness_label: impl Into<String>,
        width_inches: f64,
        height_inches: f64,
        quantity: u32,
    ) -> Self {
        Self {
            material_id: material_id.into(),
            thickness_label: thickness_label.into(),
            width_inches,
            height_inches,
            quantity,
            services: BTreeSet::new(),
        }
    }

    pub fn with_service(mut self, service_id: impl Into<String>) -> Self {
        self.services.insert(service_id.into());
        self
    }

    /// Reject configurations that must never reach the engine
    pub fn validate(&self) -> Result<()> {
        if self.material_id.trim().is_empty() {
            return Err(Error::Validation("materialId is required".to_string()));
        }
        if self.thickness_label.trim().is_empty() {
            return Err(Error::Validation("thicknessLabel is required".to_string()));
        }
        if !(self.width_inches.is_finite() && self.width_inches > 0.0) {
            return Err(Error::Validation(format!(
                "width must be a positive number, got {}",
                self.width_inches
            )));
        }
        if !(self.height_inches.is_finite() && self.height_inches > 0.0) {
            return Err(Error::Validation(format!(
                "height must be a positive number, got {}",
                self.height_inches
            )));
        }
        if !(self.width_inches * self.height_inches).is_finite() {
            return Err(Error::Validation(format!(
                "part area {} x {} is out of range",
                self.width_inches, self.height_inches
            )));
        }
        if self.quantity < 1 {
            return Err(Error::Validation("quantity must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Engine output; every field already rounded
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub unit_price: f64,
    pub discount_fraction: f64,
    pub setup_fee: f64,
    pub subtotal: f64,
}

impl PriceBreakdown {
    /// Placeholder for configurations whose material cannot be resolved locally
    pub fn zero() -> Self {
        Self::default()
    }

    /// Apply output rounding; idempotent
    pub fn rounded(self) -> Self {
        Self {
            unit_price: round_cents(self.unit_price),
            discount_fraction: round_fraction(self.discount_fraction),
            setup_fee: round_cents(self.setup_fee),
            subtotal: round_cents(self.subtotal),
        }
    }
}

/// Full evaluation trace, unrounded except for `breakdown`
#[derive(Debug, Clone, PartialEq)]
pub struct PriceComputation {
    pub area: f64,
    pub material_cost: f64,
    pub unit_base: f64,
    pub service_cost: f64,
    pub minimum_part: f64,
    pub floor_engaged: bool,
    pub breakdown: PriceBreakdown,
}

/// Read-side view of an optional snapshot with default semantics
#[derive(Clone, Copy)]
struct Knobs<'a>(Option<&'a ParameterSnapshot>);

impl Knobs<'_> {
    fn get(&self, id: &str) -> Option<f64> {
        self.0
            .and_then(|p| p.get(id))
            .filter(|v| v.is_finite() && *v >= 0.0)
    }

    fn get_or(&self, id: &str, default: f64) -> f64 {
        self.get(id).unwrap_or(default)
    }
}

/// Sum of per-part service fees
///
/// Each known service charges its live parameter when present, else its
/// fallback fee. Unknown service ids contribute nothing.
fn service_cost(selected: &BTreeSet<String>, knobs: Knobs<'_>) -> f64 {
    selected
        .iter()
        .map(|id| match services::find(id) {
            Some(svc) => svc
                .parameter_key
                .and_then(|key| knobs.get(key))
                .unwrap_or(svc.flat_fee_fallback),
            None => 0.0,
        })
        .sum()
}

/// Run the rule chain and keep the intermediate values
pub fn evaluate<L>(
    lookup: &L,
    config: &PartConfiguration,
    params: Option<&ParameterSnapshot>,
) -> Result<PriceComputation>
where
    L: ThicknessLookup + ?Sized,
{
    let thickness = lookup
        .thickness(&config.material_id, &config.thickness_label)
        .ok_or_else(|| {
            Error::NotFound(format!(
                "thickness '{}' for material '{}'",
                config.thickness_label, config.material_id
            ))
        })?;

    let knobs = Knobs(params);

    let area = config.width_inches * config.height_inches;
    let material_cost = area * thickness.base_price_per_sq_in;

    let waste_factor = 1.0 + knobs.get_or(keys::KERF_WASTE_PCT, 0.0) / 100.0;
    let markup_factor = 1.0 + knobs.get_or(keys::BASE_MARKUP_PCT, 0.0) / 100.0;
    // Only the "simple" tier exists today
    let complexity_factor = knobs.get_or(keys::COMPLEXITY_SIMPLE, 1.0);

    let unit_base = material_cost * waste_factor * markup_factor * complexity_factor;
    let service_cost = service_cost(&config.services, knobs);

    let minimum_part = knobs.get_or(keys::MINIMUM_PART, DEFAULT_MINIMUM_PART);
    let unfloored = unit_base + service_cost;
    let unit_price = unfloored.max(minimum_part);

    let discount = discount_fraction(config.quantity, params);
    let setup_fee = knobs.get_or(keys::SETUP_FEE, 0.0);
    let subtotal = unit_price * f64::from(config.quantity) * (1.0 - discount) + setup_fee;

    let breakdown = PriceBreakdown {
        unit_price,
        discount_fraction: discount,
        setup_fee,
        subtotal,
    }
    .rounded();

    if !(breakdown.unit_price.is_finite() && breakdown.subtotal.is_finite()) {
        return Err(Error::Validation(format!(
            "price for a {} x {} part is out of range",
            config.width_inches, config.height_inches
        )));
    }

    debug!(
        material = %config.material_id,
        thickness = %config.thickness_label,
        quantity = config.quantity,
        live_params = params.is_some(),
        area,
        material_cost,
        unit_base,
        service_cost,
        subtotal = breakdown.subtotal,
        "Evaluated price"
    );

    Ok(PriceComputation {
        area,
        material_cost,
        unit_base,
        service_cost,
        minimum_part,
        floor_engaged: unfloored < minimum_part,
        breakdown,
    })
}

/// Price a configuration
///
/// `params = None` means no live snapshot is available: built-in defaults and
/// the fixed discount ladder apply. Fails with [`Error::NotFound`] when the
/// material/thickness pair does not resolve.
pub fn compute_price<L>(
    lookup: &L,
    config: &PartConfiguration,
    params: Option<&ParameterSnapshot>,
) -> Result<PriceBreakdown>
where
    L: ThicknessLookup + ?Sized,
{
    evaluate(lookup, config, params).map(|c| c.breakdown)
}

/// Client convenience mode: an unresolvable pair prices as zero
pub fn compute_price_or_zero<L>(
    lookup: &L,
    config: &PartConfiguration,
    params: Option<&ParameterSnapshot>,
) -> PriceBreakdown
where
    L: ThicknessLookup + ?Sized,
{
    compute_price(lookup, config, params).unwrap_or_else(|_| PriceBreakdown::zero())
}
