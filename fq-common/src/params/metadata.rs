//! Default parameter definitions
//!
//! Single source of truth for the parameter set seeded at first start:
//! names, units, bounds and default values.

use super::{ParameterCategory, ParameterUnit, PricingParameter};

/// Static description of one seeded parameter
pub struct ParamMetadata {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: ParameterCategory,
    pub default_value: f64,
    pub unit: ParameterUnit,
    pub min_value: f64,
    pub max_value: f64,
    pub step: f64,
}

impl ParamMetadata {
    pub fn to_parameter(&self) -> PricingParameter {
        PricingParameter {
            id: self.id.to_string(),
            name: self.name.to_string(),
            description: self.description.to_string(),
            category: self.category,
            value: self.default_value,
            unit: self.unit,
            min_value: self.min_value,
            max_value: self.max_value,
            step: self.step,
        }
    }
}

use ParameterCategory as C;
use ParameterUnit as U;

const fn svc(id: &'static str, name: &'static str, description: &'static str, fee: f64) -> ParamMetadata {
    ParamMetadata {
        id,
        name,
        description,
        category: C::Services,
        default_value: fee,
        unit: U::Dollars,
        min_value: 0.0,
        max_value: 100.0,
        step: 0.25,
    }
}

/// Seeded parameter set, in admin display order
pub static PARAMETER_METADATA: &[ParamMetadata] = &[
    // General
    ParamMetadata {
        id: "base_markup_pct",
        name: "Base Markup",
        description: "Markup applied on top of material cost",
        category: C::General,
        default_value: 35.0,
        unit: U::Percent,
        min_value: 0.0,
        max_value: 200.0,
        step: 1.0,
    },
    ParamMetadata {
        id: "minimum_part",
        name: "Minimum Part Charge",
        description: "Floor for the per-part price",
        category: C::General,
        default_value: 5.0,
        unit: U::Dollars,
        min_value: 0.0,
        max_value: 100.0,
        step: 0.25,
    },
    ParamMetadata {
        id: "setup_fee",
        name: "Setup Fee",
        description: "One-time fee per line item, independent of quantity",
        category: C::General,
        default_value: 15.0,
        unit: U::Dollars,
        min_value: 0.0,
        max_value: 500.0,
        step: 1.0,
    },
    // Cutting
    ParamMetadata {
        id: "kerf_waste_pct",
        name: "Kerf & Waste",
        description: "Material lost to the cut and nesting offcuts",
        category: C::Cutting,
        default_value: 10.0,
        unit: U::Percent,
        min_value: 0.0,
        max_value: 50.0,
        step: 0.5,
    },
    ParamMetadata {
        id: "laser_rate_per_min",
        name: "Laser Time Rate",
        description: "Machine time rate for file-based quotes",
        category: C::Cutting,
        default_value: 2.5,
        unit: U::DollarsPerMin,
        min_value: 0.0,
        max_value: 20.0,
        step: 0.05,
    },
    // Complexity
    ParamMetadata {
        id: "complexity_simple",
        name: "Simple Geometry",
        description: "Multiplier for template and rectangular parts",
        category: C::Complexity,
        default_value: 1.0,
        unit: U::Multiplier,
        min_value: 0.5,
        max_value: 5.0,
        step: 0.05,
    },
    ParamMetadata {
        id: "complexity_moderate",
        name: "Moderate Geometry",
        description: "Multiplier for parts with interior cutouts",
        category: C::Complexity,
        default_value: 1.35,
        unit: U::Multiplier,
        min_value: 0.5,
        max_value: 5.0,
        step: 0.05,
    },
    ParamMetadata {
        id: "complexity_complex",
        name: "Complex Geometry",
        description: "Multiplier for intricate profiles and fine detail",
        category: C::Complexity,
        default_value: 1.75,
        unit: U::Multiplier,
        min_value: 0.5,
        max_value: 5.0,
        step: 0.05,
    },
    // Quantity breaks
    ParamMetadata {
        id: "qty_break_10",
        name: "10+ Parts",
        description: "Discount once quantity reaches 10",
        category: C::Quantity,
        default_value: 10.0,
        unit: U::Percent,
        min_value: 0.0,
        max_value: 90.0,
        step: 1.0,
    },
    ParamMetadata {
        id: "qty_break_50",
        name: "50+ Parts",
        description: "Discount once quantity reaches 50",
        category: C::Quantity,
        default_value: 15.0,
        unit: U::Percent,
        min_value: 0.0,
        max_value: 90.0,
        step: 1.0,
    },
    ParamMetadata {
        id: "qty_break_100",
        name: "100+ Parts",
        description: "Discount once quantity reaches 100",
        category: C::Quantity,
        default_value: 20.0,
        unit: U::Percent,
        min_value: 0.0,
        max_value: 90.0,
        step: 1.0,
    },
    ParamMetadata {
        id: "qty_break_500",
        name: "500+ Parts",
        description: "Discount once quantity reaches 500",
        category: C::Quantity,
        default_value: 25.0,
        unit: U::Percent,
        min_value: 0.0,
        max_value: 90.0,
        step: 1.0,
    },
    // Rush
    ParamMetadata {
        id: "rush_multiplier",
        name: "Rush Multiplier",
        description: "Applied to expedited orders",
        category: C::Rush,
        default_value: 1.5,
        unit: U::Multiplier,
        min_value: 1.0,
        max_value: 5.0,
        step: 0.05,
    },
    // Shipping
    ParamMetadata {
        id: "shipping_base",
        name: "Base Shipping",
        description: "Flat shipping charge per order",
        category: C::Shipping,
        default_value: 12.0,
        unit: U::Dollars,
        min_value: 0.0,
        max_value: 200.0,
        step: 0.5,
    },
    ParamMetadata {
        id: "shipping_per_lb",
        name: "Shipping per Pound",
        description: "Weight-based shipping surcharge",
        category: C::Shipping,
        default_value: 0.75,
        unit: U::DollarsPerLb,
        min_value: 0.0,
        max_value: 20.0,
        step: 0.05,
    },
    // Services
    svc("svc_bending", "CNC Bending", "Per-part bending fee", 4.50),
    svc("svc_anodizing", "Anodizing", "Per-part anodizing fee", 8.00),
    svc("svc_powder_coating", "Powder Coating", "Per-part powder coating fee", 6.00),
    svc("svc_plating", "Plating", "Per-part plating fee", 10.00),
    svc("svc_deburring", "Deburring", "Per-part deburring fee", 2.00),
    svc("svc_hardware", "Hardware Insertion", "Per-part hardware insertion fee", 1.50),
    svc("svc_countersinking", "Countersinking", "Per-part countersinking fee", 1.00),
];

/// Seeded parameter rows with their default values
pub fn default_parameters() -> Vec<PricingParameter> {
    PARAMETER_METADATA.iter().map(ParamMetadata::to_parameter).collect()
}
