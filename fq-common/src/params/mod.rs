//! Pricing parameter management
//!
//! Admin-tunable numeric knobs that drive the pricing engine.
//!
//! # Architecture
//!
//! Parameters live in an external store as [`PricingParameter`] rows carrying
//! display metadata (category, bounds, step, unit). The engine never sees
//! rows: it consumes a flat, immutable [`ParameterSnapshot`] built from them.
//! Grouping by category exists only at the HTTP boundary.
//!
//! ```rust
//! use fq_common::params::{build_snapshot, default_parameters};
//!
//! let rows = default_parameters();
//! let snapshot = build_snapshot(&rows);
//! assert_eq!(snapshot.get("base_markup_pct"), Some(35.0));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

// Module declarations
mod metadata;
mod update;

pub use metadata::{default_parameters, ParamMetadata, PARAMETER_METADATA};
pub use update::{
    apply_updates, BoundsPolicy, InMemoryParameterStore, ParameterStore, ParameterUpdate,
    SkipReason, SkippedUpdate, UpdateOutcome,
};

/// Display grouping for the admin panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterCategory {
    General,
    Cutting,
    Complexity,
    Quantity,
    Rush,
    Shipping,
    Services,
}

impl ParameterCategory {
    /// Admin panel display order
    pub const ALL: [ParameterCategory; 7] = [
        ParameterCategory::General,
        ParameterCategory::Cutting,
        ParameterCategory::Complexity,
        ParameterCategory::Quantity,
        ParameterCategory::Rush,
        ParameterCategory::Shipping,
        ParameterCategory::Services,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterCategory::General => "general",
            ParameterCategory::Cutting => "cutting",
            ParameterCategory::Complexity => "complexity",
            ParameterCategory::Quantity => "quantity",
            ParameterCategory::Rush => "rush",
            ParameterCategory::Shipping => "shipping",
            ParameterCategory::Services => "services",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

/// Unit a parameter value is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterUnit {
    Percent,
    Dollars,
    Multiplier,
    DollarsPerMin,
    DollarsPerLb,
}

impl ParameterUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterUnit::Percent => "percent",
            ParameterUnit::Dollars => "dollars",
            ParameterUnit::Multiplier => "multiplier",
            ParameterUnit::DollarsPerMin => "dollars_per_min",
            ParameterUnit::DollarsPerLb => "dollars_per_lb",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "percent" => Some(ParameterUnit::Percent),
            "dollars" => Some(ParameterUnit::Dollars),
            "multiplier" => Some(ParameterUnit::Multiplier),
            "dollars_per_min" => Some(ParameterUnit::DollarsPerMin),
            "dollars_per_lb" => Some(ParameterUnit::DollarsPerLb),
            _ => None,
        }
    }
}

/// One stored pricing parameter with its admin metadata
///
/// Serialized field names match the parameter read endpoint.
/// Invariant (enforced at write time under [`BoundsPolicy::Enforce`]):
/// `min_value <= value <= max_value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingParameter {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: ParameterCategory,
    pub value: f64,
    pub unit: ParameterUnit,
    pub min_value: f64,
    pub max_value: f64,
    pub step: f64,
}

impl PricingParameter {
    pub fn in_bounds(&self, value: f64) -> bool {
        value >= self.min_value && value <= self.max_value
    }
}

/// Immutable point-in-time mapping of parameter id to value
///
/// Cloning is cheap (shared storage). An evaluation captures a snapshot when it
/// starts; later parameter writes only affect snapshots built afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSnapshot {
    values: Arc<BTreeMap<String, f64>>,
}

impl ParameterSnapshot {
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let mut values = BTreeMap::new();
        for (k, v) in pairs {
            values.insert(k.into(), v);
        }
        Self {
            values: Arc::new(values),
        }
    }

    pub fn get(&self, id: &str) -> Option<f64> {
        self.values.get(id).copied()
    }

    /// Iterate `(id, value)` in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Flatten raw parameter rows into the engine's `id -> value` view
///
/// Duplicate ids resolve last-write-wins; this never fails.
pub fn build_snapshot<'a, I>(rows: I) -> ParameterSnapshot
where
    I: IntoIterator<Item = &'a PricingParameter>,
{
    ParameterSnapshot::from_pairs(rows.into_iter().map(|p| (p.id.clone(), p.value)))
}

/// Category name -> parameters, the read/write endpoint response shape
pub type GroupedParameters = BTreeMap<String, Vec<PricingParameter>>;

/// Group rows by category for presentation, each group ordered by id
pub fn group_by_category(rows: &[PricingParameter]) -> GroupedParameters {
    let mut grouped: GroupedParameters = BTreeMap::new();
    for row in rows {
        grouped
            .entry(row.category.as_str().to_string())
            .or_default()
            .push(row.clone());
    }
    for group in grouped.values_mut() {
        group.sort_by(|a, b| a.id.cmp(&b.id));
    }
    grouped
}

/// Inverse of [`group_by_category`] as far as the engine is concerned
///
/// Groups are visited in key order, so an id repeated across categories
/// resolves to the one in the alphabetically last category.
pub fn flatten_grouped(grouped: &GroupedParameters) -> ParameterSnapshot {
    build_snapshot(grouped.values().flatten())
}
