//! Bulk parameter update protocol
//!
//! Admin mutation path. Each item in a batch stands alone: an item that cannot
//! be applied is skipped and reported, the rest still go through. There is no
//! rollback; a storage failure mid-batch leaves earlier items applied.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::{build_snapshot, group_by_category, GroupedParameters, ParameterSnapshot, PricingParameter};
use crate::Result;

/// One `{id, value}` item of a bulk update request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterUpdate {
    pub id: String,
    pub value: f64,
}

/// Whether writes are checked against `[min_value, max_value]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundsPolicy {
    /// Out-of-range values are skipped
    #[default]
    Enforce,
    /// Any finite value is written
    Lenient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Unknown,
    NotFinite,
    OutOfRange,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedUpdate {
    pub id: String,
    pub value: f64,
    pub reason: SkipReason,
}

/// Result of a bulk update: post-update rows plus per-item bookkeeping
#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    pub parameters: Vec<PricingParameter>,
    pub applied: usize,
    pub skipped: Vec<SkippedUpdate>,
}

impl UpdateOutcome {
    /// Refreshed snapshot; supersedes any snapshot captured before the update
    pub fn snapshot(&self) -> ParameterSnapshot {
        build_snapshot(&self.parameters)
    }

    pub fn grouped(&self) -> GroupedParameters {
        group_by_category(&self.parameters)
    }
}

/// Persistent home of the parameter rows
#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// All rows, ordered by category then id
    async fn load_all(&self) -> Result<Vec<PricingParameter>>;

    /// Overwrite the value of an existing row. Returns false if `id` is unknown.
    async fn set_value(&self, id: &str, value: f64) -> Result<bool>;
}

/// Apply a batch of updates and return the refreshed parameter set
pub async fn apply_updates<S>(
    store: &S,
    updates: &[ParameterUpdate],
    policy: BoundsPolicy,
) -> Result<UpdateOutcome>
where
    S: ParameterStore + ?Sized,
{
    let current = store.load_all().await?;
    let by_id: HashMap<&str, &PricingParameter> =
        current.iter().map(|p| (p.id.as_str(), p)).collect();

    let mut applied = 0;
    let mut skipped = Vec::new();

    for update in updates {
        let reason = match by_id.get(update.id.as_str()) {
            None => Some(SkipReason::Unknown),
            Some(_) if !update.value.is_finite() => Some(SkipReason::NotFinite),
            Some(param) if policy == BoundsPolicy::Enforce && !param.in_bounds(update.value) => {
                Some(SkipReason::OutOfRange)
            }
            Some(_) => None,
        };

        if let Some(reason) = reason {
            warn!(
                id = %update.id,
                value = update.value,
                ?reason,
                "Skipping pricing parameter update"
            );
            skipped.push(SkippedUpdate {
                id: update.id.clone(),
                value: update.value,
                reason,
            });
            continue;
        }

        if store.set_value(&update.id, update.value).await? {
            info!("Updated pricing parameter: {} = {}", update.id, update.value);
            applied += 1;
        } else {
            // Row disappeared between the read and the write
            warn!(id = %update.id, "Pricing parameter vanished during update");
            skipped.push(SkippedUpdate {
                id: update.id.clone(),
                value: update.value,
                reason: SkipReason::Unknown,
            });
        }
    }

    let parameters = store.load_all().await?;
    Ok(UpdateOutcome {
        parameters,
        applied,
        skipped,
    })
}

/// Process-local store, used by tests and offline tooling
#[derive(Debug, Default)]
pub struct InMemoryParameterStore {
    rows: RwLock<Vec<PricingParameter>>,
}

impl InMemoryParameterStore {
    pub fn new(rows: Vec<PricingParameter>) -> Self {
        Self {
            rows: RwLock::new(rows),
        }
    }

    /// Store seeded with the default parameter set
    pub fn with_defaults() -> Self {
        Self::new(super::default_parameters())
    }
}

#[async_trait]
impl ParameterStore for InMemoryParameterStore {
    async fn load_all(&self) -> Result<Vec<PricingParameter>> {
        let mut rows = self.rows.read().await.clone();
        rows.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn set_value(&self, id: &str, value: f64) -> Result<bool> {
        let mut rows = self.rows.write().await;
        match rows.iter_mut().find(|p| p.id == id) {
            Some(row) => {
                row.value = value;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
