//! SQLite-backed parameter store

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use crate::params::{
    build_snapshot, ParameterCategory, ParameterSnapshot, ParameterStore, ParameterUnit,
    PricingParameter,
};
use crate::{Error, Result};

/// [`ParameterStore`] over the `pricing_parameters` table
#[derive(Debug, Clone)]
pub struct SqliteParameterStore {
    pool: SqlitePool,
}

impl SqliteParameterStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Capture the current parameter values
    pub async fn snapshot(&self) -> Result<ParameterSnapshot> {
        Ok(build_snapshot(&self.load_all().await?))
    }
}

fn row_to_parameter(row: &sqlx::sqlite::SqliteRow) -> Result<PricingParameter> {
    let id: String = row.try_get("id")?;
    let category: String = row.try_get("category")?;
    let unit: String = row.try_get("unit")?;

    let category = ParameterCategory::parse(&category).ok_or_else(|| {
        Error::Internal(format!("parameter {} has unknown category '{}'", id, category))
    })?;
    let unit = ParameterUnit::parse(&unit)
        .ok_or_else(|| Error::Internal(format!("parameter {} has unknown unit '{}'", id, unit)))?;

    Ok(PricingParameter {
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        category,
        value: row.try_get("value")?,
        unit,
        min_value: row.try_get("min_value")?,
        max_value: row.try_get("max_value")?,
        step: row.try_get("step")?,
        id,
    })
}

#[async_trait]
impl ParameterStore for SqliteParameterStore {
    async fn load_all(&self) -> Result<Vec<PricingParameter>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, category, value, unit, min_value, max_value, step
            FROM pricing_parameters
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut params = rows
            .iter()
            .map(row_to_parameter)
            .collect::<Result<Vec<_>>>()?;
        // Display order of categories, not alphabetical
        params.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.id.cmp(&b.id)));
        Ok(params)
    }

    async fn set_value(&self, id: &str, value: f64) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE pricing_parameters SET value = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(value)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
