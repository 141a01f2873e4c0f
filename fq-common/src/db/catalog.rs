//! Material and thickness queries

use sqlx::{Row, SqlitePool};

use crate::api::{MaterialListing, ThicknessListing};
use crate::catalog::{Catalog, MaterialCategory, ResolvedThickness, Thickness};
use crate::{Error, Result};

/// Active materials ordered by `sort_order`, each with its active thicknesses
pub async fn list_materials(pool: &SqlitePool) -> Result<Vec<MaterialListing>> {
    let material_rows = sqlx::query(
        r#"
        SELECT id, name, category, description, color, sort_order, active
        FROM materials
        WHERE active = 1
        ORDER BY sort_order, id
        "#,
    )
    .fetch_all(pool)
    .await?;

    let thickness_rows = sqlx::query(
        r#"
        SELECT t.id, t.material_id, t.label, t.inches, t.base_price_per_sq_in, t.sort_order, t.active
        FROM thicknesses t
        JOIN materials m ON m.id = t.material_id
        WHERE t.active = 1 AND m.active = 1
        ORDER BY t.material_id, t.sort_order, t.id
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut thicknesses = Vec::with_capacity(thickness_rows.len());
    for row in &thickness_rows {
        thicknesses.push(ThicknessListing {
            id: row.try_get("id")?,
            material_id: row.try_get("material_id")?,
            label: row.try_get("label")?,
            inches: row.try_get("inches")?,
            base_price_per_sq_in: row.try_get("base_price_per_sq_in")?,
            sort_order: row.try_get("sort_order")?,
            active: row.try_get::<i64, _>("active")? != 0,
        });
    }

    let mut materials = Vec::with_capacity(material_rows.len());
    for row in &material_rows {
        let id: String = row.try_get("id")?;
        let category: String = row.try_get("category")?;
        let category = MaterialCategory::parse(&category).ok_or_else(|| {
            Error::Internal(format!("material {} has unknown category '{}'", id, category))
        })?;
        let own: Vec<ThicknessListing> = thicknesses
            .iter()
            .filter(|t| t.material_id == id)
            .cloned()
            .collect();

        materials.push(MaterialListing {
            name: row.try_get("name")?,
            category,
            description: row.try_get("description")?,
            color: row.try_get("color")?,
            sort_order: row.try_get("sort_order")?,
            active: row.try_get::<i64, _>("active")? != 0,
            thicknesses: own,
            id,
        });
    }

    Ok(materials)
}

/// Active catalog as the pricing engine sees it
pub async fn load_catalog(pool: &SqlitePool) -> Result<Catalog> {
    let materials = list_materials(pool).await?;
    Ok(Catalog::new(materials.into_iter().map(Into::into).collect()))
}

/// Resolve a single active `(material_id, label)` pair
pub async fn find_thickness(
    pool: &SqlitePool,
    material_id: &str,
    label: &str,
) -> Result<Option<ResolvedThickness>> {
    let row = sqlx::query(
        r#"
        SELECT t.label, t.inches, t.base_price_per_sq_in
        FROM thicknesses t
        JOIN materials m ON m.id = t.material_id
        WHERE t.material_id = ? AND t.label = ? AND t.active = 1 AND m.active = 1
        "#,
    )
    .bind(material_id)
    .bind(label)
    .fetch_optional(pool)
    .await?;

    row.map(|row| -> Result<ResolvedThickness> {
        Ok(ResolvedThickness {
            material_id: material_id.to_string(),
            thickness: Thickness {
                label: row.try_get("label")?,
                inches: row.try_get("inches")?,
                base_price_per_sq_in: row.try_get("base_price_per_sq_in")?,
            },
        })
    })
    .transpose()
}

pub async fn count_active_materials(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM materials WHERE active = 1")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
