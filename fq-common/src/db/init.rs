//! Database initialization
//!
//! Creates the schema on first start and seeds reference data. Every step is
//! idempotent: tables use `CREATE TABLE IF NOT EXISTS` and seed rows use
//! `INSERT OR IGNORE`, so restarting never overwrites operator edits.

use crate::catalog::Catalog;
use crate::params::PARAMETER_METADATA;
use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Busy timeout applied to every connection
const BUSY_TIMEOUT_MS: u64 = 5000;

/// Open (creating if needed) the database and bring the schema up to date
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    crate::config::ensure_parent_dir(db_path)?;

    // Pragmas go on the connect options so every pooled connection gets them
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS));
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;
    seed_parameters(&pool).await?;
    seed_catalog(&pool, &Catalog::builtin()).await?;

    Ok(pool)
}

/// Create all tables and indexes
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_pricing_parameters_table(pool).await?;
    create_materials_table(pool).await?;
    create_thicknesses_table(pool).await?;
    create_orders_table(pool).await?;
    create_order_items_table(pool).await?;
    Ok(())
}

async fn create_pricing_parameters_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pricing_parameters (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            category TEXT NOT NULL,
            value REAL NOT NULL,
            unit TEXT NOT NULL,
            min_value REAL NOT NULL,
            max_value REAL NOT NULL,
            step REAL NOT NULL,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_materials_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS materials (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            category TEXT NOT NULL CHECK (category IN ('metals', 'plastics', 'composites', 'wood')),
            description TEXT NOT NULL DEFAULT '',
            color TEXT NOT NULL DEFAULT '',
            sort_order INTEGER NOT NULL DEFAULT 0,
            active INTEGER NOT NULL DEFAULT 1
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_thicknesses_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS thicknesses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            material_id TEXT NOT NULL REFERENCES materials(id) ON DELETE CASCADE,
            label TEXT NOT NULL,
            inches REAL NOT NULL,
            base_price_per_sq_in REAL NOT NULL CHECK (base_price_per_sq_in > 0),
            sort_order INTEGER NOT NULL DEFAULT 0,
            active INTEGER NOT NULL DEFAULT 1,
            UNIQUE (material_id, label)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_orders_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS orders (
            id TEXT PRIMARY KEY,
            order_number TEXT NOT NULL UNIQUE,
            status TEXT NOT NULL DEFAULT 'pending'
                CHECK (status IN ('pending', 'confirmed', 'in_production', 'shipped', 'delivered', 'cancelled')),
            customer_first_name TEXT NOT NULL,
            customer_last_name TEXT NOT NULL,
            customer_email TEXT NOT NULL,
            customer_phone TEXT NOT NULL DEFAULT '',
            shipping_address1 TEXT NOT NULL,
            shipping_address2 TEXT NOT NULL DEFAULT '',
            shipping_city TEXT NOT NULL,
            shipping_state TEXT NOT NULL,
            shipping_zip TEXT NOT NULL,
            shipping_country TEXT NOT NULL DEFAULT 'US',
            subtotal REAL NOT NULL,
            shipping_cost REAL NOT NULL,
            total REAL NOT NULL,
            notes TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_orders_status ON orders(status)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_orders_created_at ON orders(created_at)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_order_items_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS order_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            order_id TEXT NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            item_type TEXT NOT NULL DEFAULT 'template',
            material_id TEXT NOT NULL,
            material_name TEXT NOT NULL DEFAULT '',
            thickness TEXT NOT NULL,
            quantity INTEGER NOT NULL CHECK (quantity >= 1),
            width REAL NOT NULL,
            height REAL NOT NULL,
            services TEXT NOT NULL DEFAULT '[]',
            unit_price REAL NOT NULL,
            discount REAL NOT NULL DEFAULT 0,
            setup_fee REAL NOT NULL DEFAULT 0,
            subtotal REAL NOT NULL,
            file_name TEXT,
            file_size INTEGER
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_order_items_order ON order_items(order_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Insert any default parameter that is not already present
pub async fn seed_parameters(pool: &SqlitePool) -> Result<()> {
    let mut inserted = 0u64;
    for meta in PARAMETER_METADATA {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO pricing_parameters
                (id, name, description, category, value, unit, min_value, max_value, step)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(meta.id)
        .bind(meta.name)
        .bind(meta.description)
        .bind(meta.category.as_str())
        .bind(meta.default_value)
        .bind(meta.unit.as_str())
        .bind(meta.min_value)
        .bind(meta.max_value)
        .bind(meta.step)
        .execute(pool)
        .await?;
        inserted += result.rows_affected();
    }

    if inserted > 0 {
        info!("Seeded {} pricing parameters", inserted);
    } else {
        debug!("Pricing parameters already seeded");
    }
    Ok(())
}

/// Insert any catalog material or thickness that is not already present
pub async fn seed_catalog(pool: &SqlitePool, catalog: &Catalog) -> Result<()> {
    let mut tx = pool.begin().await?;
    let mut inserted = 0u64;

    for (m_idx, material) in catalog.materials.iter().enumerate() {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO materials (id, name, category, description, color, sort_order, active)
            VALUES (?, ?, ?, ?, ?, ?, 1)
            "#,
        )
        .bind(&material.id)
        .bind(&material.name)
        .bind(material.category.as_str())
        .bind(&material.description)
        .bind(&material.color)
        .bind(m_idx as i64)
        .execute(&mut *tx)
        .await?;
        inserted += result.rows_affected();

        for (t_idx, thickness) in material.thicknesses.iter().enumerate() {
            let result = sqlx::query(
                r#"
                INSERT OR IGNORE INTO thicknesses
                    (material_id, label, inches, base_price_per_sq_in, sort_order, active)
                VALUES (?, ?, ?, ?, ?, 1)
                "#,
            )
            .bind(&material.id)
            .bind(&thickness.label)
            .bind(thickness.inches)
            .bind(thickness.base_price_per_sq_in)
            .bind(t_idx as i64)
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected();
        }
    }

    tx.commit().await?;

    if inserted > 0 {
        info!("Seeded {} catalog rows", inserted);
    }
    Ok(())
}
