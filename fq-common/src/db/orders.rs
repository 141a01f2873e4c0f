//! Order persistence and admin statistics

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::collections::BTreeMap;
use tracing::info;

use crate::api::AdminStats;
use crate::order::{
    NewOrder, OrderItemRecord, OrderRecord, OrderStatus, OrderWithItems, DEFAULT_COUNTRY,
};
use crate::Result;

/// Number of orders returned in the stats `recentOrders` list
pub const RECENT_ORDERS_LIMIT: i64 = 5;

const ORDER_COLUMNS: &str = "id, order_number, status, customer_first_name, customer_last_name, \
     customer_email, customer_phone, shipping_address1, shipping_address2, shipping_city, \
     shipping_state, shipping_zip, shipping_country, subtotal, shipping_cost, total, notes, \
     created_at, updated_at";

fn now_timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

fn row_to_order(row: &SqliteRow) -> Result<OrderRecord> {
    Ok(OrderRecord {
        id: row.try_get("id")?,
        order_number: row.try_get("order_number")?,
        status: row.try_get("status")?,
        customer_first_name: row.try_get("customer_first_name")?,
        customer_last_name: row.try_get("customer_last_name")?,
        customer_email: row.try_get("customer_email")?,
        customer_phone: row.try_get("customer_phone")?,
        shipping_address1: row.try_get("shipping_address1")?,
        shipping_address2: row.try_get("shipping_address2")?,
        shipping_city: row.try_get("shipping_city")?,
        shipping_state: row.try_get("shipping_state")?,
        shipping_zip: row.try_get("shipping_zip")?,
        shipping_country: row.try_get("shipping_country")?,
        subtotal: row.try_get("subtotal")?,
        shipping_cost: row.try_get("shipping_cost")?,
        total: row.try_get("total")?,
        notes: row.try_get("notes")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_item(row: &SqliteRow) -> Result<OrderItemRecord> {
    let services: String = row.try_get("services")?;
    Ok(OrderItemRecord {
        id: row.try_get("id")?,
        order_id: row.try_get("order_id")?,
        name: row.try_get("name")?,
        item_type: row.try_get("item_type")?,
        material_id: row.try_get("material_id")?,
        material_name: row.try_get("material_name")?,
        thickness: row.try_get("thickness")?,
        quantity: row.try_get("quantity")?,
        width: row.try_get("width")?,
        height: row.try_get("height")?,
        services: serde_json::from_str(&services)?,
        unit_price: row.try_get("unit_price")?,
        discount: row.try_get("discount")?,
        setup_fee: row.try_get("setup_fee")?,
        subtotal: row.try_get("subtotal")?,
        file_name: row.try_get("file_name")?,
        file_size: row.try_get("file_size")?,
    })
}

/// Persist a priced order and its items in one transaction
pub async fn insert_order(pool: &SqlitePool, order: &NewOrder) -> Result<OrderWithItems> {
    let id = order.id.to_string();
    let now = now_timestamp();
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO orders (
            id, order_number, status, customer_first_name, customer_last_name,
            customer_email, customer_phone, shipping_address1, shipping_address2, shipping_city,
            shipping_state, shipping_zip, shipping_country, subtotal, shipping_cost, total,
            created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&order.order_number)
    .bind(order.status.as_str())
    .bind(&order.customer.first_name)
    .bind(&order.customer.last_name)
    .bind(&order.customer.email)
    .bind(&order.customer.phone)
    .bind(&order.shipping.address1)
    .bind(order.shipping.address2.as_deref().unwrap_or(""))
    .bind(&order.shipping.city)
    .bind(&order.shipping.state)
    .bind(&order.shipping.zip)
    .bind(order.shipping.country.as_deref().unwrap_or(DEFAULT_COUNTRY))
    .bind(order.subtotal)
    .bind(order.shipping_cost)
    .bind(order.total)
    .bind(&now)
    .bind(&now)
    .execute(&mut *tx)
    .await?;

    for item in &order.items {
        let d = &item.draft;
        let b = &item.breakdown;
        let services = serde_json::to_string(&d.configuration().services)?;
        sqlx::query(
            r#"
            INSERT INTO order_items (
                order_id, name, item_type, material_id, material_name, thickness,
                quantity, width, height, services, unit_price, discount, setup_fee,
                subtotal, file_name, file_size
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&d.name)
        .bind(&d.item_type)
        .bind(&d.material_id)
        .bind(&d.material_name)
        .bind(&d.thickness)
        .bind(i64::from(d.quantity))
        .bind(d.width)
        .bind(d.height)
        .bind(services)
        .bind(b.unit_price)
        .bind(b.discount_fraction)
        .bind(b.setup_fee)
        .bind(b.subtotal)
        .bind(d.file_name.as_deref())
        .bind(d.file_size)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    info!(
        order_number = %order.order_number,
        items = order.items.len(),
        total = order.total,
        "Created order"
    );

    let created = get_order(pool, &id).await?;
    created.ok_or_else(|| crate::Error::Internal(format!("order {} vanished after insert", id)))
}

/// Fetch one order with its items
pub async fn get_order(pool: &SqlitePool, id: &str) -> Result<Option<OrderWithItems>> {
    let sql = format!("SELECT {} FROM orders WHERE id = ?", ORDER_COLUMNS);
    let Some(row) = sqlx::query(&sql).bind(id).fetch_optional(pool).await? else {
        return Ok(None);
    };
    let order = row_to_order(&row)?;

    let item_rows = sqlx::query("SELECT * FROM order_items WHERE order_id = ? ORDER BY id")
        .bind(id)
        .fetch_all(pool)
        .await?;
    let items = item_rows.iter().map(row_to_item).collect::<Result<Vec<_>>>()?;

    Ok(Some(OrderWithItems { order, items }))
}

/// Orders newest first, optionally filtered by status
pub async fn list_orders(
    pool: &SqlitePool,
    status: Option<OrderStatus>,
) -> Result<Vec<OrderRecord>> {
    let rows = match status {
        Some(status) => {
            let sql = format!(
                "SELECT {} FROM orders WHERE status = ? ORDER BY created_at DESC, rowid DESC",
                ORDER_COLUMNS
            );
            sqlx::query(&sql).bind(status.as_str()).fetch_all(pool).await?
        }
        None => {
            let sql = format!(
                "SELECT {} FROM orders ORDER BY created_at DESC, rowid DESC",
                ORDER_COLUMNS
            );
            sqlx::query(&sql).fetch_all(pool).await?
        }
    };

    rows.iter().map(row_to_order).collect()
}

/// Dashboard figures; revenue excludes cancelled orders
pub async fn order_stats(pool: &SqlitePool) -> Result<AdminStats> {
    let total_orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(pool)
        .await?;

    let status_rows = sqlx::query("SELECT status, COUNT(*) AS count FROM orders GROUP BY status")
        .fetch_all(pool)
        .await?;
    let mut orders_by_status = BTreeMap::new();
    for row in &status_rows {
        orders_by_status.insert(row.try_get::<String, _>("status")?, row.try_get::<i64, _>("count")?);
    }

    let total_revenue: Option<f64> =
        sqlx::query_scalar("SELECT SUM(total) FROM orders WHERE status <> 'cancelled'")
            .fetch_one(pool)
            .await?;

    let active_materials = super::catalog::count_active_materials(pool).await?;

    let sql = format!(
        "SELECT {} FROM orders ORDER BY created_at DESC, rowid DESC LIMIT ?",
        ORDER_COLUMNS
    );
    let recent_orders = sqlx::query(&sql)
        .bind(RECENT_ORDERS_LIMIT)
        .fetch_all(pool)
        .await?
        .iter()
        .map(row_to_order)
        .collect::<Result<Vec<_>>>()?;

    Ok(AdminStats {
        total_orders,
        orders_by_status,
        total_revenue: total_revenue.map(crate::pricing::round_cents).unwrap_or(0.0),
        active_materials,
        recent_orders,
    })
}
