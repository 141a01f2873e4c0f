//! Order drafts and server-side re-pricing
//!
//! An order arrives as a list of line items the client already priced. The
//! server never trusts those numbers: every item is re-priced against the
//! live snapshot and the server's breakdown is what gets persisted. Once
//! written, an order's prices never change.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::catalog::ThicknessLookup;
use crate::params::ParameterSnapshot;
use crate::pricing::{self, keys, round_cents, PartConfiguration, PriceBreakdown};
use crate::{Error, Result};

pub const ORDER_NUMBER_PREFIX: &str = "CS-";
const ORDER_NUMBER_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const ORDER_NUMBER_LEN: usize = 5;

/// Default country when the shipping address omits one
pub const DEFAULT_COUNTRY: &str = "US";

/// `CS-` followed by five random characters from `A-Z0-9`
pub fn generate_order_number() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ORDER_NUMBER_LEN)
        .map(|_| ORDER_NUMBER_CHARSET[rng.gen_range(0..ORDER_NUMBER_CHARSET.len())] as char)
        .collect();
    format!("{}{}", ORDER_NUMBER_PREFIX, suffix)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    InProduction,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::InProduction,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::InProduction => "in_production",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|st| st.as_str() == s)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub address1: String,
    #[serde(default)]
    pub address2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
    #[serde(default)]
    pub country: Option<String>,
}

/// One line item as submitted by the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDraft {
    pub name: String,
    #[serde(rename = "type", default = "default_item_type")]
    pub item_type: String,
    pub material_id: String,
    #[serde(default)]
    pub material_name: String,
    pub thickness: String,
    pub quantity: u32,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub services: Vec<String>,
    /// Client-side unit price; compared against the server's, never stored
    #[serde(default)]
    pub unit_price: Option<f64>,
    /// Client-side subtotal; compared against the server's, never stored
    #[serde(default)]
    pub subtotal: Option<f64>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_size: Option<i64>,
}

fn default_item_type() -> String {
    "template".to_string()
}

impl OrderItemDraft {
    pub fn configuration(&self) -> PartConfiguration {
        PartConfiguration {
            material_id: self.material_id.clone(),
            thickness_label: self.thickness.clone(),
            width_inches: self.width,
            height_inches: self.height,
            quantity: self.quantity,
            services: self.services.iter().cloned().collect(),
        }
    }
}

/// Body of an order creation request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderDraft {
    #[serde(default)]
    pub customer: Option<CustomerInfo>,
    #[serde(default)]
    pub shipping: Option<ShippingAddress>,
    #[serde(default)]
    pub items: Vec<OrderItemDraft>,
}

/// A line item with its server-computed breakdown
#[derive(Debug, Clone, PartialEq)]
pub struct PricedItem {
    pub draft: OrderItemDraft,
    pub breakdown: PriceBreakdown,
}

/// A fully priced order ready to be persisted
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub id: Uuid,
    pub order_number: String,
    pub status: OrderStatus,
    pub customer: CustomerInfo,
    pub shipping: ShippingAddress,
    pub items: Vec<PricedItem>,
    pub subtotal: f64,
    pub shipping_cost: f64,
    pub total: f64,
}

/// Re-price every item of a draft and assemble the order to persist
///
/// Missing customer, shipping or items fail with [`Error::Validation`]; an
/// item whose material/thickness does not resolve fails with
/// [`Error::NotFound`] and nothing is persisted.
pub fn price_order<L>(lookup: &L, draft: OrderDraft, params: &ParameterSnapshot) -> Result<NewOrder>
where
    L: ThicknessLookup + ?Sized,
{
    let (customer, shipping) = match (draft.customer, draft.shipping) {
        (Some(c), Some(s)) if !draft.items.is_empty() => (c, s),
        _ => {
            return Err(Error::Validation(
                "Missing required fields: customer, shipping, items".to_string(),
            ))
        }
    };

    let mut items = Vec::with_capacity(draft.items.len());
    for item in draft.items {
        let config = item.configuration();
        config.validate()?;
        let breakdown = pricing::compute_price(lookup, &config, Some(params))?;

        let client_price = (item.unit_price, item.subtotal);
        if client_price != (None, None)
            && client_price != (Some(breakdown.unit_price), Some(breakdown.subtotal))
        {
            warn!(
                item = %item.name,
                material = %item.material_id,
                client_unit_price = ?item.unit_price,
                client_subtotal = ?item.subtotal,
                server_unit_price = breakdown.unit_price,
                server_subtotal = breakdown.subtotal,
                "Client price differs from server price, using server price"
            );
        }

        items.push(PricedItem {
            draft: item,
            breakdown,
        });
    }

    let subtotal = round_cents(items.iter().map(|i| i.breakdown.subtotal).sum());
    let shipping_cost = params
        .get(keys::SHIPPING_BASE)
        .filter(|v| v.is_finite() && *v >= 0.0)
        .unwrap_or(0.0);
    let total = round_cents(subtotal + shipping_cost);

    Ok(NewOrder {
        id: Uuid::new_v4(),
        order_number: generate_order_number(),
        status: OrderStatus::Pending,
        customer,
        shipping,
        items,
        subtotal,
        shipping_cost,
        total,
    })
}

/// Persisted order row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: String,
    pub order_number: String,
    pub status: String,
    pub customer_first_name: String,
    pub customer_last_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub shipping_address1: String,
    pub shipping_address2: String,
    pub shipping_city: String,
    pub shipping_state: String,
    pub shipping_zip: String,
    pub shipping_country: String,
    pub subtotal: f64,
    pub shipping_cost: f64,
    pub total: f64,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Persisted line item row, services decoded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItemRecord {
    pub id: i64,
    pub order_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub material_id: String,
    pub material_name: String,
    pub thickness: String,
    pub quantity: i64,
    pub width: f64,
    pub height: f64,
    pub services: Vec<String>,
    pub unit_price: f64,
    pub discount: f64,
    pub setup_fee: f64,
    pub subtotal: f64,
    pub file_name: Option<String>,
    pub file_size: Option<i64>,
}

/// Order row plus its items, as returned by the order endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: OrderRecord,
    pub items: Vec<OrderItemRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn customer() -> CustomerInfo {
        CustomerInfo {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            phone: "555-0100".into(),
        }
    }

    fn shipping() -> ShippingAddress {
        ShippingAddress {
            address1: "1 Forge Lane".into(),
            address2: None,
            city: "Pittsburgh".into(),
            state: "PA".into(),
            zip: "15201".into(),
            country: None,
        }
    }

    fn item(qty: u32) -> OrderItemDraft {
        OrderItemDraft {
            name: "Bracket".into(),
            item_type: "template".into(),
            material_id: "mild-steel".into(),
            material_name: "Mild Steel".into(),
            thickness: "16 ga (0.060\")".into(),
            quantity: qty,
            width: 6.0,
            height: 4.0,
            services: vec![],
            unit_price: None,
            subtotal: None,
            file_name: None,
            file_size: None,
        }
    }

    #[test]
    fn order_number_shape() {
        for _ in 0..50 {
            let n = generate_order_number();
            assert!(n.starts_with(ORDER_NUMBER_PREFIX));
            let suffix = &n[ORDER_NUMBER_PREFIX.len()..];
            assert_eq!(suffix.len(), ORDER_NUMBER_LEN);
            assert!(suffix.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
        }
    }

    #[test]
    fn status_round_trips_through_str() {
        for st in OrderStatus::ALL {
            assert_eq!(OrderStatus::parse(st.as_str()), Some(st));
        }
        assert_eq!(OrderStatus::parse("lost"), None);
    }

    #[test]
    fn price_order_uses_server_breakdown_and_shipping_base() {
        let params = ParameterSnapshot::from_pairs([
            ("base_markup_pct", 50.0),
            ("kerf_waste_pct", 10.0),
            ("minimum_part", 5.0),
            ("setup_fee", 25.0),
            ("shipping_base", 12.0),
        ]);
        let mut lying = item(2);
        lying.unit_price = Some(0.01);
        lying.subtotal = Some(0.02);
        let draft = OrderDraft {
            customer: Some(customer()),
            shipping: Some(shipping()),
            items: vec![lying],
        };

        let order = price_order(&Catalog::builtin(), draft, &params).unwrap();

        assert_eq!(order.items[0].breakdown.subtotal, 35.0);
        assert_eq!(order.subtotal, 35.0);
        assert_eq!(order.shipping_cost, 12.0);
        assert_eq!(order.total, 47.0);
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn price_order_without_shipping_base_charges_nothing() {
        let params = ParameterSnapshot::from_pairs([("minimum_part", 0.0)]);
        let draft = OrderDraft {
            customer: Some(customer()),
            shipping: Some(shipping()),
            items: vec![item(1), item(1)],
        };
        let order = price_order(&Catalog::builtin(), draft, &params).unwrap();
        assert_eq!(order.shipping_cost, 0.0);
        assert_eq!(order.total, 2.64);
    }

    #[test]
    fn price_order_requires_customer_shipping_and_items() {
        let params = ParameterSnapshot::default();
        let cases = [
            OrderDraft { customer: None, shipping: Some(shipping()), items: vec![item(1)] },
            OrderDraft { customer: Some(customer()), shipping: None, items: vec![item(1)] },
            OrderDraft { customer: Some(customer()), shipping: Some(shipping()), items: vec![] },
        ];
        for draft in cases {
            assert!(matches!(
                price_order(&Catalog::builtin(), draft, &params),
                Err(Error::Validation(_))
            ));
        }
    }

    #[test]
    fn price_order_rejects_unknown_thickness() {
        let mut bad = item(1);
        bad.thickness = "7 ga".into();
        let draft = OrderDraft {
            customer: Some(customer()),
            shipping: Some(shipping()),
            items: vec![bad],
        };
        assert!(matches!(
            price_order(&Catalog::builtin(), draft, &ParameterSnapshot::default()),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn price_order_rejects_zero_quantity() {
        let draft = OrderDraft {
            customer: Some(customer()),
            shipping: Some(shipping()),
            items: vec![item(0)],
        };
        assert!(matches!(
            price_order(&Catalog::builtin(), draft, &ParameterSnapshot::default()),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn draft_accepts_wire_field_names() {
        let json = serde_json::json!({
            "customer": {"firstName": "A", "lastName": "B", "email": "a@b.c", "phone": ""},
            "shipping": {"address1": "x", "city": "y", "state": "z", "zip": "1"},
            "items": [{
                "name": "Plate", "type": "upload", "materialId": "mild-steel",
                "materialName": "Mild Steel", "thickness": "16 ga (0.060\")",
                "quantity": 3, "width": 2.0, "height": 2.0, "services": ["bending"],
                "unitPrice": 5.0, "subtotal": 15.0, "fileName": "plate.dxf", "fileSize": 2048
            }]
        });
        let draft: OrderDraft = serde_json::from_value(json).unwrap();
        let it = &draft.items[0];
        assert_eq!(it.item_type, "upload");
        assert_eq!(it.file_size, Some(2048));
        assert!(it.configuration().services.contains("bending"));
    }
}
