//! Shopping cart
//!
//! Owned container of priced line items. Quantity changes re-run the engine
//! instead of rescaling the stored subtotal, since the setup fee is charged
//! once per line item and does not scale with quantity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::ThicknessLookup;
use crate::order::OrderItemDraft;
use crate::params::ParameterSnapshot;
use crate::pricing::{self, round_cents, PartConfiguration, PriceBreakdown};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: Uuid,
    pub name: String,
    pub item_type: String,
    pub configuration: PartConfiguration,
    pub material_name: String,
    pub breakdown: PriceBreakdown,
    pub file_name: Option<String>,
    pub file_size: Option<i64>,
}

impl CartItem {
    pub fn new(
        name: impl Into<String>,
        configuration: PartConfiguration,
        material_name: impl Into<String>,
        breakdown: PriceBreakdown,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            item_type: "template".to_string(),
            configuration,
            material_name: material_name.into(),
            breakdown,
            file_name: None,
            file_size: None,
        }
    }

    /// Attach an uploaded design file
    pub fn with_file(mut self, file_name: impl Into<String>, file_size: i64) -> Self {
        self.item_type = "upload".to_string();
        self.file_name = Some(file_name.into());
        self.file_size = Some(file_size);
        self
    }

    pub fn to_order_item(&self) -> OrderItemDraft {
        let c = &self.configuration;
        OrderItemDraft {
            name: self.name.clone(),
            item_type: self.item_type.clone(),
            material_id: c.material_id.clone(),
            material_name: self.material_name.clone(),
            thickness: c.thickness_label.clone(),
            quantity: c.quantity,
            width: c.width_inches,
            height: c.height_inches,
            services: c.services.iter().cloned().collect(),
            unit_price: Some(self.breakdown.unit_price),
            subtotal: Some(self.breakdown.subtotal),
            file_name: self.file_name.clone(),
            file_size: self.file_size,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add an item; returns its id
    pub fn add_item(&mut self, item: CartItem) -> Uuid {
        let id = item.id;
        self.items.push(item);
        id
    }

    /// Remove an item; returns it if it was present
    pub fn remove_item(&mut self, id: Uuid) -> Option<CartItem> {
        let idx = self.items.iter().position(|i| i.id == id)?;
        Some(self.items.remove(idx))
    }

    /// Change an item's quantity and re-price it
    ///
    /// `params = None` prices against the built-in defaults, as the engine
    /// does for a local estimate.
    pub fn set_quantity<L>(
        &mut self,
        id: Uuid,
        quantity: u32,
        lookup: &L,
        params: Option<&ParameterSnapshot>,
    ) -> Result<&CartItem>
    where
        L: ThicknessLookup + ?Sized,
    {
        if quantity < 1 {
            return Err(Error::Validation("quantity must be at least 1".to_string()));
        }
        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| Error::NotFound(format!("cart item {}", id)))?;

        let mut configuration = item.configuration.clone();
        configuration.quantity = quantity;
        let breakdown = pricing::compute_price(lookup, &configuration, params)?;

        item.configuration = configuration;
        item.breakdown = breakdown;
        Ok(item)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of line-item subtotals, rounded to cents
    pub fn subtotal(&self) -> f64 {
        round_cents(self.items.iter().map(|i| i.breakdown.subtotal).sum())
    }

    pub fn to_order_items(&self) -> Vec<OrderItemDraft> {
        self.items.iter().map(CartItem::to_order_item).collect()
    }
}
