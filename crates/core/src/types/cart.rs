//! Cart line items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::{CartLineId, ProductId};

/// A line in the shopping cart.
///
/// Line identity equals the product id in the current catalog (one variant per
/// product). The cart holds at most one line per id; `quantity` is always at
/// least 1 - a zero-or-below quantity removes the line instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartLineId,
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    /// Image URL, or an emoji placeholder for products without photography.
    pub image: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
}

impl CartItem {
    /// Price of the line as a whole (unit price times quantity).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Input for adding a line to the cart.
///
/// Quantity is not part of the input: a first add inserts with quantity 1 and
/// repeat adds increment the existing line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItemInput {
    pub id: CartLineId,
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
}

impl CartItemInput {
    /// Build the cart line this input produces at the given quantity.
    #[must_use]
    pub fn into_line(self, quantity: u32) -> CartItem {
        CartItem {
            id: self.id,
            product_id: self.product_id,
            name: self.name,
            price: self.price,
            image: self.image,
            quantity,
            sku: self.sku,
        }
    }
}
