//! Wishlist entries.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;

/// A saved product reference.
///
/// Wishlist membership has set semantics keyed by `product_id`: an item is
/// either present or absent, with no quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistItem {
    pub id: ProductId,
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}
