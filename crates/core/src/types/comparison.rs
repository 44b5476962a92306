//! Comparison snapshots.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;

/// A product snapshot staged for side-by-side comparison.
///
/// Richer than a cart or wishlist entry: the comparison page renders every
/// attribute the catalog knows about, so the snapshot carries them all.
/// Uniqueness is by `id`; the comparison set is bounded (default 4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonProduct {
    pub id: ProductId,
    pub product_id: ProductId,
    pub name: String,
    pub slug: String,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare_at_price: Option<Decimal>,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub in_stock: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sales_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benefits: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<Decimal>,
    /// Free-form dimensions object; the backend has no fixed schema for it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<serde_json::Value>,
}

impl ComparisonProduct {
    /// Minimal snapshot with only the required attributes set.
    #[must_use]
    pub fn basic(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        price: Decimal,
        in_stock: bool,
    ) -> Self {
        let id = id.into();
        let name = name.into();
        let slug = name.to_lowercase().replace(' ', "-");
        Self {
            product_id: id.clone(),
            id,
            name,
            slug,
            price,
            compare_at_price: None,
            image: String::new(),
            short_description: None,
            description: None,
            in_stock,
            stock_quantity: None,
            rating: None,
            reviews_count: None,
            sales_count: None,
            sku: None,
            category: None,
            benefits: None,
            ingredients: None,
            usage_instructions: None,
            storage_instructions: None,
            manufacturer: None,
            weight: None,
            dimensions: None,
        }
    }
}
