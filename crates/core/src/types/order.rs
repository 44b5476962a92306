//! Order records as returned by the orders API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::id::OrderId;

/// Order lifecycle status.
///
/// The shipment timeline is derived from the fixed progression
/// `pending -> confirmed -> processing -> shipped -> delivered`. Statuses
/// outside that progression (including anything the backend adds later, which
/// deserializes as [`Self::Unknown`]) produce a minimal timeline rather than
/// an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// Stable status key, matching the backend's wire values.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An order as fetched from `GET /api/orders/:id`.
///
/// Only `id`, `status`, and `created_at` are guaranteed; the shipping fields
/// appear as the order progresses. `estimated_delivery` is a
/// backend-formatted date string and is passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: OrderId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipped_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_delivery: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        let json = serde_json::to_string(&OrderStatus::Shipped).unwrap();
        assert_eq!(json, "\"shipped\"");
        let parsed: OrderStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, OrderStatus::Shipped);
    }

    #[test]
    fn test_unexpected_status_parses_as_unknown() {
        let parsed: OrderStatus = serde_json::from_str("\"refund_pending\"").unwrap();
        assert_eq!(parsed, OrderStatus::Unknown);
    }

    #[test]
    fn test_minimal_order_deserializes() {
        let json = r#"{
            "id": "ord-1",
            "status": "pending",
            "created_at": "2024-01-01T00:00:00Z"
        }"#;
        let order: OrderRecord = serde_json::from_str(json).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.shipped_at.is_none());
        assert!(order.tracking_number.is_none());
    }
}
