//! Shipment-tracking timeline types.
//!
//! Derived presentation data, regenerated on every order fetch and never
//! persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::id::OrderId;
use crate::types::order::OrderStatus;

/// One step of the shipment timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingEvent {
    /// Stable status key (doubles as the element id in timeline UIs).
    pub id: String,
    pub status: OrderStatus,
    /// Human-readable step label, e.g. "Order Placed".
    pub label: String,
    pub completed: bool,
    pub current: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The full tracking view for one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingStatus {
    pub order_id: OrderId,
    /// Customer-facing order number; falls back to the order id.
    pub order_number: String,
    pub current_status: OrderStatus,
    /// History up to and including the current status, oldest first.
    pub events: Vec<TrackingEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_delivery: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier: Option<String>,
}
