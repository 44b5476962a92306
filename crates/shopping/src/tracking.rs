//! Order shipment tracking.
//!
//! A pure reducer from an [`OrderRecord`] to its presentation-ready timeline,
//! plus the [`OrderTracker`] that fetches orders and remembers per-order
//! tracking state so consumers can distinguish loading, failure, and a
//! produced timeline.

use std::collections::HashMap;

use parking_lot::RwLock;

use fernleaf_core::{OrderId, OrderRecord, OrderStatus, TrackingEvent, TrackingStatus};

use crate::api::{ApiError, OrdersClient};

/// The fixed shipment progression, in order, with display labels.
const STATUS_STEPS: [(OrderStatus, &str); 5] = [
    (OrderStatus::Pending, "Order Placed"),
    (OrderStatus::Confirmed, "Order Confirmed"),
    (OrderStatus::Processing, "Processing"),
    (OrderStatus::Shipped, "Shipped"),
    (OrderStatus::Delivered, "Delivered"),
];

/// Derive the shipment timeline for an order.
///
/// Steps at or before the order's status index are completed; the status
/// index itself is current. A step carries a timestamp only when the record
/// has a dedicated field for it (creation for pending, shipped/delivered for
/// those statuses); the current step carries a tracking-number description
/// while shipped. Steps with neither a timestamp nor currency are excluded,
/// so the result is history up to and including the current status.
///
/// A status outside the progression (cancelled, unknown) marks nothing
/// completed or current and yields a minimal timeline.
#[must_use]
pub fn build_tracking_status(order: &OrderRecord) -> TrackingStatus {
    let current_index = STATUS_STEPS
        .iter()
        .position(|(status, _)| *status == order.status);

    let events: Vec<TrackingEvent> = STATUS_STEPS
        .iter()
        .enumerate()
        .filter_map(|(index, (status, label))| {
            let completed = current_index.is_some_and(|current| index <= current);
            let current = current_index.is_some_and(|current| index == current);

            let timestamp = match status {
                OrderStatus::Pending => Some(order.created_at),
                OrderStatus::Shipped => order.shipped_at,
                OrderStatus::Delivered => order.delivered_at,
                _ => None,
            };

            let description = if current && *status == OrderStatus::Shipped {
                order
                    .tracking_number
                    .as_ref()
                    .map(|number| format!("Tracking: {number}"))
            } else {
                None
            };

            (timestamp.is_some() || current).then(|| TrackingEvent {
                id: status.as_str().to_owned(),
                status: *status,
                label: (*label).to_owned(),
                completed,
                current,
                timestamp,
                description,
            })
        })
        .collect();

    TrackingStatus {
        order_id: order.id.clone(),
        order_number: order
            .order_number
            .clone()
            .unwrap_or_else(|| order.id.to_string()),
        current_status: order.status,
        events,
        estimated_delivery: order.estimated_delivery.clone(),
        tracking_number: order.tracking_number.clone(),
        carrier: order.carrier.clone(),
    }
}

/// Per-order tracking state, as exposed to consumers.
#[derive(Debug, Clone, Default)]
pub enum TrackingState {
    /// No fetch has been requested for this order.
    #[default]
    Idle,
    /// A fetch is in flight.
    Loading,
    /// The fetch failed; distinct from "no data yet".
    Failed(String),
    /// A timeline was produced.
    Ready(TrackingStatus),
}

impl TrackingState {
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Fetches orders and derives their tracking timelines on demand.
pub struct OrderTracker {
    orders: OrdersClient,
    history: RwLock<HashMap<OrderId, TrackingState>>,
}

impl OrderTracker {
    #[must_use]
    pub fn new(orders: OrdersClient) -> Self {
        Self {
            orders,
            history: RwLock::new(HashMap::new()),
        }
    }

    /// Current tracking state for an order.
    #[must_use]
    pub fn state(&self, order_id: &OrderId) -> TrackingState {
        self.history
            .read()
            .get(order_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Fetch an order and derive its timeline, recording the state
    /// transitions along the way.
    ///
    /// # Errors
    ///
    /// Returns the fetch error; the same failure is retained in [`state`]
    /// for consumers that poll instead.
    ///
    /// [`state`]: Self::state
    pub async fn track_order(&self, order_id: &OrderId) -> Result<TrackingStatus, ApiError> {
        self.history
            .write()
            .insert(order_id.clone(), TrackingState::Loading);

        match self.orders.get_order(order_id).await {
            Ok(order) => {
                let status = build_tracking_status(&order);
                self.history
                    .write()
                    .insert(order_id.clone(), TrackingState::Ready(status.clone()));
                Ok(status)
            }
            Err(e) => {
                self.history
                    .write()
                    .insert(order_id.clone(), TrackingState::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    /// Track a batch of orders. Orders already tracked are skipped; a failing
    /// fetch is logged per id and does not abort the rest of the batch.
    pub async fn track_orders(&self, order_ids: &[OrderId]) {
        for order_id in order_ids {
            let seen = self.history.read().contains_key(order_id);
            if seen {
                continue;
            }
            if let Err(e) = self.track_order(order_id).await {
                tracing::warn!(order_id = %order_id, error = %e, "failed to track order");
            }
        }
    }

    /// Forget the tracking state for an order.
    pub fn clear_tracking(&self, order_id: &OrderId) {
        self.history.write().remove(order_id);
    }
}
