//! Storefront analytics tracking.
//!
//! Every commerce-relevant state change emits an analytics event. Events are
//! logged, buffered in memory (most recent 100), and - when an API base URL
//! is configured - submitted fire-and-forget to the backend. Submission
//! failures are logged and never retried; analytics must not break shopping.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use url::Url;

use fernleaf_core::{CartItem, OrderId, ProductId};

use crate::clock::Clock;

/// Most recent events retained for batch submission.
const EVENT_BUFFER_LIMIT: usize = 100;

/// Wishlist mutation direction, for the wishlist event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WishlistAction {
    Add,
    Remove,
}

impl WishlistAction {
    const fn action_label(self) -> &'static str {
        match self {
            Self::Add => "Add to Wishlist",
            Self::Remove => "Remove from Wishlist",
        }
    }
}

/// A tracked analytics event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsEvent {
    pub event: String,
    pub category: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Decimal>,
    pub metadata: serde_json::Value,
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Wire shape for single-event submission.
#[derive(Serialize)]
struct TrackPayload<'a> {
    event_type: &'a str,
    data: &'a serde_json::Value,
    session_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<&'a str>,
    timestamp: DateTime<Utc>,
}

/// Analytics tracker for the shopping session.
///
/// Cheaply cloneable; clones share the session id, buffer, and user binding.
#[derive(Clone)]
pub struct AnalyticsTracker {
    inner: Arc<AnalyticsInner>,
}

struct AnalyticsInner {
    client: reqwest::Client,
    track_endpoint: Option<Url>,
    batch_endpoint: Option<Url>,
    clock: Arc<dyn Clock>,
    session_id: String,
    user_id: RwLock<Option<String>>,
    buffer: Mutex<VecDeque<AnalyticsEvent>>,
}

impl AnalyticsTracker {
    /// Create a tracker. With `base_url` set, events are also submitted to
    /// the backend; without it they are only logged and buffered.
    #[must_use]
    pub fn new(base_url: Option<&Url>, clock: Arc<dyn Clock>) -> Self {
        let track_endpoint = base_url.and_then(|u| u.join("api/analytics/track").ok());
        let batch_endpoint = base_url.and_then(|u| u.join("api/analytics/batch").ok());

        Self {
            inner: Arc::new(AnalyticsInner {
                client: reqwest::Client::new(),
                track_endpoint,
                batch_endpoint,
                clock,
                session_id: format!("session_{}", uuid::Uuid::new_v4()),
                user_id: RwLock::new(None),
                buffer: Mutex::new(VecDeque::new()),
            }),
        }
    }

    /// Tracker without a backend, for tests and headless hosts.
    #[must_use]
    pub fn disabled(clock: Arc<dyn Clock>) -> Self {
        Self::new(None, clock)
    }

    /// Bind (or unbind) the authenticated user for subsequent events.
    pub fn set_user(&self, user_id: Option<String>) {
        *self.inner.user_id.write() = user_id;
    }

    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.inner.session_id
    }

    /// Snapshot of the buffered events, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.inner.buffer.lock().iter().cloned().collect()
    }

    // =========================================================================
    // Emission points
    // =========================================================================

    pub fn track_product_view(&self, product_id: &ProductId, name: &str, price: Decimal) {
        self.record(
            "product_view",
            "Ecommerce",
            "Product View",
            Some(name.to_owned()),
            Some(price),
            json!({
                "product_id": product_id,
                "product_name": name,
                "price": price,
            }),
            Some("product_view"),
        );
    }

    /// Track an add-to-cart against the resulting line, so the quantity is
    /// the post-increment count rather than always 1.
    pub fn track_add_to_cart(&self, line: &CartItem) {
        let total_value = line.line_total();
        self.record(
            "add_to_cart",
            "Ecommerce",
            "Add to Cart",
            Some(line.name.clone()),
            Some(total_value),
            json!({
                "product_id": line.product_id,
                "product_name": line.name,
                "price": line.price,
                "quantity": line.quantity,
                "total_value": total_value,
            }),
            Some("cart_add"),
        );
    }

    pub fn track_remove_from_cart(&self, product_id: &ProductId, name: &str, price: Decimal) {
        self.record(
            "remove_from_cart",
            "Ecommerce",
            "Remove from Cart",
            Some(name.to_owned()),
            Some(price),
            json!({
                "product_id": product_id,
                "product_name": name,
                "price": price,
            }),
            Some("cart_remove"),
        );
    }

    pub fn track_cart_abandonment(&self, cart_value: Decimal, item_count: usize) {
        self.record(
            "cart_abandonment",
            "Ecommerce",
            "Cart Abandoned",
            None,
            Some(cart_value),
            json!({
                "cart_value": cart_value,
                "item_count": item_count,
            }),
            Some("cart_abandoned"),
        );
    }

    pub fn track_wishlist_action(
        &self,
        action: WishlistAction,
        product_id: &ProductId,
        name: &str,
    ) {
        self.record(
            "wishlist",
            "Engagement",
            action.action_label(),
            Some(name.to_owned()),
            None,
            json!({
                "product_id": product_id,
                "product_name": name,
            }),
            None,
        );
    }

    pub fn track_checkout_started(&self, cart_value: Decimal, item_count: usize) {
        self.record(
            "checkout_start",
            "Ecommerce",
            "Checkout Started",
            None,
            Some(cart_value),
            json!({
                "cart_value": cart_value,
                "item_count": item_count,
            }),
            None,
        );
    }

    pub fn track_purchase(
        &self,
        order_id: &OrderId,
        order_number: &str,
        total_amount: Decimal,
        item_count: usize,
    ) {
        self.record(
            "purchase",
            "Ecommerce",
            "Purchase",
            Some(order_number.to_owned()),
            Some(total_amount),
            json!({
                "order_id": order_id,
                "order_number": order_number,
                "total_amount": total_amount,
                "item_count": item_count,
            }),
            Some("purchase"),
        );
    }

    // =========================================================================
    // Internals
    // =========================================================================

    #[allow(clippy::too_many_arguments)]
    fn record(
        &self,
        event: &str,
        category: &str,
        action: &str,
        label: Option<String>,
        value: Option<Decimal>,
        metadata: serde_json::Value,
        api_event: Option<&'static str>,
    ) {
        let tracked = AnalyticsEvent {
            event: event.to_owned(),
            category: category.to_owned(),
            action: action.to_owned(),
            label,
            value,
            metadata,
            timestamp: self.inner.clock.now(),
            session_id: self.inner.session_id.clone(),
            user_id: self.inner.user_id.read().clone(),
        };

        tracing::debug!(
            event = %tracked.event,
            action = %tracked.action,
            label = ?tracked.label,
            "analytics event"
        );

        {
            let mut buffer = self.inner.buffer.lock();
            buffer.push_back(tracked.clone());
            while buffer.len() > EVENT_BUFFER_LIMIT {
                buffer.pop_front();
            }
        }

        if let Some(event_type) = api_event {
            self.submit(event_type, tracked);
        }
    }

    /// Fire-and-forget single-event submission. Skipped silently when no
    /// endpoint is configured or no runtime is available.
    fn submit(&self, event_type: &'static str, event: AnalyticsEvent) {
        let Some(endpoint) = self.inner.track_endpoint.clone() else {
            return;
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::debug!(event_type, "no runtime; skipping analytics submission");
            return;
        };

        let inner = Arc::clone(&self.inner);
        runtime.spawn(async move {
            let payload = TrackPayload {
                event_type,
                data: &event.metadata,
                session_id: &event.session_id,
                user_id: event.user_id.as_deref(),
                timestamp: event.timestamp,
            };
            let result = inner.client.post(endpoint).json(&payload).send().await;
            match result {
                Ok(response) if !response.status().is_success() => {
                    tracing::warn!(
                        event_type,
                        status = %response.status(),
                        "analytics submission rejected"
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(event_type, error = %e, "analytics submission failed");
                }
            }
        });
    }

    /// Drain the buffer to the batch endpoint. Without a configured endpoint
    /// the buffer is simply discarded.
    pub async fn flush_events(&self) {
        let events: Vec<AnalyticsEvent> = {
            let mut buffer = self.inner.buffer.lock();
            buffer.drain(..).collect()
        };
        if events.is_empty() {
            return;
        }

        let Some(endpoint) = self.inner.batch_endpoint.clone() else {
            tracing::debug!(count = events.len(), "no endpoint; dropping analytics batch");
            return;
        };

        let body = json!({ "events": events });
        match self.inner.client.post(endpoint).json(&body).send().await {
            Ok(response) if response.status().is_success() => {}
            Ok(response) => {
                tracing::warn!(status = %response.status(), "analytics batch rejected");
            }
            Err(e) => {
                tracing::warn!(error = %e, "analytics batch failed");
            }
        }
    }
}
