//! Orders API client.
//!
//! Fetches order records for shipment tracking. Responses are cached in
//! memory with `moka` (5-minute TTL by default) so repeated tracking requests
//! within a session do not hammer the backend.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use fernleaf_core::{OrderId, OrderRecord};

use super::ApiError;

/// Client for `GET /api/orders/:id`.
#[derive(Clone)]
pub struct OrdersClient {
    inner: Arc<OrdersClientInner>,
}

struct OrdersClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<OrderId, OrderRecord>,
}

/// Response envelope: the API wraps the record as `{ "order": ... }`.
#[derive(Debug, Deserialize)]
struct OrderEnvelope {
    order: OrderRecord,
}

impl OrdersClient {
    /// Create a new orders API client.
    #[must_use]
    pub fn new(base_url: Url, cache_ttl: Duration, cache_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(cache_capacity)
            .time_to_live(cache_ttl)
            .build();

        Self {
            inner: Arc::new(OrdersClientInner {
                client: reqwest::Client::new(),
                base_url,
                cache,
            }),
        }
    }

    /// Fetch an order by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the order does not exist, the request fails, or
    /// the response cannot be parsed.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order(&self, order_id: &OrderId) -> Result<OrderRecord, ApiError> {
        if let Some(order) = self.inner.cache.get(order_id).await {
            debug!("Cache hit for order");
            return Ok(order);
        }

        let url = self
            .inner
            .base_url
            .join(&format!("api/orders/{order_id}"))?;

        let response = self.inner.client.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::OrderNotFound(order_id.clone()));
        }

        // Read the body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(200).collect::<String>(),
                "Orders API returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let envelope: OrderEnvelope = serde_json::from_str(&body)?;
        self.inner
            .cache
            .insert(order_id.clone(), envelope.order.clone())
            .await;

        Ok(envelope.order)
    }
}
