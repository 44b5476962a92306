//! Abandoned-cart recovery submission.
//!
//! Hands an abandoned-cart snapshot to the backend so the recovery email
//! campaign can pick it up. This is a background marketing concern: callers
//! submit fire-and-forget and log failures instead of surfacing them.

use serde_json::json;
use tracing::instrument;
use url::Url;

use fernleaf_core::{AbandonedCart, Email};

use crate::api::ApiError;

/// Client for `POST /api/cart/abandoned`.
#[derive(Clone)]
pub struct RecoveryClient {
    client: reqwest::Client,
    endpoint: Option<Url>,
}

impl RecoveryClient {
    /// Create a recovery client against the API base URL.
    #[must_use]
    pub fn new(base_url: &Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: base_url.join("api/cart/abandoned").ok(),
        }
    }

    /// Submit an abandoned cart for email recovery.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it. Callers
    /// are expected to log and move on; the acknowledgement carries no data.
    #[instrument(skip(self, cart), fields(cart_id = %cart.id))]
    pub async fn submit(&self, cart: &AbandonedCart, email: &Email) -> Result<(), ApiError> {
        let Some(endpoint) = self.endpoint.clone() else {
            // Unjoinable base URL; nothing to submit to.
            return Ok(());
        };

        let body = json!({
            "cart": cart,
            "email": email,
        });

        let response = self.client.post(endpoint).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: message.chars().take(200).collect(),
            });
        }

        Ok(())
    }
}
