//! Backend REST API clients.
//!
//! The state layer consumes a handful of storefront endpoints; the clients
//! here own the HTTP plumbing and response unwrapping so the stores never see
//! `reqwest` types.

mod orders;

pub use orders::OrdersClient;

use fernleaf_core::OrderId;
use thiserror::Error;

/// Errors that can occur when talking to the backend API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connect, timeout, body read).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("unexpected status {status}: {message}")]
    Status { status: u16, message: String },

    /// The requested order does not exist.
    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    /// The response body did not match the expected shape.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A request URL could not be built from the configured base.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}
