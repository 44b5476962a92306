//! Unified error handling for the shopping state layer.
//!
//! Store mutators never return errors for expected edge cases (absent ids,
//! zero quantities, corrupted storage) - those degrade as described on each
//! store. `ShoppingError` covers the operations that can genuinely fail:
//! composition-root construction and order fetches.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Application-level error type for the shopping state layer.
#[derive(Debug, Error)]
pub enum ShoppingError {
    /// Persistent storage could not be opened or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A backend API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for `ShoppingError`.
pub type Result<T> = std::result::Result<T, ShoppingError>;
