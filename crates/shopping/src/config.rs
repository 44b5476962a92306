//! Shopping state configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional; defaults match the production storefront.
//!
//! - `FERNLEAF_API_BASE_URL` - Backend API base URL (default: `http://localhost:3000/`)
//! - `FERNLEAF_STORAGE_DIR` - Directory for persistent state (default: `.fernleaf`)
//! - `FERNLEAF_STORAGE_NAMESPACE` - Key prefix for persisted state (default: `fernleaf`)
//! - `FERNLEAF_CART_DEBOUNCE_MS` - Cart persistence debounce (default: 300)
//! - `FERNLEAF_ABANDONMENT_WINDOW_SECS` - Idle window before a cart counts as
//!   abandoned (default: 1800)
//! - `FERNLEAF_CHECKOUT_ROUTE` - Route on which abandonment is suppressed
//!   (default: `/checkout`)
//! - `FERNLEAF_COMPARISON_CAPACITY` - Maximum products in comparison (default: 4)
//! - `FERNLEAF_ORDERS_CACHE_TTL_SECS` - Order fetch cache TTL (default: 300)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/";
const DEFAULT_STORAGE_DIR: &str = ".fernleaf";
const DEFAULT_STORAGE_NAMESPACE: &str = "fernleaf";
const DEFAULT_CART_DEBOUNCE_MS: u64 = 300;
const DEFAULT_ABANDONMENT_WINDOW_SECS: u64 = 30 * 60;
const DEFAULT_CHECKOUT_ROUTE: &str = "/checkout";
const DEFAULT_COMPARISON_CAPACITY: usize = 4;
const DEFAULT_SUCCESS_NOTICE_WINDOW_MS: u64 = 500;
const DEFAULT_CONFLICT_NOTICE_WINDOW_MS: u64 = 1000;
const DEFAULT_ORDERS_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_ORDERS_CACHE_CAPACITY: u64 = 1000;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Shopping state configuration.
#[derive(Debug, Clone)]
pub struct ShoppingConfig {
    /// Backend API configuration.
    pub api: ApiConfig,
    /// Persistent storage configuration.
    pub storage: StorageConfig,
    /// Cart store configuration.
    pub cart: CartConfig,
    /// Comparison store configuration.
    pub comparison: ComparisonConfig,
    /// Abandonment tracker configuration.
    pub abandonment: AbandonmentConfig,
}

/// Backend API endpoints and fetch-layer caching.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL joined with `api/...` paths.
    pub base_url: Url,
    /// TTL for the in-memory order fetch cache.
    pub orders_cache_ttl: Duration,
    /// Entry bound for the in-memory order fetch cache.
    pub orders_cache_capacity: u64,
}

/// Where and under what namespace state is persisted.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory backing [`crate::storage::FileStorage`].
    pub dir: PathBuf,
    /// Prefix for every persisted key, e.g. `fernleaf` -> `fernleaf-cart`.
    pub namespace: String,
}

impl StorageConfig {
    /// The storage key owned by a store, e.g. `key_for("cart")`.
    #[must_use]
    pub fn key_for(&self, store: &str) -> String {
        format!("{}-{store}", self.namespace)
    }
}

/// Cart store tuning.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Quiet period before cart state is persisted.
    pub debounce: Duration,
}

/// Comparison store tuning.
#[derive(Debug, Clone)]
pub struct ComparisonConfig {
    /// Maximum concurrent products in the comparison set.
    pub capacity: usize,
    /// Suppression window for duplicate success notices.
    pub success_notice_window: Duration,
    /// Suppression window for duplicate conflict notices.
    pub conflict_notice_window: Duration,
}

/// Abandonment tracker tuning.
#[derive(Debug, Clone)]
pub struct AbandonmentConfig {
    /// Idle window after which a non-empty cart counts as abandoned.
    pub window: Duration,
    /// Route on which abandonment is never classified.
    pub checkout_route: String,
}

impl Default for ShoppingConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            storage: StorageConfig::default(),
            cart: CartConfig::default(),
            comparison: ComparisonConfig::default(),
            abandonment: AbandonmentConfig::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            // The default is a valid URL; parsing it cannot fail.
            base_url: Url::parse(DEFAULT_API_BASE_URL)
                .unwrap_or_else(|_| unreachable!("default base URL is valid")),
            orders_cache_ttl: Duration::from_secs(DEFAULT_ORDERS_CACHE_TTL_SECS),
            orders_cache_capacity: DEFAULT_ORDERS_CACHE_CAPACITY,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            namespace: DEFAULT_STORAGE_NAMESPACE.to_owned(),
        }
    }
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_CART_DEBOUNCE_MS),
        }
    }
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_COMPARISON_CAPACITY,
            success_notice_window: Duration::from_millis(DEFAULT_SUCCESS_NOTICE_WINDOW_MS),
            conflict_notice_window: Duration::from_millis(DEFAULT_CONFLICT_NOTICE_WINDOW_MS),
        }
    }
}

impl Default for AbandonmentConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(DEFAULT_ABANDONMENT_WINDOW_SECS),
            checkout_route: DEFAULT_CHECKOUT_ROUTE.to_owned(),
        }
    }
}

impl ShoppingConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = get_env_or_default("FERNLEAF_API_BASE_URL", DEFAULT_API_BASE_URL);
        let base_url = Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("FERNLEAF_API_BASE_URL".to_owned(), e.to_string())
        })?;

        Ok(Self {
            api: ApiConfig {
                base_url,
                orders_cache_ttl: Duration::from_secs(get_parsed_or_default(
                    "FERNLEAF_ORDERS_CACHE_TTL_SECS",
                    DEFAULT_ORDERS_CACHE_TTL_SECS,
                )?),
                orders_cache_capacity: DEFAULT_ORDERS_CACHE_CAPACITY,
            },
            storage: StorageConfig {
                dir: PathBuf::from(get_env_or_default(
                    "FERNLEAF_STORAGE_DIR",
                    DEFAULT_STORAGE_DIR,
                )),
                namespace: get_env_or_default(
                    "FERNLEAF_STORAGE_NAMESPACE",
                    DEFAULT_STORAGE_NAMESPACE,
                ),
            },
            cart: CartConfig {
                debounce: Duration::from_millis(get_parsed_or_default(
                    "FERNLEAF_CART_DEBOUNCE_MS",
                    DEFAULT_CART_DEBOUNCE_MS,
                )?),
            },
            comparison: ComparisonConfig {
                capacity: get_parsed_or_default(
                    "FERNLEAF_COMPARISON_CAPACITY",
                    DEFAULT_COMPARISON_CAPACITY,
                )?,
                ..ComparisonConfig::default()
            },
            abandonment: AbandonmentConfig {
                window: Duration::from_secs(get_parsed_or_default(
                    "FERNLEAF_ABANDONMENT_WINDOW_SECS",
                    DEFAULT_ABANDONMENT_WINDOW_SECS,
                )?),
                checkout_route: get_env_or_default(
                    "FERNLEAF_CHECKOUT_ROUTE",
                    DEFAULT_CHECKOUT_ROUTE,
                ),
            },
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to a default when absent.
fn get_parsed_or_default<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string())),
        Err(_) => Ok(default),
    }
}
