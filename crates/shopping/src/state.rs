//! Shopping state composition root.
//!
//! Wires configuration, storage, clock, session, and notifier into the
//! stores, tracker, and API clients. There are no ambient singletons: hosts
//! build one `ShoppingState` at their root, tests build as many isolated
//! instances as they need.

use std::sync::Arc;

use crate::abandonment::AbandonmentTracker;
use crate::api::OrdersClient;
use crate::clock::{Clock, SystemClock};
use crate::config::ShoppingConfig;
use crate::error::Result;
use crate::notify::{Notifier, TracingNotifier};
use crate::services::{AnalyticsTracker, RecoveryClient};
use crate::session::{BrowsingSession, SharedSession};
use crate::storage::{FileStorage, Storage};
use crate::stores::{CartStore, ComparisonStore, WishlistStore};
use crate::tracking::OrderTracker;

/// Shared state for one shopping session.
///
/// Cheaply cloneable via `Arc`; all clones observe the same stores.
#[derive(Clone)]
pub struct ShoppingState {
    inner: Arc<ShoppingStateInner>,
}

struct ShoppingStateInner {
    config: ShoppingConfig,
    analytics: AnalyticsTracker,
    cart: CartStore,
    wishlist: WishlistStore,
    comparison: ComparisonStore,
    abandonment: AbandonmentTracker,
    orders: OrderTracker,
}

impl ShoppingState {
    /// Compose the state layer against a backend.
    ///
    /// Analytics and abandonment-recovery submissions go to the configured
    /// API base URL. Call within a tokio runtime so the abandonment timer can
    /// be scheduled.
    #[must_use]
    pub fn new(
        config: ShoppingConfig,
        storage: Arc<dyn Storage>,
        clock: Arc<dyn Clock>,
        session: Arc<dyn BrowsingSession>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let recovery = Some(RecoveryClient::new(&config.api.base_url));
        let analytics = AnalyticsTracker::new(Some(&config.api.base_url), Arc::clone(&clock));
        Self::compose(config, storage, clock, session, notifier, analytics, recovery)
    }

    /// Compose the state layer without a backend: analytics are only logged
    /// and buffered, and no recovery submissions are made. For tests and
    /// headless hosts.
    #[must_use]
    pub fn offline(
        config: ShoppingConfig,
        storage: Arc<dyn Storage>,
        clock: Arc<dyn Clock>,
        session: Arc<dyn BrowsingSession>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let analytics = AnalyticsTracker::disabled(Arc::clone(&clock));
        Self::compose(config, storage, clock, session, notifier, analytics, None)
    }

    /// Compose from environment variables with production defaults: file
    /// storage, the system clock, and log-backed notices.
    ///
    /// Returns the session handle alongside so the host can push route and
    /// auth changes into it.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or the storage directory
    /// cannot be opened.
    pub fn from_env() -> Result<(Self, Arc<SharedSession>)> {
        let config = ShoppingConfig::from_env()?;
        let storage: Arc<dyn Storage> = Arc::new(FileStorage::open(&config.storage.dir)?);
        let session = Arc::new(SharedSession::new());

        let state = Self::new(
            config,
            storage,
            Arc::new(SystemClock),
            session.clone(),
            Arc::new(TracingNotifier),
        );
        Ok((state, session))
    }

    #[allow(clippy::too_many_arguments)]
    fn compose(
        config: ShoppingConfig,
        storage: Arc<dyn Storage>,
        clock: Arc<dyn Clock>,
        session: Arc<dyn BrowsingSession>,
        notifier: Arc<dyn Notifier>,
        analytics: AnalyticsTracker,
        recovery: Option<RecoveryClient>,
    ) -> Self {
        let cart = CartStore::new(
            Arc::clone(&storage),
            config.storage.key_for("cart"),
            &config.cart,
            analytics.clone(),
        );
        let wishlist = WishlistStore::new(
            Arc::clone(&storage),
            config.storage.key_for("wishlist"),
            analytics.clone(),
            Arc::clone(&notifier),
        );
        let comparison = ComparisonStore::new(
            Arc::clone(&storage),
            config.storage.key_for("comparison"),
            config.comparison.clone(),
            notifier,
            Arc::clone(&clock),
        );

        let abandonment = AbandonmentTracker::new(
            storage,
            config.storage.key_for("abandoned-carts"),
            config.abandonment.clone(),
            clock,
            session,
            analytics.clone(),
            recovery,
        );
        abandonment.watch(cart.subscribe());

        let orders = OrderTracker::new(OrdersClient::new(
            config.api.base_url.clone(),
            config.api.orders_cache_ttl,
            config.api.orders_cache_capacity,
        ));

        Self {
            inner: Arc::new(ShoppingStateInner {
                config,
                analytics,
                cart,
                wishlist,
                comparison,
                abandonment,
                orders,
            }),
        }
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &ShoppingConfig {
        &self.inner.config
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// Get a reference to the wishlist store.
    #[must_use]
    pub fn wishlist(&self) -> &WishlistStore {
        &self.inner.wishlist
    }

    /// Get a reference to the comparison store.
    #[must_use]
    pub fn comparison(&self) -> &ComparisonStore {
        &self.inner.comparison
    }

    /// Get a reference to the abandonment tracker.
    #[must_use]
    pub fn abandonment(&self) -> &AbandonmentTracker {
        &self.inner.abandonment
    }

    /// Get a reference to the order tracker.
    #[must_use]
    pub fn orders(&self) -> &OrderTracker {
        &self.inner.orders
    }

    /// Get a reference to the analytics tracker.
    #[must_use]
    pub fn analytics(&self) -> &AnalyticsTracker {
        &self.inner.analytics
    }

    /// Flush pending writes and stop background observation. Hosts call this
    /// once on shutdown.
    pub async fn shutdown(&self) {
        self.inner.cart.flush();
        self.inner.abandonment.stop();
        self.inner.analytics.flush_events().await;
    }
}
