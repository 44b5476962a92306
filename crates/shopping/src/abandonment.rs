//! Abandoned-cart tracking.
//!
//! State machine: Idle -> Watching (cart becomes non-empty) -> Abandoned
//! (the idle window elapses off the checkout route) -> Recovered (terminal
//! for that record). Every cart mutation while Watching resets the timer; an
//! emptied cart disarms it.
//!
//! Classification snapshots the cart into a persisted record, emits one
//! cart-abandonment analytics event for the idle window, and - when the
//! session has a known email - submits the record for email recovery
//! fire-and-forget. Nothing in here may take the shopping experience down:
//! failures are logged and swallowed.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use fernleaf_core::{AbandonedCart, AbandonedCartId};

use crate::clock::Clock;
use crate::config::AbandonmentConfig;
use crate::persistence::{hydrate_array, persist_array};
use crate::services::{AnalyticsTracker, RecoveryClient};
use crate::session::BrowsingSession;
use crate::storage::Storage;
use crate::stores::CartSnapshot;

/// Watches the cart and classifies sustained inactivity as abandonment.
pub struct AbandonmentTracker {
    inner: Arc<TrackerInner>,
    task: Mutex<Option<JoinHandle<()>>>,
}

struct TrackerInner {
    storage: Arc<dyn Storage>,
    key: String,
    clock: Arc<dyn Clock>,
    session: Arc<dyn BrowsingSession>,
    analytics: AnalyticsTracker,
    recovery: Option<RecoveryClient>,
    config: AbandonmentConfig,
    records: RwLock<Vec<AbandonedCart>>,
}

impl AbandonmentTracker {
    /// Construct the tracker, hydrating previously persisted records.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        storage: Arc<dyn Storage>,
        key: String,
        config: AbandonmentConfig,
        clock: Arc<dyn Clock>,
        session: Arc<dyn BrowsingSession>,
        analytics: AnalyticsTracker,
        recovery: Option<RecoveryClient>,
    ) -> Self {
        let records = hydrate_array(storage.as_ref(), &key);
        Self {
            inner: Arc::new(TrackerInner {
                storage,
                key,
                clock,
                session,
                analytics,
                recovery,
                config,
                records: RwLock::new(records),
            }),
            task: Mutex::new(None),
        }
    }

    /// Start observing a cart change feed. Replaces any previous observation.
    ///
    /// Must be called within a tokio runtime; without one the tracker stays
    /// idle (and logs), since there is no timer to schedule.
    pub fn watch(&self, mut changes: watch::Receiver<CartSnapshot>) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("no runtime; abandonment tracking disabled");
            return;
        };

        let inner = Arc::clone(&self.inner);
        let handle = runtime.spawn(async move {
            let mut latest = changes.borrow().clone();
            let mut armed = !latest.is_empty();
            let mut deadline = Instant::now() + inner.config.window;

            loop {
                tokio::select! {
                    changed = changes.changed() => {
                        if changed.is_err() {
                            // Cart store dropped; nothing left to observe.
                            break;
                        }
                        latest = changes.borrow_and_update().clone();
                        if latest.is_empty() {
                            armed = false;
                        } else {
                            armed = true;
                            deadline = Instant::now() + inner.config.window;
                        }
                    }
                    () = tokio::time::sleep_until(deadline), if armed => {
                        // Fire once per idle window; the next mutation re-arms.
                        armed = false;
                        inner.classify_abandoned(&latest);
                    }
                }
            }
        });

        let mut task = self.task.lock();
        if let Some(previous) = task.replace(handle) {
            previous.abort();
        }
    }

    /// Stop observing. Idempotent; also runs on drop.
    pub fn stop(&self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
    }

    /// Mark a record as recovered. Terminal: the record stays persisted but
    /// leaves the active view.
    pub fn recover_cart(&self, id: &AbandonedCartId) {
        let mut records = self.inner.records.write();
        let Some(record) = records.iter_mut().find(|r| &r.id == id) else {
            return;
        };
        record.recovered = true;
        persist_array(self.inner.storage.as_ref(), &self.inner.key, &records);
    }

    /// Active (not yet recovered) abandoned carts.
    #[must_use]
    pub fn abandoned_carts(&self) -> Vec<AbandonedCart> {
        self.inner
            .records
            .read()
            .iter()
            .filter(|r| !r.recovered)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn has_abandoned_cart(&self) -> bool {
        self.inner.records.read().iter().any(|r| !r.recovered)
    }
}

impl Drop for AbandonmentTracker {
    fn drop(&mut self) {
        self.stop();
    }
}

impl TrackerInner {
    /// Snapshot a cart into an abandonment record and hand it off.
    fn classify_abandoned(&self, snapshot: &CartSnapshot) {
        if snapshot.is_empty() {
            return;
        }
        // A cart sitting open on the checkout page is not abandoned.
        if self.session.current_route() == self.config.checkout_route {
            return;
        }

        let now = self.clock.now();
        let record = AbandonedCart {
            id: AbandonedCartId::new(format!("abandoned-{}", now.timestamp_millis())),
            items: snapshot.items.clone(),
            total_price: snapshot.total_price,
            abandoned_at: now,
            email: self.session.customer_email(),
            recovery_attempts: 0,
            last_recovery_attempt: None,
            recovered: false,
        };

        {
            let mut records = self.records.write();
            records.push(record.clone());
            persist_array(self.storage.as_ref(), &self.key, &records);
        }

        tracing::info!(
            cart_id = %record.id,
            items = snapshot.items.len(),
            value = %snapshot.total_price,
            "cart classified as abandoned"
        );
        self.analytics
            .track_cart_abandonment(snapshot.total_price, snapshot.items.len());

        if let (Some(recovery), Some(email)) = (self.recovery.clone(), record.email.clone()) {
            tokio::spawn(async move {
                if let Err(e) = recovery.submit(&record, &email).await {
                    tracing::warn!(cart_id = %record.id, error = %e, "recovery submission failed");
                }
            });
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::session::SharedSession;
    use crate::storage::MemoryStorage;
    use fernleaf_core::{CartItem, CartLineId, ProductId};
    use std::time::Duration;

    const WINDOW: Duration = Duration::from_secs(30 * 60);

    fn snapshot(quantity: u32) -> CartSnapshot {
        let line = CartItem {
            id: CartLineId::new("p1"),
            product_id: ProductId::new("p1"),
            name: "Nettle Tea".to_owned(),
            price: "12.50".parse().unwrap(),
            image: "🌿".to_owned(),
            quantity,
            sku: None,
        };
        CartSnapshot {
            total_items: quantity,
            total_price: line.line_total(),
            items: vec![line],
        }
    }

    fn tracker(session: Arc<SharedSession>) -> AbandonmentTracker {
        let clock = ManualClock::new("2024-06-01T00:00:00Z".parse().unwrap());
        AbandonmentTracker::new(
            Arc::new(MemoryStorage::new()),
            "fernleaf-abandoned-carts".to_owned(),
            AbandonmentConfig::default(),
            Arc::new(clock),
            session,
            AnalyticsTracker::disabled(Arc::new(ManualClock::new(
                "2024-06-01T00:00:00Z".parse().unwrap(),
            ))),
            None,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_cart_is_classified_after_window() {
        let session = Arc::new(SharedSession::new());
        let tracker = tracker(session);
        let (tx, rx) = watch::channel(CartSnapshot::default());
        tracker.watch(rx);

        tx.send_replace(snapshot(1));
        tokio::time::sleep(WINDOW + Duration::from_secs(1)).await;

        let carts = tracker.abandoned_carts();
        assert_eq!(carts.len(), 1);
        let record = carts.first().unwrap();
        assert_eq!(record.items.len(), 1);
        assert!(!record.recovered);
        assert!(record.id.as_str().starts_with("abandoned-"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_mutation_resets_the_timer() {
        let session = Arc::new(SharedSession::new());
        let tracker = tracker(session);
        let (tx, rx) = watch::channel(CartSnapshot::default());
        tracker.watch(rx);

        tx.send_replace(snapshot(1));
        tokio::time::sleep(WINDOW - Duration::from_secs(60)).await;
        tx.send_replace(snapshot(2));
        tokio::time::sleep(WINDOW - Duration::from_secs(60)).await;

        assert!(tracker.abandoned_carts().is_empty());

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(tracker.abandoned_carts().len(), 1);
        // The snapshot is from the last mutation, not the first.
        assert_eq!(
            tracker.abandoned_carts().first().unwrap().items.first().unwrap().quantity,
            2
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_emptied_cart_disarms_the_timer() {
        let session = Arc::new(SharedSession::new());
        let tracker = tracker(session);
        let (tx, rx) = watch::channel(CartSnapshot::default());
        tracker.watch(rx);

        tx.send_replace(snapshot(1));
        tokio::time::sleep(Duration::from_secs(60)).await;
        tx.send_replace(CartSnapshot::default());
        tokio::time::sleep(WINDOW * 2).await;

        assert!(tracker.abandoned_carts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_checkout_route_suppresses_classification() {
        let session = Arc::new(SharedSession::new());
        session.set_route("/checkout");
        let tracker = tracker(session);
        let (tx, rx) = watch::channel(CartSnapshot::default());
        tracker.watch(rx);

        tx.send_replace(snapshot(1));
        tokio::time::sleep(WINDOW * 2).await;

        assert!(tracker.abandoned_carts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_once_per_idle_window() {
        let session = Arc::new(SharedSession::new());
        let tracker = tracker(session);
        let (tx, rx) = watch::channel(CartSnapshot::default());
        tracker.watch(rx);

        tx.send_replace(snapshot(1));
        tokio::time::sleep(WINDOW * 3).await;
        assert_eq!(tracker.abandoned_carts().len(), 1);

        // The next mutation re-arms for a second record.
        tx.send_replace(snapshot(2));
        tokio::time::sleep(WINDOW + Duration::from_secs(1)).await;
        assert_eq!(tracker.abandoned_carts().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovered_record_leaves_active_view() {
        let session = Arc::new(SharedSession::new());
        let tracker = tracker(session);
        let (tx, rx) = watch::channel(CartSnapshot::default());
        tracker.watch(rx);

        tx.send_replace(snapshot(1));
        tokio::time::sleep(WINDOW + Duration::from_secs(1)).await;

        let id = tracker.abandoned_carts().first().unwrap().id.clone();
        tracker.recover_cart(&id);

        assert!(!tracker.has_abandoned_cart());
        assert!(tracker.abandoned_carts().is_empty());
    }
}
