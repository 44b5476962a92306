//! Wishlist store: a deduplicated set of saved products.
//!
//! Set semantics keyed by product id. Writes are rare compared to the cart,
//! so persistence is write-through rather than debounced.

use std::sync::Arc;

use parking_lot::RwLock;

use fernleaf_core::{ProductId, WishlistItem};

use crate::notify::{Notice, Notifier};
use crate::persistence::{hydrate_array, persist_array};
use crate::services::{AnalyticsTracker, WishlistAction};
use crate::storage::Storage;

/// The wishlist store.
pub struct WishlistStore {
    state: RwLock<Vec<WishlistItem>>,
    storage: Arc<dyn Storage>,
    key: String,
    analytics: AnalyticsTracker,
    notifier: Arc<dyn Notifier>,
}

impl WishlistStore {
    /// Construct the store, hydrating once from `key`. Corrupted persisted
    /// state is discarded, same as the cart.
    #[must_use]
    pub fn new(
        storage: Arc<dyn Storage>,
        key: String,
        analytics: AnalyticsTracker,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let items = hydrate_array(storage.as_ref(), &key);
        Self {
            state: RwLock::new(items),
            storage,
            key,
            analytics,
            notifier,
        }
    }

    /// Save a product. A no-op when the product is already saved.
    pub fn add_to_wishlist(&self, item: WishlistItem) {
        let product_id = item.product_id.clone();
        let name = item.name.clone();
        {
            let mut state = self.state.write();
            if state.iter().any(|i| i.product_id == item.product_id) {
                return;
            }
            state.push(item);
            persist_array(self.storage.as_ref(), &self.key, &state);
        }

        self.analytics
            .track_wishlist_action(WishlistAction::Add, &product_id, &name);
        self.notifier
            .notify(Notice::success("Added to wishlist").with_description(name));
    }

    /// Remove a saved product. A no-op when absent.
    pub fn remove_from_wishlist(&self, product_id: &ProductId) {
        let removed = {
            let mut state = self.state.write();
            let index = state.iter().position(|i| &i.product_id == product_id);
            let removed = index.map(|i| state.remove(i));
            if removed.is_some() {
                persist_array(self.storage.as_ref(), &self.key, &state);
            }
            removed
        };

        let Some(removed) = removed else { return };
        self.analytics
            .track_wishlist_action(WishlistAction::Remove, product_id, &removed.name);
        self.notifier
            .notify(Notice::info("Removed from wishlist").with_description(removed.name));
    }

    /// Remove if saved, save otherwise.
    pub fn toggle_wishlist(&self, item: WishlistItem) {
        if self.is_in_wishlist(&item.product_id) {
            self.remove_from_wishlist(&item.product_id);
        } else {
            self.add_to_wishlist(item);
        }
    }

    /// Membership predicate.
    #[must_use]
    pub fn is_in_wishlist(&self, product_id: &ProductId) -> bool {
        self.state
            .read()
            .iter()
            .any(|i| &i.product_id == product_id)
    }

    /// Empty the wishlist. No notice; clearing is an explicit page action.
    pub fn clear_wishlist(&self) {
        let mut state = self.state.write();
        if state.is_empty() {
            return;
        }
        state.clear();
        persist_array(self.storage.as_ref(), &self.key, &state);
    }

    #[must_use]
    pub fn items(&self) -> Vec<WishlistItem> {
        self.state.read().clone()
    }

    #[must_use]
    pub fn total_items(&self) -> usize {
        self.state.read().len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::notify::RecordingNotifier;
    use crate::storage::MemoryStorage;

    fn item(id: &str) -> WishlistItem {
        WishlistItem {
            id: ProductId::new(id),
            product_id: ProductId::new(id),
            name: format!("Product {id}"),
            price: "9.99".parse().unwrap(),
            image: "🌱".to_owned(),
            slug: None,
        }
    }

    fn store() -> (WishlistStore, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        let clock = ManualClock::new("2024-06-01T00:00:00Z".parse().unwrap());
        let store = WishlistStore::new(
            Arc::new(MemoryStorage::new()),
            "fernleaf-wishlist".to_owned(),
            AnalyticsTracker::disabled(Arc::new(clock)),
            notifier.clone(),
        );
        (store, notifier)
    }

    #[test]
    fn test_duplicate_add_is_a_noop() {
        let (store, notifier) = store();
        store.add_to_wishlist(item("p1"));
        store.add_to_wishlist(item("p1"));

        assert_eq!(store.total_items(), 1);
        // Second add fired no notice and no analytics event.
        assert_eq!(notifier.notices().len(), 1);
        assert_eq!(store.analytics.events().len(), 1);
    }

    #[test]
    fn test_double_toggle_restores_membership() {
        let (store, _) = store();
        assert!(!store.is_in_wishlist(&ProductId::new("p1")));

        store.toggle_wishlist(item("p1"));
        assert!(store.is_in_wishlist(&ProductId::new("p1")));

        store.toggle_wishlist(item("p1"));
        assert!(!store.is_in_wishlist(&ProductId::new("p1")));
    }

    #[test]
    fn test_remove_fires_analytics_and_notice() {
        let (store, notifier) = store();
        store.add_to_wishlist(item("p1"));
        store.remove_from_wishlist(&ProductId::new("p1"));

        let events = store.analytics.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events.get(1).unwrap().action, "Remove from Wishlist");
        assert_eq!(notifier.notices().len(), 2);
    }

    #[test]
    fn test_remove_absent_is_silent() {
        let (store, notifier) = store();
        store.remove_from_wishlist(&ProductId::new("ghost"));
        assert!(notifier.notices().is_empty());
    }

    #[test]
    fn test_persists_and_hydrates() {
        let storage = Arc::new(MemoryStorage::new());
        let clock = ManualClock::new("2024-06-01T00:00:00Z".parse().unwrap());
        {
            let store = WishlistStore::new(
                storage.clone(),
                "fernleaf-wishlist".to_owned(),
                AnalyticsTracker::disabled(Arc::new(clock.clone())),
                Arc::new(RecordingNotifier::new()),
            );
            store.add_to_wishlist(item("p1"));
        }

        let revived = WishlistStore::new(
            storage,
            "fernleaf-wishlist".to_owned(),
            AnalyticsTracker::disabled(Arc::new(clock)),
            Arc::new(RecordingNotifier::new()),
        );
        assert!(revived.is_in_wishlist(&ProductId::new("p1")));
    }
}
