//! Comparison store: up to N products staged for side-by-side comparison.
//!
//! Adding has three mutually exclusive outcomes - appended, already present,
//! or at capacity - and each surfaces a notice. Notices are deduplicated
//! against rapid duplicate invocation (UI frameworks double-fire handlers on
//! re-render); the state mutation itself is always applied exactly once.

use std::sync::Arc;

use parking_lot::RwLock;

use fernleaf_core::{ComparisonProduct, ProductId};

use crate::clock::Clock;
use crate::config::ComparisonConfig;
use crate::notify::{DedupedNotifier, Notice, Notifier};
use crate::persistence::{hydrate_array, persist_array};
use crate::storage::Storage;

/// Dedupe key for capacity-rejection notices; they are not product-specific.
const CAPACITY_NOTICE_KEY: &str = "max_items";

/// Result of an add attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOutcome {
    /// The product was appended to the comparison set.
    Added,
    /// The product was already staged; nothing changed.
    AlreadyPresent,
    /// The set is full; nothing changed.
    CapacityReached,
}

/// The comparison store.
pub struct ComparisonStore {
    state: RwLock<Vec<ComparisonProduct>>,
    storage: Arc<dyn Storage>,
    key: String,
    notifier: DedupedNotifier,
    config: ComparisonConfig,
}

impl ComparisonStore {
    /// Construct the store, hydrating once from `key`. A persisted array
    /// longer than the capacity is truncated to it.
    #[must_use]
    pub fn new(
        storage: Arc<dyn Storage>,
        key: String,
        config: ComparisonConfig,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut items: Vec<ComparisonProduct> = hydrate_array(storage.as_ref(), &key);
        items.truncate(config.capacity);

        Self {
            state: RwLock::new(items),
            storage,
            key,
            notifier: DedupedNotifier::new(notifier, clock),
            config,
        }
    }

    /// Stage a product for comparison.
    pub fn add_to_comparison(&self, product: ComparisonProduct) -> ComparisonOutcome {
        let name = product.name.clone();
        let dedupe_key = product.id.as_str().to_owned();

        let outcome = {
            let mut state = self.state.write();
            if state.iter().any(|p| p.id == product.id) {
                ComparisonOutcome::AlreadyPresent
            } else if state.len() >= self.config.capacity {
                ComparisonOutcome::CapacityReached
            } else {
                state.push(product);
                persist_array(self.storage.as_ref(), &self.key, &state);
                ComparisonOutcome::Added
            }
        };

        match outcome {
            ComparisonOutcome::Added => {
                self.notifier.notify_deduped(
                    &dedupe_key,
                    self.config.success_notice_window,
                    Notice::success(format!("{name} added to comparison")),
                );
            }
            ComparisonOutcome::AlreadyPresent => {
                self.notifier.notify_deduped(
                    &dedupe_key,
                    self.config.conflict_notice_window,
                    Notice::info(format!("{name} is already in comparison")),
                );
            }
            ComparisonOutcome::CapacityReached => {
                self.notifier.notify_deduped(
                    CAPACITY_NOTICE_KEY,
                    self.config.conflict_notice_window,
                    Notice::error(format!(
                        "You can compare up to {} products. Remove one to add another.",
                        self.config.capacity
                    )),
                );
            }
        }
        outcome
    }

    /// Unstage a product. A no-op when absent.
    pub fn remove_from_comparison(&self, id: &ProductId) {
        let removed = {
            let mut state = self.state.write();
            let index = state.iter().position(|p| &p.id == id);
            let removed = index.map(|i| state.remove(i));
            if removed.is_some() {
                persist_array(self.storage.as_ref(), &self.key, &state);
            }
            removed
        };

        if let Some(removed) = removed {
            self.notifier
                .notify(Notice::success(format!("{} removed from comparison", removed.name)));
        }
    }

    /// Membership predicate.
    #[must_use]
    pub fn is_in_comparison(&self, id: &ProductId) -> bool {
        self.state.read().iter().any(|p| &p.id == id)
    }

    /// Empty the comparison set.
    pub fn clear_comparison(&self) {
        {
            let mut state = self.state.write();
            state.clear();
            persist_array(self.storage.as_ref(), &self.key, &state);
        }
        self.notifier.notify(Notice::success("Comparison cleared"));
    }

    #[must_use]
    pub fn items(&self) -> Vec<ComparisonProduct> {
        self.state.read().clone()
    }

    #[must_use]
    pub fn total_items(&self) -> usize {
        self.state.read().len()
    }

    /// Whether another product fits.
    #[must_use]
    pub fn can_add_more(&self) -> bool {
        self.total_items() < self.config.capacity
    }

    /// Configured capacity of the comparison set.
    #[must_use]
    pub const fn max_items(&self) -> usize {
        self.config.capacity
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::notify::{NoticeLevel, RecordingNotifier};
    use crate::storage::MemoryStorage;

    fn product(id: &str) -> ComparisonProduct {
        ComparisonProduct::basic(id, format!("Product {id}"), "9.99".parse().unwrap(), true)
    }

    fn store() -> (ComparisonStore, Arc<RecordingNotifier>, ManualClock) {
        let notifier = Arc::new(RecordingNotifier::new());
        let clock = ManualClock::new("2024-06-01T00:00:00Z".parse().unwrap());
        let store = ComparisonStore::new(
            Arc::new(MemoryStorage::new()),
            "fernleaf-comparison".to_owned(),
            ComparisonConfig::default(),
            notifier.clone(),
            Arc::new(clock.clone()),
        );
        (store, notifier, clock)
    }

    #[test]
    fn test_add_at_capacity_is_rejected() {
        let (store, notifier, _clock) = store();
        for i in 0..4 {
            assert_eq!(
                store.add_to_comparison(product(&format!("p{i}"))),
                ComparisonOutcome::Added
            );
        }

        let outcome = store.add_to_comparison(product("p5"));
        assert_eq!(outcome, ComparisonOutcome::CapacityReached);
        assert_eq!(store.total_items(), 4);
        assert!(!store.is_in_comparison(&ProductId::new("p5")));

        let last = notifier.notices().last().cloned().unwrap();
        assert_eq!(last.level, NoticeLevel::Error);
        assert!(last.message.contains("up to 4 products"));
    }

    #[test]
    fn test_duplicate_add_leaves_state_unchanged() {
        let (store, _notifier, clock) = store();
        store.add_to_comparison(product("p1"));
        clock.advance(chrono::Duration::seconds(5));

        let outcome = store.add_to_comparison(product("p1"));
        assert_eq!(outcome, ComparisonOutcome::AlreadyPresent);
        assert_eq!(store.total_items(), 1);
    }

    #[test]
    fn test_rapid_duplicate_notice_is_suppressed_but_state_consistent() {
        let (store, notifier, _clock) = store();
        store.add_to_comparison(product("p1"));

        // Double-fired handler: outcome repeats within the window.
        let outcome = store.add_to_comparison(product("p1"));
        assert_eq!(outcome, ComparisonOutcome::AlreadyPresent);
        assert_eq!(store.total_items(), 1);
        // Only the first (success) notice made it through.
        assert_eq!(notifier.notices().len(), 1);
    }

    #[test]
    fn test_capacity_notice_dedupes_across_products() {
        let (store, notifier, clock) = store();
        for i in 0..4 {
            store.add_to_comparison(product(&format!("p{i}")));
        }
        clock.advance(chrono::Duration::seconds(5));

        store.add_to_comparison(product("p5"));
        store.add_to_comparison(product("p6"));
        let capacity_notices = notifier
            .notices()
            .iter()
            .filter(|n| n.level == NoticeLevel::Error)
            .count();
        assert_eq!(capacity_notices, 1);
    }

    #[test]
    fn test_remove_and_clear() {
        let (store, _notifier, _clock) = store();
        store.add_to_comparison(product("p1"));
        store.add_to_comparison(product("p2"));

        store.remove_from_comparison(&ProductId::new("p1"));
        assert!(!store.is_in_comparison(&ProductId::new("p1")));
        assert_eq!(store.total_items(), 1);

        store.clear_comparison();
        assert_eq!(store.total_items(), 0);
        assert!(store.can_add_more());
    }

    #[test]
    fn test_hydration_truncates_to_capacity() {
        let storage = Arc::new(MemoryStorage::new());
        let oversized: Vec<ComparisonProduct> =
            (0..6).map(|i| product(&format!("p{i}"))).collect();
        storage
            .set(
                "fernleaf-comparison",
                &serde_json::to_string(&oversized).unwrap(),
            )
            .unwrap();

        let clock = ManualClock::new("2024-06-01T00:00:00Z".parse().unwrap());
        let store = ComparisonStore::new(
            storage,
            "fernleaf-comparison".to_owned(),
            ComparisonConfig::default(),
            Arc::new(RecordingNotifier::new()),
            Arc::new(clock),
        );
        assert_eq!(store.total_items(), 4);
        assert!(!store.can_add_more());
    }
}
