//! Cart store: single source of truth for the current shopping cart.
//!
//! Holds at most one line per id. Mutations are synchronous and in-memory;
//! persistence is debounced behind them so a burst of changes lands one
//! write. Observers (the abandonment tracker) receive a snapshot per change
//! on a watch channel.

use std::sync::Arc;

use parking_lot::RwLock;
use rust_decimal::Decimal;
use tokio::sync::watch;

use fernleaf_core::{CartItem, CartItemInput, CartLineId};

use crate::config::CartConfig;
use crate::persistence::{DebouncedWriter, hydrate_array};
use crate::services::AnalyticsTracker;
use crate::storage::Storage;

/// Immutable view of the cart at one instant.
#[derive(Debug, Clone, Default)]
pub struct CartSnapshot {
    pub items: Vec<CartItem>,
    pub total_items: u32,
    pub total_price: Decimal,
}

impl CartSnapshot {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Pure cart state: line items plus totals.
///
/// Totals are recomputed once per mutation and cached, so reads are O(1) and
/// never drift from the line array.
#[derive(Debug, Clone, Default)]
pub struct CartState {
    items: Vec<CartItem>,
    total_items: u32,
    total_price: Decimal,
}

impl CartState {
    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let mut state = Self {
            items,
            total_items: 0,
            total_price: Decimal::ZERO,
        };
        state.recompute();
        state
    }

    fn recompute(&mut self) {
        self.total_items = self.items.iter().map(|line| line.quantity).sum();
        self.total_price = self
            .items
            .iter()
            .fold(Decimal::ZERO, |sum, line| sum + line.line_total());
    }

    /// Merge an item into the cart: increment the existing line's quantity,
    /// or insert a new line with quantity 1. Returns the resulting line.
    pub fn add(&mut self, input: CartItemInput) -> CartItem {
        let line = if let Some(line) = self.items.iter_mut().find(|line| line.id == input.id) {
            line.quantity += 1;
            line.clone()
        } else {
            let line = input.into_line(1);
            self.items.push(line.clone());
            line
        };
        self.recompute();
        line
    }

    /// Remove the line with `id`, returning it if it was present.
    pub fn remove(&mut self, id: &CartLineId) -> Option<CartItem> {
        let index = self.items.iter().position(|line| &line.id == id)?;
        let removed = self.items.remove(index);
        self.recompute();
        Some(removed)
    }

    /// Replace a line's quantity verbatim. A quantity of zero or below
    /// removes the line instead. Returns whether the cart changed.
    pub fn update_quantity(&mut self, id: &CartLineId, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove(id).is_some();
        }
        let Some(line) = self.items.iter_mut().find(|line| &line.id == id) else {
            return false;
        };
        line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        self.recompute();
        true
    }

    /// Empty the cart. Returns whether it held anything.
    pub fn clear(&mut self) -> bool {
        if self.items.is_empty() {
            return false;
        }
        self.items.clear();
        self.recompute();
        true
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub const fn total_items(&self) -> u32 {
        self.total_items
    }

    #[must_use]
    pub const fn total_price(&self) -> Decimal {
        self.total_price
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            items: self.items.clone(),
            total_items: self.total_items,
            total_price: self.total_price,
        }
    }
}

/// The cart store.
pub struct CartStore {
    state: RwLock<CartState>,
    writer: DebouncedWriter,
    analytics: AnalyticsTracker,
    changes: watch::Sender<CartSnapshot>,
}

impl CartStore {
    /// Construct the store, hydrating once from `key`.
    ///
    /// A corrupted persisted value is discarded and the cart starts empty.
    #[must_use]
    pub fn new(
        storage: Arc<dyn Storage>,
        key: String,
        config: &CartConfig,
        analytics: AnalyticsTracker,
    ) -> Self {
        let items = hydrate_array(storage.as_ref(), &key);
        let state = CartState::from_items(items);
        let (changes, _) = watch::channel(state.snapshot());

        Self {
            state: RwLock::new(state),
            writer: DebouncedWriter::new(storage, key, config.debounce),
            analytics,
            changes,
        }
    }

    /// Add an item, merging with an existing line by id.
    pub fn add_to_cart(&self, input: CartItemInput) {
        let (line, snapshot) = {
            let mut state = self.state.write();
            let line = state.add(input);
            (line, state.snapshot())
        };
        self.analytics.track_add_to_cart(&line);
        self.after_mutation(snapshot);
    }

    /// Remove a line by id. Silently a no-op when absent.
    pub fn remove_from_cart(&self, id: &CartLineId) {
        let (removed, snapshot) = {
            let mut state = self.state.write();
            let removed = state.remove(id);
            (removed, state.snapshot())
        };
        let Some(removed) = removed else { return };
        self.analytics
            .track_remove_from_cart(&removed.product_id, &removed.name, removed.price);
        self.after_mutation(snapshot);
    }

    /// Replace a line's quantity; zero or below removes the line.
    pub fn update_quantity(&self, id: &CartLineId, quantity: i64) {
        let (changed, snapshot) = {
            let mut state = self.state.write();
            let changed = state.update_quantity(id, quantity);
            (changed, state.snapshot())
        };
        if changed {
            self.after_mutation(snapshot);
        }
    }

    /// Empty the cart unconditionally. Used after successful order placement.
    pub fn clear_cart(&self) {
        let (changed, snapshot) = {
            let mut state = self.state.write();
            let changed = state.clear();
            (changed, state.snapshot())
        };
        if changed {
            self.after_mutation(snapshot);
        }
    }

    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.state.read().items().to_vec()
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.state.read().total_items()
    }

    /// Sum of price x quantity across lines.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.state.read().total_price()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.read().is_empty()
    }

    /// Subscribe to cart changes. The receiver always holds the latest
    /// snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.changes.subscribe()
    }

    /// Persist the current state immediately, cancelling any pending
    /// debounced write. Hosts call this on shutdown.
    pub fn flush(&self) {
        if let Some(json) = self.serialized() {
            self.writer.flush(json);
        }
    }

    fn after_mutation(&self, snapshot: CartSnapshot) {
        if let Some(json) = self.serialized() {
            self.writer.schedule(json);
        }
        self.changes.send_replace(snapshot);
    }

    fn serialized(&self) -> Option<String> {
        let state = self.state.read();
        match serde_json::to_string(state.items()) {
            Ok(json) => Some(json),
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize cart");
                None
            }
        }
    }
}
