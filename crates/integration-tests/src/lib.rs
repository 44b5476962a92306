//! Integration tests for the Fernleaf shopping state layer.
//!
//! The tests exercise cross-component flows - cart mutations feeding the
//! abandonment tracker, persistence across store instances, notice
//! deduplication - against in-memory backends and a paused tokio runtime, so
//! the whole suite runs without a backend or wall-clock sleeps.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p fernleaf-integration-tests
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use fernleaf_core::{CartItemInput, CartLineId, ComparisonProduct, ProductId, WishlistItem};
use fernleaf_shopping::clock::ManualClock;
use fernleaf_shopping::config::ShoppingConfig;
use fernleaf_shopping::notify::RecordingNotifier;
use fernleaf_shopping::session::SharedSession;
use fernleaf_shopping::state::ShoppingState;
use fernleaf_shopping::storage::{MemoryStorage, Storage, StorageError};

/// Storage wrapper that counts writes, for write-amplification assertions.
#[derive(Default)]
pub struct CountingStorage {
    inner: MemoryStorage,
    writes: AtomicUsize,
}

impl CountingStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl Storage for CountingStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        self.inner.keys()
    }
}

/// Everything a flow test needs, with handles kept for assertions.
pub struct TestHarness {
    pub state: ShoppingState,
    pub storage: Arc<CountingStorage>,
    pub clock: ManualClock,
    pub session: Arc<SharedSession>,
    pub notifier: Arc<RecordingNotifier>,
}

/// Install a test subscriber so `RUST_LOG=debug cargo test` shows store logs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Build an isolated offline state over counting in-memory storage.
#[must_use]
pub fn harness() -> TestHarness {
    init_tracing();
    harness_with_storage(Arc::new(CountingStorage::new()))
}

/// Build a harness over pre-seeded storage (for hydration tests).
#[must_use]
pub fn harness_with_storage(storage: Arc<CountingStorage>) -> TestHarness {
    let clock = ManualClock::new(
        "2024-06-01T00:00:00Z"
            .parse()
            .unwrap_or_else(|_| unreachable!("valid timestamp literal")),
    );
    let session = Arc::new(SharedSession::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let backend: Arc<dyn Storage> = storage.clone();

    let state = ShoppingState::offline(
        ShoppingConfig::default(),
        backend,
        Arc::new(clock.clone()),
        session.clone(),
        notifier.clone(),
    );

    TestHarness {
        state,
        storage,
        clock,
        session,
        notifier,
    }
}

/// A cart input for the fixture catalog.
#[must_use]
pub fn cart_item(id: &str, price: &str) -> CartItemInput {
    CartItemInput {
        id: CartLineId::new(id),
        product_id: ProductId::new(id),
        name: format!("Product {id}"),
        price: price.parse().unwrap_or_default(),
        image: "🌿".to_owned(),
        sku: None,
    }
}

/// A wishlist item for the fixture catalog.
#[must_use]
pub fn wishlist_item(id: &str) -> WishlistItem {
    WishlistItem {
        id: ProductId::new(id),
        product_id: ProductId::new(id),
        name: format!("Product {id}"),
        price: rust_decimal::Decimal::new(999, 2),
        image: "🌱".to_owned(),
        slug: None,
    }
}

/// A comparison snapshot for the fixture catalog.
#[must_use]
pub fn comparison_product(id: &str) -> ComparisonProduct {
    ComparisonProduct::basic(
        id,
        format!("Product {id}"),
        rust_decimal::Decimal::new(999, 2),
        true,
    )
}
