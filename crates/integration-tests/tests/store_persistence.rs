//! Persistence discipline across store instances: hydrate-once, debounced
//! cart writes, write-through wishlist/comparison, corruption resilience.

use std::sync::Arc;
use std::time::Duration;

use fernleaf_core::ProductId;
use fernleaf_integration_tests::{
    CountingStorage, cart_item, comparison_product, harness, harness_with_storage, wishlist_item,
};
use fernleaf_shopping::storage::Storage;

#[tokio::test(start_paused = true)]
async fn rapid_cart_mutations_persist_as_a_single_write() {
    let h = harness();

    h.state.cart().add_to_cart(cart_item("p1", "12.50"));
    h.state.cart().add_to_cart(cart_item("p2", "3.00"));
    h.state.cart().add_to_cart(cart_item("p1", "12.50"));

    // Nothing hits storage until the quiet period elapses.
    assert_eq!(h.storage.writes(), 0);

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(h.storage.writes(), 1);

    let persisted = h
        .storage
        .get("fernleaf-cart")
        .expect("storage readable")
        .expect("cart persisted");
    let lines: serde_json::Value = serde_json::from_str(&persisted).expect("valid json");
    let lines = lines.as_array().expect("array of lines");
    assert_eq!(lines.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn persisted_state_survives_into_a_new_session() {
    let storage = Arc::new(CountingStorage::new());
    {
        let h = harness_with_storage(storage.clone());
        h.state.cart().add_to_cart(cart_item("p1", "12.50"));
        h.state.cart().add_to_cart(cart_item("p1", "12.50"));
        h.state.wishlist().add_to_wishlist(wishlist_item("p2"));
        h.state
            .comparison()
            .add_to_comparison(comparison_product("p3"));
        h.state.shutdown().await;
    }

    let revived = harness_with_storage(storage);
    assert_eq!(revived.state.cart().total_items(), 2);
    assert!(revived.state.wishlist().is_in_wishlist(&ProductId::new("p2")));
    assert!(revived.state.comparison().is_in_comparison(&ProductId::new("p3")));
}

#[tokio::test]
async fn corrupted_keys_degrade_to_empty_state() {
    let storage = Arc::new(CountingStorage::new());
    storage.set("fernleaf-cart", "not-json{{").expect("seeded");
    storage
        .set("fernleaf-wishlist", "{\"wrong\":\"shape\"}")
        .expect("seeded");
    storage.set("fernleaf-comparison", "[1,2,3]").expect("seeded");
    storage
        .set("fernleaf-abandoned-carts", "null")
        .expect("seeded");

    let h = harness_with_storage(storage);
    assert!(h.state.cart().is_empty());
    assert_eq!(h.state.wishlist().total_items(), 0);
    assert_eq!(h.state.comparison().total_items(), 0);
    assert!(!h.state.abandonment().has_abandoned_cart());
}

#[tokio::test(start_paused = true)]
async fn stores_never_touch_each_others_keys() {
    let h = harness();

    h.state.cart().add_to_cart(cart_item("p1", "12.50"));
    h.state.wishlist().add_to_wishlist(wishlist_item("p2"));
    h.state
        .comparison()
        .add_to_comparison(comparison_product("p3"));
    tokio::time::sleep(Duration::from_millis(400)).await;

    let mut keys = h.storage.keys().expect("keys listable");
    keys.sort();
    assert_eq!(
        keys,
        ["fernleaf-cart", "fernleaf-comparison", "fernleaf-wishlist"]
    );
}
