//! End-to-end abandonment flow: cart mutations feed the tracker through the
//! store's change feed, the idle window is driven by the paused tokio clock.

use std::time::Duration;

use fernleaf_core::Email;
use fernleaf_integration_tests::{cart_item, harness};

const WINDOW: Duration = Duration::from_secs(30 * 60);

#[tokio::test(start_paused = true)]
async fn idle_cart_becomes_abandoned_with_snapshot_and_analytics() {
    let h = harness();
    h.session
        .set_email(Some(Email::parse("shopper@example.com").expect("valid email")));

    h.state.cart().add_to_cart(cart_item("p1", "12.50"));
    h.state.cart().add_to_cart(cart_item("p1", "12.50"));
    h.state.cart().add_to_cart(cart_item("p2", "3.00"));

    tokio::time::sleep(WINDOW + Duration::from_secs(1)).await;

    let carts = h.state.abandonment().abandoned_carts();
    assert_eq!(carts.len(), 1);

    let record = carts.first().expect("one abandoned cart");
    assert_eq!(record.items.len(), 2);
    assert_eq!(
        record.total_price,
        "28.00".parse::<rust_decimal::Decimal>().expect("decimal")
    );
    assert_eq!(
        record.email.as_ref().map(Email::as_str),
        Some("shopper@example.com")
    );
    assert!(!record.recovered);

    // The abandonment analytics event fired exactly once.
    let abandonments: Vec<_> = h
        .state
        .analytics()
        .events()
        .into_iter()
        .filter(|e| e.event == "cart_abandonment")
        .collect();
    assert_eq!(abandonments.len(), 1);
    assert_eq!(abandonments.first().expect("event").metadata["item_count"], 2);
}

#[tokio::test(start_paused = true)]
async fn every_cart_mutation_resets_the_idle_window() {
    let h = harness();
    h.state.cart().add_to_cart(cart_item("p1", "12.50"));

    // Keep touching the cart just before the window elapses.
    for _ in 0..3 {
        tokio::time::sleep(WINDOW - Duration::from_secs(60)).await;
        h.state.cart().add_to_cart(cart_item("p1", "12.50"));
    }
    assert!(h.state.abandonment().abandoned_carts().is_empty());

    tokio::time::sleep(WINDOW + Duration::from_secs(1)).await;
    assert_eq!(h.state.abandonment().abandoned_carts().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn emptying_the_cart_cancels_classification() {
    let h = harness();
    h.state.cart().add_to_cart(cart_item("p1", "12.50"));

    tokio::time::sleep(Duration::from_secs(60)).await;
    h.state.cart().clear_cart();

    tokio::time::sleep(WINDOW * 2).await;
    assert!(h.state.abandonment().abandoned_carts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn checkout_route_is_never_classified() {
    let h = harness();
    h.session.set_route("/checkout");
    h.state.cart().add_to_cart(cart_item("p1", "12.50"));

    tokio::time::sleep(WINDOW * 2).await;

    assert!(h.state.abandonment().abandoned_carts().is_empty());
    assert!(
        !h.state
            .analytics()
            .events()
            .iter()
            .any(|e| e.event == "cart_abandonment")
    );
}

#[tokio::test(start_paused = true)]
async fn recovery_is_terminal_for_the_record() {
    let h = harness();
    h.state.cart().add_to_cart(cart_item("p1", "12.50"));
    tokio::time::sleep(WINDOW + Duration::from_secs(1)).await;

    let id = h
        .state
        .abandonment()
        .abandoned_carts()
        .first()
        .expect("abandoned cart")
        .id
        .clone();
    h.state.abandonment().recover_cart(&id);

    assert!(!h.state.abandonment().has_abandoned_cart());

    // A fresh idle window on the still-populated cart produces a new record.
    h.state.cart().add_to_cart(cart_item("p2", "3.00"));
    tokio::time::sleep(WINDOW + Duration::from_secs(1)).await;
    assert_eq!(h.state.abandonment().abandoned_carts().len(), 1);
}
