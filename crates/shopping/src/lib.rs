//! Fernleaf shopping state layer.
//!
//! The in-memory state containers behind the Fernleaf storefront UI: the
//! shopping cart, wishlist, and comparison set, the abandoned-cart tracker
//! that watches the cart, and the order shipment-tracking reducer. Each
//! container hydrates once from local persistent storage at construction,
//! persists on change (the cart with a debounce), and emits analytics events
//! as a side effect of mutation.
//!
//! Everything is injectable - storage, clock, session, and notifier are
//! traits - so hosts compose a [`state::ShoppingState`] at their root and
//! tests construct isolated instances with in-memory backends.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod abandonment;
pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod notify;
pub mod persistence;
pub mod services;
pub mod session;
pub mod state;
pub mod storage;
pub mod stores;
pub mod tracking;
