//! Fernleaf Core - Shared types library.
//!
//! This crate provides the domain types used across all Fernleaf components:
//! - `shopping` - Client-side shopping state layer (cart, wishlist, comparison, tracking)
//! - `integration-tests` - Cross-component flow tests
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no storage.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, email addresses, and the shopping domain models

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
