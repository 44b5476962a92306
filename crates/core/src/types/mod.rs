//! Core types for Fernleaf.
//!
//! Type-safe wrappers for common domain concepts plus the shopping models.

pub mod abandoned;
pub mod cart;
pub mod comparison;
pub mod email;
pub mod id;
pub mod order;
pub mod tracking;
pub mod wishlist;

pub use abandoned::AbandonedCart;
pub use cart::{CartItem, CartItemInput};
pub use comparison::ComparisonProduct;
pub use email::{Email, EmailError};
pub use id::*;
pub use order::{OrderRecord, OrderStatus};
pub use tracking::{TrackingEvent, TrackingStatus};
pub use wishlist::WishlistItem;
