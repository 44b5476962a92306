//! In-memory state containers.
//!
//! One container per concern: cart, wishlist, comparison. Each owns its state
//! for the lifetime of the session, hydrates once from its storage key at
//! construction, and persists on change. The pure state transitions live
//! apart from the persistence and analytics side effects so they can be unit
//! tested without a backend.

pub mod cart;
pub mod comparison;
pub mod wishlist;

pub use cart::{CartSnapshot, CartState, CartStore};
pub use comparison::{ComparisonOutcome, ComparisonStore};
pub use wishlist::WishlistStore;
