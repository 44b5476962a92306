//! Background services: analytics emission and abandoned-cart recovery.

pub mod analytics;
pub mod recovery;

pub use analytics::{AnalyticsEvent, AnalyticsTracker, WishlistAction};
pub use recovery::RecoveryClient;
