//! Abandoned-cart records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::cart::CartItem;
use crate::types::email::Email;
use crate::types::id::AbandonedCartId;

/// Snapshot of a cart classified as abandoned.
///
/// Created once when the abandonment window elapses against an untouched
/// non-empty cart; immutable afterwards except for the `recovered` flag.
/// Records are never deleted - recovered ones are only filtered out of the
/// active view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbandonedCart {
    pub id: AbandonedCartId,
    pub items: Vec<CartItem>,
    pub total_price: Decimal,
    pub abandoned_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    /// Recovery email sends so far. Multi-stage recovery scheduling is not
    /// wired up; the field is kept for the recovery campaign's record shape.
    pub recovery_attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_recovery_attempt: Option<DateTime<Utc>>,
    pub recovered: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_timestamp_as_rfc3339() {
        let record = AbandonedCart {
            id: AbandonedCartId::new("abandoned-1700000000000"),
            items: Vec::new(),
            total_price: Decimal::ZERO,
            abandoned_at: "2024-01-01T00:00:00Z".parse().unwrap(),
            email: None,
            recovery_attempts: 0,
            last_recovery_attempt: None,
            recovered: false,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("2024-01-01T00:00:00Z"));
        assert!(!json.contains("last_recovery_attempt"));
    }
}
