//! Persistent key-value cache with TTL.
//!
//! A thin expiring layer over [`Storage`]: values are wrapped in an envelope
//! carrying their expiry instant, expired entries are removed on read, and
//! corruption or backend failure reads as a miss rather than an error. The
//! in-memory fetch-layer caching (orders) uses `moka` separately; this cache
//! is for state that should expire across restarts.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::storage::Storage;

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    data: T,
    expires_at: DateTime<Utc>,
}

/// Expiring key-value cache over a storage backend.
///
/// Keys are namespaced under a prefix so `clear` only touches this cache's
/// entries, never the stores' own keys.
pub struct KvCache {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    prefix: String,
}

impl KvCache {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>, prefix: impl Into<String>) -> Self {
        Self {
            storage,
            clock,
            prefix: prefix.into(),
        }
    }

    fn storage_key(&self, key: &str) -> String {
        format!("{}.{key}", self.prefix)
    }

    /// Store `value` under `key` for `ttl`. Returns whether the entry was
    /// written; failures are logged and reported as `false`.
    pub fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> bool {
        let ttl = chrono::Duration::milliseconds(
            i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX),
        );
        let entry = CacheEntry {
            data: value,
            expires_at: self.clock.now() + ttl,
        };

        let json = match serde_json::to_string(&entry) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to serialize cache entry");
                return false;
            }
        };
        match self.storage.set(&self.storage_key(key), &json) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to write cache entry");
                false
            }
        }
    }

    /// Read the live value under `key`. Expired entries are deleted and read
    /// as `None`; unreadable ones read as `None`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.storage.get(&self.storage_key(key)).ok().flatten()?;
        let entry: CacheEntry<T> = serde_json::from_str(&raw).ok()?;

        if self.clock.now() > entry.expires_at {
            self.delete(key);
            return None;
        }
        Some(entry.data)
    }

    /// Remove the entry under `key`. Returns whether the backend accepted the
    /// removal.
    pub fn delete(&self, key: &str) -> bool {
        match self.storage.remove(&self.storage_key(key)) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to delete cache entry");
                false
            }
        }
    }

    /// Remove every entry under this cache's prefix.
    pub fn clear(&self) {
        let keys = match self.storage.keys() {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!(error = %e, "failed to list cache entries");
                return;
            }
        };
        let prefix = format!("{}.", self.prefix);
        for key in keys.iter().filter(|k| k.starts_with(&prefix)) {
            if let Err(e) = self.storage.remove(key) {
                tracing::warn!(key, error = %e, "failed to clear cache entry");
            }
        }
    }

    /// Whether a live (non-expired) entry exists under `key`.
    pub fn has(&self, key: &str) -> bool {
        self.get::<serde_json::Value>(key).is_some()
    }
}
