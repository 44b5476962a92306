//! Hydration and persistence for store state.
//!
//! Hydration happens exactly once, at store construction; after that the
//! in-memory state is authoritative and storage is only written. A corrupted
//! persisted value is discarded and replaced by empty state - it must never
//! take the store down.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;

use crate::storage::Storage;

/// Load a persisted JSON array, degrading to empty on absence or corruption.
///
/// A value that parses but is not an array of `T` counts as corruption; the
/// stored value is removed so the next session starts clean.
pub fn hydrate_array<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Vec<T> {
    match storage.get(key) {
        Ok(Some(raw)) => match serde_json::from_str::<Vec<T>>(&raw) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding corrupted persisted state");
                if let Err(e) = storage.remove(key) {
                    tracing::warn!(key, error = %e, "failed to remove corrupted state");
                }
                Vec::new()
            }
        },
        Ok(None) => Vec::new(),
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to read persisted state");
            Vec::new()
        }
    }
}

/// Serialize and write a state array immediately, logging on failure.
pub fn persist_array<T: Serialize>(storage: &dyn Storage, key: &str, items: &[T]) {
    let json = match serde_json::to_string(items) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to serialize state");
            return;
        }
    };
    if let Err(e) = storage.set(key, &json) {
        tracing::warn!(key, error = %e, "failed to persist state");
    }
}

/// Debounced writer for one storage key.
///
/// Each `schedule` supersedes any pending write, so a rapid burst of
/// mutations lands exactly one write holding the final state once the quiet
/// period elapses. Outside a tokio runtime the write happens immediately
/// instead - there is no timer to wait on.
pub struct DebouncedWriter {
    storage: Arc<dyn Storage>,
    key: String,
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl DebouncedWriter {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, key: impl Into<String>, delay: Duration) -> Self {
        Self {
            storage,
            key: key.into(),
            delay,
            pending: Mutex::new(None),
        }
    }

    /// Schedule `payload` to be written after the quiet period.
    pub fn schedule(&self, payload: String) {
        let mut pending = self.pending.lock();
        if let Some(handle) = pending.take() {
            handle.abort();
        }

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let storage = Arc::clone(&self.storage);
                let key = self.key.clone();
                let delay = self.delay;
                *pending = Some(runtime.spawn(async move {
                    tokio::time::sleep(delay).await;
                    if let Err(e) = storage.set(&key, &payload) {
                        tracing::warn!(key, error = %e, "failed to persist state");
                    }
                }));
            }
            Err(_) => self.write_now(&payload),
        }
    }

    /// Write `payload` immediately, cancelling any pending debounced write.
    pub fn flush(&self, payload: String) {
        if let Some(handle) = self.pending.lock().take() {
            handle.abort();
        }
        self.write_now(&payload);
    }

    fn write_now(&self, payload: &str) {
        if let Err(e) = self.storage.set(&self.key, payload) {
            tracing::warn!(key = %self.key, error = %e, "failed to persist state");
        }
    }
}

impl Drop for DebouncedWriter {
    fn drop(&mut self) {
        // A write scheduled against a dropped store would be stale.
        if let Some(handle) = self.pending.lock().take() {
            handle.abort();
        }
    }
}
