//! User-facing notices.
//!
//! Stores surface confirmations and conflicts (wishlist add, comparison
//! full) as [`Notice`] values through an injected [`Notifier`]; rendering
//! them as toasts is the host UI's concern. The dedupe wrapper implements the
//! suppression policy for rapid duplicate invocations, which UI frameworks
//! produce on re-render.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::clock::Clock;

/// Severity of a notice, mapping onto the usual toast variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// A user-facing notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub description: Option<String>,
}

impl Notice {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
            description: None,
        }
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
            description: None,
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
            description: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Sink for notices.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Default notifier: emits notices to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success | NoticeLevel::Info => {
                tracing::info!(message = %notice.message, description = ?notice.description, "notice");
            }
            NoticeLevel::Error => {
                tracing::warn!(message = %notice.message, description = ?notice.description, "notice");
            }
        }
    }
}

/// Records notices for inspection. Used by tests and headless hosts.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything notified so far.
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}

/// Suppresses duplicate notices fired in quick succession.
///
/// A notice is identified by a caller-supplied key; a repeat of the same key
/// within the given window is dropped. State mutations are never suppressed,
/// only their notices.
pub struct DedupedNotifier {
    inner: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    last_seen: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl DedupedNotifier {
    #[must_use]
    pub fn new(inner: Arc<dyn Notifier>, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner,
            clock,
            last_seen: Mutex::new(HashMap::new()),
        }
    }

    /// Deliver `notice` unless the same `key` already fired within `window`.
    /// Returns whether the notice was delivered.
    pub fn notify_deduped(&self, key: &str, window: Duration, notice: Notice) -> bool {
        let window = chrono::Duration::milliseconds(
            i64::try_from(window.as_millis()).unwrap_or(i64::MAX),
        );
        let now = self.clock.now();

        let mut last_seen = self.last_seen.lock();
        if let Some(at) = last_seen.get(key)
            && now.signed_duration_since(*at) <= window
        {
            return false;
        }

        // Old entries are dead weight once their window has passed.
        last_seen.retain(|_, at| now.signed_duration_since(*at) <= window);
        last_seen.insert(key.to_owned(), now);
        drop(last_seen);

        self.inner.notify(notice);
        true
    }

    /// Deliver `notice` without deduplication.
    pub fn notify(&self, notice: Notice) {
        self.inner.notify(notice);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn deduped() -> (DedupedNotifier, Arc<RecordingNotifier>, ManualClock) {
        let recorder = Arc::new(RecordingNotifier::new());
        let clock = ManualClock::new("2024-06-01T00:00:00Z".parse().unwrap());
        let notifier = DedupedNotifier::new(recorder.clone(), Arc::new(clock.clone()));
        (notifier, recorder, clock)
    }

    #[test]
    fn test_same_key_within_window_is_suppressed() {
        let (notifier, recorder, _clock) = deduped();
        let window = Duration::from_millis(1000);

        assert!(notifier.notify_deduped("p1", window, Notice::success("added")));
        assert!(!notifier.notify_deduped("p1", window, Notice::success("added")));
        assert_eq!(recorder.notices().len(), 1);
    }

    #[test]
    fn test_same_key_after_window_is_delivered() {
        let (notifier, recorder, clock) = deduped();
        let window = Duration::from_millis(1000);

        notifier.notify_deduped("p1", window, Notice::success("added"));
        clock.advance(chrono::Duration::milliseconds(1001));
        assert!(notifier.notify_deduped("p1", window, Notice::success("added")));
        assert_eq!(recorder.notices().len(), 2);
    }

    #[test]
    fn test_distinct_keys_are_independent() {
        let (notifier, recorder, _clock) = deduped();
        let window = Duration::from_millis(1000);

        assert!(notifier.notify_deduped("p1", window, Notice::success("added")));
        assert!(notifier.notify_deduped("p2", window, Notice::success("added")));
        assert_eq!(recorder.notices().len(), 2);
    }

    #[test]
    fn test_plain_notify_bypasses_dedupe() {
        let (notifier, recorder, _clock) = deduped();
        notifier.notify(Notice::info("removed"));
        notifier.notify(Notice::info("removed"));
        assert_eq!(recorder.notices().len(), 2);
    }
}
