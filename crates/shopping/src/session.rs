//! Browsing session information.
//!
//! The abandonment tracker needs two facts about the surrounding session: the
//! route the user is currently on (abandonment is suppressed on the checkout
//! route) and the authenticated customer's email (recovery emails need an
//! address). Hosts implement [`BrowsingSession`] over whatever navigation and
//! auth machinery they have.

use fernleaf_core::Email;
use parking_lot::RwLock;

/// Read-only view of the surrounding browsing session.
pub trait BrowsingSession: Send + Sync {
    /// The current navigation route, e.g. `/products/nettle-tea`.
    fn current_route(&self) -> String;

    /// Email of the authenticated customer, if any.
    fn customer_email(&self) -> Option<Email>;
}

/// Session state the host updates as navigation and auth change.
#[derive(Debug, Default)]
pub struct SharedSession {
    inner: RwLock<SessionSnapshot>,
}

#[derive(Debug, Clone)]
struct SessionSnapshot {
    route: String,
    email: Option<Email>,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            route: "/".to_owned(),
            email: None,
        }
    }
}

impl SharedSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_route(&self, route: impl Into<String>) {
        self.inner.write().route = route.into();
    }

    pub fn set_email(&self, email: Option<Email>) {
        self.inner.write().email = email;
    }
}

impl BrowsingSession for SharedSession {
    fn current_route(&self) -> String {
        self.inner.read().route.clone()
    }

    fn customer_email(&self) -> Option<Email> {
        self.inner.read().email.clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_root_route_and_no_email() {
        let session = SharedSession::new();
        assert_eq!(session.current_route(), "/");
        assert!(session.customer_email().is_none());
    }

    #[test]
    fn test_updates_are_visible() {
        let session = SharedSession::new();
        session.set_route("/checkout");
        session.set_email(Some(Email::parse("a@b.c").unwrap()));

        assert_eq!(session.current_route(), "/checkout");
        assert_eq!(session.customer_email().unwrap().as_str(), "a@b.c");
    }
}
