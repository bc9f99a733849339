//! Explicit debug accessor for the active session, replacing the ambient
//! global the original console workflow relied on. Registered by bootstrap,
//! cleared on teardown.
//!
//! From a console context:
//! ```rust,no_run
//! if let Some(session) = live::debug::active() {
//!     session.enable_debug();
//!     session.enable_latency_sim(std::time::Duration::from_millis(1000));
//! }
//! ```

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::session::SessionHandle;

static ACTIVE: Lazy<RwLock<Option<SessionHandle>>> = Lazy::new(|| RwLock::new(None));

pub fn register(handle: SessionHandle) {
    *ACTIVE.write() = Some(handle);
}

pub fn clear() {
    *ACTIVE.write() = None;
}

/// The session registered by the most recent bootstrap, if any.
pub fn active() -> Option<SessionHandle> {
    ACTIVE.read().clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_clear_round_trip() {
        // Shared static: run the whole cycle in one test to avoid ordering
        // assumptions between tests.
        clear();
        assert!(active().is_none());

        let handle = SessionHandle::disconnected();
        let id = handle.id();
        register(handle);
        assert_eq!(active().map(|h| h.id()), Some(id));

        clear();
        assert!(active().is_none());
    }
}
