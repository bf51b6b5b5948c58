//! Store-wide event suppression.
//!
//! While events are disabled the store's change listeners do not run, which
//! includes automatic cache invalidation. Bulk operations disable events for
//! speed and take over invalidation themselves.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Read access to the events-disabled state.
pub trait EventState: Send + Sync {
    /// Returns `true` while change events (and their listeners) are suppressed.
    fn events_disabled(&self) -> bool;
}

/// Nestable events switch.
///
/// Each call to [`EventSwitch::disable`] returns a guard; events stay
/// disabled until every outstanding guard is dropped.
#[derive(Debug, Default)]
pub struct EventSwitch {
    disabled_depth: AtomicUsize,
}

impl EventSwitch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable events until the returned guard is dropped.
    pub fn disable(&self) -> EventDisablerGuard<'_> {
        self.disabled_depth.fetch_add(1, Ordering::SeqCst);
        tracing::debug!("store events disabled");
        EventDisablerGuard { switch: self }
    }
}

impl EventState for EventSwitch {
    fn events_disabled(&self) -> bool {
        self.disabled_depth.load(Ordering::SeqCst) > 0
    }
}

/// RAII guard returned by [`EventSwitch::disable`].
#[must_use = "events are re-enabled as soon as the guard is dropped"]
#[derive(Debug)]
pub struct EventDisablerGuard<'a> {
    switch: &'a EventSwitch,
}

impl Drop for EventDisablerGuard<'_> {
    fn drop(&mut self) {
        if self.switch.disabled_depth.fetch_sub(1, Ordering::SeqCst) == 1 {
            tracing::debug!("store events enabled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enabled_by_default() {
        assert!(!EventSwitch::new().events_disabled());
    }

    #[test]
    fn guard_disables_until_dropped() {
        let switch = EventSwitch::new();
        {
            let _guard = switch.disable();
            assert!(switch.events_disabled());
        }
        assert!(!switch.events_disabled());
    }

    #[test]
    fn guards_nest() {
        let switch = EventSwitch::new();
        let outer = switch.disable();
        let inner = switch.disable();
        drop(inner);
        assert!(switch.events_disabled());
        drop(outer);
        assert!(!switch.events_disabled());
    }
}
