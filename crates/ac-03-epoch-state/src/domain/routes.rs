//! # Routes Gate
//!
//! Advisory flag checked by transport-facing readers before they take the
//! root read lock. The rotation thread closes it just before requesting the
//! write lock so a stream of new readers cannot starve the writer; readers
//! already holding the lock finish normally.

use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug)]
pub struct RoutesGate {
    open: AtomicBool,
}

impl RoutesGate {
    pub fn new() -> Self {
        Self {
            open: AtomicBool::new(true),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Close the gate until the returned guard is dropped.
    pub fn pause(&self) -> RoutesPause<'_> {
        self.open.store(false, Ordering::Release);
        RoutesPause { gate: self }
    }
}

impl Default for RoutesGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Re-opens the gate on drop.
#[must_use = "routes re-open as soon as the pause guard is dropped"]
pub struct RoutesPause<'a> {
    gate: &'a RoutesGate,
}

impl Drop for RoutesPause<'_> {
    fn drop(&mut self) {
        self.gate.open.store(true, Ordering::Release);
    }
}
