//! Re-entrancy tracking for resolution attempts.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Identifiers currently being resolved within one context.
///
/// `mark` is an atomic check-and-set, so two threads resolving through the
/// same context cannot both believe they own an identifier.
#[derive(Debug, Default)]
pub struct ResolutionGuard {
    in_flight: Mutex<HashSet<String>>,
}

impl ResolutionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    fn set(&self) -> MutexGuard<'_, HashSet<String>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark `identifier` as in flight. Returns `false` if it already was.
    pub fn mark(&self, identifier: &str) -> bool {
        self.set().insert(identifier.to_string())
    }

    pub fn is_marked(&self, identifier: &str) -> bool {
        self.set().contains(identifier)
    }

    pub fn clear(&self, identifier: &str) {
        self.set().remove(identifier);
    }

    /// Mark `identifier` for as long as the returned token lives. `None` if
    /// it is already in flight.
    pub fn enter(&self, identifier: &str) -> Option<InFlight<'_>> {
        if self.mark(identifier) {
            Some(InFlight {
                guard: self,
                identifier: identifier.to_string(),
            })
        } else {
            None
        }
    }

    pub fn is_idle(&self) -> bool {
        self.set().is_empty()
    }
}

/// Clears its identifier from the guard when dropped, on every exit path.
#[derive(Debug)]
pub struct InFlight<'a> {
    guard: &'a ResolutionGuard,
    identifier: String,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.guard.clear(&self.identifier);
    }
}
