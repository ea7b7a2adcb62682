//! Process-wide installation of the failed-lookup hook.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use super::hook::UnresolvedHook;

lazy_static! {
    static ref GLOBAL_SWITCH: Arc<ActivationSwitch> = Arc::new(ActivationSwitch::new());
}

/// Holds at most one installed [`UnresolvedHook`].
///
/// A host runtime consults its switch on every failed lookup. Install and
/// remove are idempotent.
#[derive(Default)]
pub struct ActivationSwitch {
    hook: RwLock<Option<Arc<dyn UnresolvedHook>>>,
}

impl ActivationSwitch {
    /// A switch detached from the process-wide one.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide switch.
    pub fn global() -> Arc<ActivationSwitch> {
        Arc::clone(&GLOBAL_SWITCH)
    }

    /// Install `hook`. Returns `false`, leaving the current hook in place,
    /// if one is already installed.
    pub fn enable(&self, hook: Arc<dyn UnresolvedHook>) -> bool {
        let mut slot = self.hook.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(current) = slot.as_ref() {
            info!(hook = current.name(), "hook already installed");
            return false;
        }
        info!(hook = hook.name(), "installing hook");
        *slot = Some(hook);
        true
    }

    /// Remove the installed hook. Returns `false` if there was none.
    pub fn disable(&self) -> bool {
        let mut slot = self.hook.write().unwrap_or_else(PoisonError::into_inner);
        match slot.take() {
            Some(hook) => {
                info!(hook = hook.name(), "removed hook");
                true
            }
            None => false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.hook
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// The installed hook, if any.
    pub fn hook(&self) -> Option<Arc<dyn UnresolvedHook>> {
        self.hook
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl fmt::Debug for ActivationSwitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hook = self.hook();
        f.debug_struct("ActivationSwitch")
            .field("hook", &hook.as_ref().map(|h| h.name()))
            .finish()
    }
}
