//! The seam between the autoloader and the host runtime.
//!
//! The host calls an [`UnresolvedHook`] whenever an identifier lookup fails;
//! the hook calls back into the host through [`Host`] to probe, load and
//! verify files. Neither side knows the other's concrete type.

use std::path::Path;

use crate::loader::error::ResolveError;
use crate::runner::ds::error::LoadError;
use crate::runner::ds::identifier::Identifier;
use crate::runner::ds::scope::{ScopeId, Symbol};

/// What a failed-lookup hook may ask of the host runtime.
pub trait Host {
    /// Execute the file at `path`. Loading an already-loaded file is a no-op.
    fn load(&mut self, path: &Path) -> Result<(), LoadError>;

    /// Does a regular file exist at `path`?
    fn file_exists(&self, path: &Path) -> bool;

    /// Qualified path of `scope`, or `None` for the root scope.
    fn scope_path(&self, scope: ScopeId) -> Option<Identifier>;

    /// Absolute lookup that never consults a hook.
    fn find_symbol(&self, identifier: &Identifier) -> Option<Symbol>;
}

/// A strategy invoked by the host when an identifier lookup fails.
///
/// Hooks are installed process-wide through an
/// [`ActivationSwitch`](super::activation::ActivationSwitch), so they must be
/// shareable across threads.
pub trait UnresolvedHook: Send + Sync {
    /// Try to produce `identifier`, which was expected inside `scope`.
    ///
    /// `Ok(None)` means "no resolution"; the host then reports its own
    /// not-found error.
    fn on_unresolved(
        &self,
        host: &mut dyn Host,
        identifier: &Identifier,
        scope: ScopeId,
    ) -> Result<Option<Symbol>, ResolveError>;

    /// Human-readable name for this hook (for debugging/logging).
    fn name(&self) -> &str;
}
