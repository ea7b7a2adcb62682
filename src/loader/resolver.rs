//! The resolution protocol.
//!
//! When the host fails to find an identifier, [`Resolver`] works out which
//! file should define it and loads that file:
//!
//! ```text
//! use Gear                     (inside namespace Acme)
//!      ↓
//! 1. Qualify        → Acme::Gear
//! 2. Guard          → already resolving Acme::Gear? → no resolution
//! 3. Owner          → workspace active? component owning `Acme`?
//! 4. Probe, pass 1  → app/models/acme/gear.unit
//!                     app/controllers/acme/gear.unit
//!                     app/lib/acme/gear.unit
//!    Probe, pass 2  → app/models/gear.unit
//!                     app/controllers/gear.unit
//!                     app/lib/gear.unit
//! 5. Load the first hit, verify Acme::Gear now exists
//! 6. Model hit      → best-effort load of Acme::GearController
//! ```
//!
//! The second pass supports applications that keep files directly under
//! `models/`, `controllers/` and `lib/` without a top-level namespace
//! directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, trace};

use super::config::Layout;
use super::error::ResolveError;
use super::guard::ResolutionGuard;
use super::hook::{Host, UnresolvedHook};
use super::path::{candidate_path, Subdir};
use super::registry::NamespaceRegistry;
use crate::runner::ds::identifier::Identifier;
use crate::runner::ds::scope::{ScopeId, Symbol};

/// State of one resolution attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionContext {
    /// Fully qualified identifier being resolved.
    pub identifier: Identifier,
    /// Scope whose failed lookup started the attempt.
    pub scope: ScopeId,
    /// Failures of best-effort attempts are never reported.
    pub best_effort: bool,
}

impl ResolutionContext {
    pub fn new(identifier: Identifier, scope: ScopeId) -> Self {
        ResolutionContext {
            identifier,
            scope,
            best_effort: false,
        }
    }

    pub fn best_effort(identifier: Identifier, scope: ScopeId) -> Self {
        ResolutionContext {
            identifier,
            scope,
            best_effort: true,
        }
    }
}

/// Resolves identifiers to files under the components of a
/// [`NamespaceRegistry`].
pub struct Resolver {
    registry: Arc<dyn NamespaceRegistry>,
    layout: Layout,
    /// Qualified identifiers in flight, whichever scope asked for them.
    guard: ResolutionGuard,
}

impl Resolver {
    pub fn new(registry: Arc<dyn NamespaceRegistry>) -> Self {
        Self::with_layout(registry, Layout::default())
    }

    pub fn with_layout(registry: Arc<dyn NamespaceRegistry>, layout: Layout) -> Self {
        Resolver {
            registry,
            layout,
            guard: ResolutionGuard::new(),
        }
    }

    /// Resolve `identifier`, referenced from `scope`.
    ///
    /// Returns `Ok(None)` when the qualified identifier is already being
    /// resolved, even if that attempt started from another scope.
    pub fn resolve(
        &self,
        host: &mut dyn Host,
        identifier: &Identifier,
        scope: ScopeId,
    ) -> Result<Option<Symbol>, ResolveError> {
        let qualified = match host.scope_path(scope) {
            Some(path) => path.join(identifier),
            None => identifier.clone(),
        };
        self.resolve_with(host, &ResolutionContext::new(qualified, scope))
    }

    /// Run the protocol for an already qualified context.
    pub fn resolve_with(
        &self,
        host: &mut dyn Host,
        ctx: &ResolutionContext,
    ) -> Result<Option<Symbol>, ResolveError> {
        let key = ctx.identifier.to_string();
        let _in_flight = match self.guard.enter(&key) {
            Some(token) => token,
            None => {
                trace!(identifier = %key, "already resolving, skipping");
                return Ok(None);
            }
        };

        if !self.registry.is_workspace_active() {
            return Err(ResolveError::uninitialized(&ctx.identifier));
        }
        let root = match self.registry.lookup_owner(ctx.identifier.namespace()) {
            Some(component) => component.root().join(&self.layout.source_dir),
            None => return Err(ResolveError::uninitialized(&ctx.identifier)),
        };

        let mut searched = Vec::new();
        for (subdir, relative) in self.probe_order(&ctx.identifier) {
            let file = root.join(relative);
            if !host.file_exists(&file) {
                trace!(file = %file.display(), "no candidate");
                searched.push(file);
                continue;
            }

            debug!(
                identifier = %ctx.identifier,
                scope = %ctx.scope,
                file = %file.display(),
                "autoloading"
            );
            let symbol = self.load(host, ctx, &file)?;
            if subdir == Subdir::Models {
                self.pair_controller(host, ctx);
            }
            return Ok(symbol);
        }

        if ctx.best_effort {
            return Ok(None);
        }
        Err(ResolveError::UninitializedSymbol {
            identifier: ctx.identifier.clone(),
            expected: None,
            searched,
        })
    }

    /// Load `file` and, unless best-effort, require that it defined the
    /// identifier.
    fn load(
        &self,
        host: &mut dyn Host,
        ctx: &ResolutionContext,
        file: &Path,
    ) -> Result<Option<Symbol>, ResolveError> {
        host.load(file)?;
        let symbol = host.find_symbol(&ctx.identifier);
        if symbol.is_none() && !ctx.best_effort {
            return Err(ResolveError::UninitializedSymbol {
                identifier: ctx.identifier.clone(),
                expected: Some(file.to_path_buf()),
                searched: vec![file.to_path_buf()],
            });
        }
        Ok(symbol)
    }

    /// Try to load the controller paired with a just-loaded model. Any
    /// failure is dropped.
    fn pair_controller(&self, host: &mut dyn Host, ctx: &ResolutionContext) {
        let counterpart = ctx.identifier.with_suffix(&self.layout.controller_suffix);
        if host.find_symbol(&counterpart).is_some() {
            return;
        }
        let probe = ResolutionContext::best_effort(counterpart, ctx.scope);
        match self.resolve_with(host, &probe) {
            Ok(Some(_)) => debug!(identifier = %probe.identifier, "loaded paired controller"),
            Ok(None) => trace!(identifier = %probe.identifier, "no paired controller"),
            Err(e) => debug!(identifier = %probe.identifier, error = %e, "ignoring paired controller failure"),
        }
    }

    /// Candidate paths relative to the source dir, in probe order: all
    /// segments first, then the segments after the namespace.
    fn probe_order(&self, identifier: &Identifier) -> Vec<(Subdir, PathBuf)> {
        let tail = identifier.tail();
        let mut passes = vec![identifier.segments()];
        if !tail.is_empty() {
            passes.push(tail);
        }

        let mut order = Vec::new();
        for segments in passes {
            for subdir in Subdir::PRIORITY.iter().copied() {
                if let Some(relative) = candidate_path(segments, subdir, &self.layout.extension) {
                    order.push((subdir, relative));
                }
            }
        }
        order
    }

    /// Every candidate file for `identifier`, in probe order. Empty if the
    /// namespace has no owner.
    pub fn candidates(&self, identifier: &Identifier) -> Vec<PathBuf> {
        let root = match self.registry.lookup_owner(identifier.namespace()) {
            Some(component) => component.root().join(&self.layout.source_dir),
            None => return Vec::new(),
        };
        self.probe_order(identifier)
            .into_iter()
            .map(|(_, relative)| root.join(relative))
            .collect()
    }
}

impl UnresolvedHook for Resolver {
    fn on_unresolved(
        &self,
        host: &mut dyn Host,
        identifier: &Identifier,
        scope: ScopeId,
    ) -> Result<Option<Symbol>, ResolveError> {
        self.resolve(host, identifier, scope)
    }

    fn name(&self) -> &str {
        "autoload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::registry::{Component, Workspace};
    use crate::runner::ds::error::{LoadError, RuntimeError};
    use crate::runner::ds::scope::SymbolKind;
    use std::cell::RefCell;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory host. Each file lists the identifiers it defines; files in
    /// `broken` fail to load.
    struct MockHost {
        files: HashMap<PathBuf, Vec<Identifier>>,
        broken: HashSet<PathBuf>,
        defined: Vec<Symbol>,
        probes: RefCell<Vec<PathBuf>>,
        loads: Vec<PathBuf>,
        scope_paths: HashMap<ScopeId, Identifier>,
    }

    impl MockHost {
        fn new() -> Self {
            MockHost {
                files: HashMap::new(),
                broken: HashSet::new(),
                defined: Vec::new(),
                probes: RefCell::new(Vec::new()),
                loads: Vec::new(),
                scope_paths: HashMap::new(),
            }
        }

        fn file(mut self, path: &str, defines: &[&str]) -> Self {
            self.files
                .insert(PathBuf::from(path), defines.iter().map(|d| id(d)).collect());
            self
        }

        fn broken(mut self, path: &str) -> Self {
            self.files.insert(PathBuf::from(path), Vec::new());
            self.broken.insert(PathBuf::from(path));
            self
        }

        fn probe_count(&self) -> usize {
            self.probes.borrow().len()
        }
    }

    impl Host for MockHost {
        fn load(&mut self, path: &Path) -> Result<(), LoadError> {
            self.loads.push(path.to_path_buf());
            if self.broken.contains(path) {
                return Err(LoadError::Execution {
                    path: path.to_path_buf(),
                    line: 1,
                    source: Box::new(RuntimeError::Syntax("broken".to_string())),
                });
            }
            for name in self.files.get(path).cloned().unwrap_or_default() {
                self.defined.push(Symbol {
                    name,
                    kind: SymbolKind::Definition,
                    origin: Some(path.to_path_buf()),
                });
            }
            Ok(())
        }

        fn file_exists(&self, path: &Path) -> bool {
            self.probes.borrow_mut().push(path.to_path_buf());
            self.files.contains_key(path)
        }

        fn scope_path(&self, scope: ScopeId) -> Option<Identifier> {
            self.scope_paths.get(&scope).cloned()
        }

        fn find_symbol(&self, identifier: &Identifier) -> Option<Symbol> {
            self.defined.iter().find(|s| &s.name == identifier).cloned()
        }
    }

    /// Registry that counts owner lookups.
    struct CountingRegistry {
        inner: Workspace,
        lookups: AtomicUsize,
    }

    impl NamespaceRegistry for CountingRegistry {
        fn lookup_owner(&self, namespace: &str) -> Option<&Component> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.lookup_owner(namespace)
        }

        fn is_workspace_active(&self) -> bool {
            self.inner.is_workspace_active()
        }
    }

    fn id(s: &str) -> Identifier {
        Identifier::parse(s).unwrap()
    }

    fn acme() -> Resolver {
        Resolver::new(Arc::new(Workspace::new(Component::new("Acme", "/r"))))
    }

    fn resolve(resolver: &Resolver, host: &mut MockHost, name: &str) -> Result<Option<Symbol>, ResolveError> {
        resolver.resolve(host, &id(name), ScopeId::new())
    }

    #[test]
    fn test_model_hit_returns_symbol_and_loads_once() {
        let mut host = MockHost::new().file("/r/app/models/acme/gear.unit", &["Acme::Gear"]);
        let symbol = resolve(&acme(), &mut host, "Acme::Gear").unwrap().unwrap();
        assert_eq!(symbol.name, id("Acme::Gear"));
        assert_eq!(host.loads, vec![PathBuf::from("/r/app/models/acme/gear.unit")]);
    }

    #[test]
    fn test_unregistered_namespace_touches_no_files() {
        let mut host = MockHost::new().file("/r/app/models/other/gear.unit", &["Other::Gear"]);
        let err = resolve(&acme(), &mut host, "Other::Gear").unwrap_err();
        assert!(matches!(err, ResolveError::UninitializedSymbol { expected: None, .. }));
        assert_eq!(err.to_string(), "uninitialized constant Other::Gear");
        assert_eq!(host.probe_count(), 0);
        assert!(host.loads.is_empty());
    }

    #[test]
    fn test_inactive_workspace_skips_registry_and_files() {
        let mut inner = Workspace::inactive();
        inner.add_plugin(Component::new("Acme", "/r")).unwrap();
        let registry = Arc::new(CountingRegistry {
            inner,
            lookups: AtomicUsize::new(0),
        });
        let resolver = Resolver::new(registry.clone());
        let mut host = MockHost::new().file("/r/app/models/acme/gear.unit", &["Acme::Gear"]);

        let err = resolve(&resolver, &mut host, "Acme::Gear").unwrap_err();
        assert!(matches!(err, ResolveError::UninitializedSymbol { .. }));
        assert_eq!(registry.lookups.load(Ordering::SeqCst), 0);
        assert_eq!(host.probe_count(), 0);
    }

    #[test]
    fn test_second_pass_drops_namespace_directory() {
        let mut host = MockHost::new().file("/r/app/lib/gear.unit", &["Acme::Gear"]);
        let symbol = resolve(&acme(), &mut host, "Acme::Gear").unwrap().unwrap();
        assert_eq!(symbol.origin, Some(PathBuf::from("/r/app/lib/gear.unit")));
        assert_eq!(
            *host.probes.borrow(),
            vec![
                PathBuf::from("/r/app/models/acme/gear.unit"),
                PathBuf::from("/r/app/controllers/acme/gear.unit"),
                PathBuf::from("/r/app/lib/acme/gear.unit"),
                PathBuf::from("/r/app/models/gear.unit"),
                PathBuf::from("/r/app/controllers/gear.unit"),
                PathBuf::from("/r/app/lib/gear.unit"),
            ]
        );
    }

    #[test]
    fn test_models_preferred_over_controllers() {
        let mut host = MockHost::new()
            .file("/r/app/models/gear.unit", &["Acme::Gear"])
            .file("/r/app/controllers/gear.unit", &["Acme::Gear"]);
        let symbol = resolve(&acme(), &mut host, "Acme::Gear").unwrap().unwrap();
        assert_eq!(symbol.origin, Some(PathBuf::from("/r/app/models/gear.unit")));
        assert_eq!(host.loads.len(), 1);
    }

    #[test]
    fn test_first_pass_preferred_over_second() {
        let mut host = MockHost::new()
            .file("/r/app/models/gear.unit", &["Acme::Gear"])
            .file("/r/app/lib/acme/gear.unit", &["Acme::Gear"]);
        let symbol = resolve(&acme(), &mut host, "Acme::Gear").unwrap().unwrap();
        assert_eq!(symbol.origin, Some(PathBuf::from("/r/app/lib/acme/gear.unit")));
    }

    #[test]
    fn test_model_loads_paired_controller() {
        let mut host = MockHost::new()
            .file("/r/app/models/widget.unit", &["Acme::Widget"])
            .file("/r/app/controllers/widget_controller.unit", &["Acme::WidgetController"]);
        let symbol = resolve(&acme(), &mut host, "Acme::Widget").unwrap().unwrap();
        assert_eq!(symbol.name, id("Acme::Widget"));
        assert!(host.find_symbol(&id("Acme::WidgetController")).is_some());
        assert_eq!(host.loads.len(), 2);
    }

    #[test]
    fn test_missing_controller_is_ignored() {
        let mut host = MockHost::new().file("/r/app/models/widget.unit", &["Acme::Widget"]);
        let symbol = resolve(&acme(), &mut host, "Acme::Widget").unwrap();
        assert!(symbol.is_some());
        assert!(host.find_symbol(&id("Acme::WidgetController")).is_none());
    }

    #[test]
    fn test_broken_controller_is_ignored() {
        let mut host = MockHost::new()
            .file("/r/app/models/widget.unit", &["Acme::Widget"])
            .broken("/r/app/controllers/widget_controller.unit");
        let symbol = resolve(&acme(), &mut host, "Acme::Widget").unwrap();
        assert!(symbol.is_some());
        assert_eq!(host.loads.len(), 2);
    }

    #[test]
    fn test_controller_hit_does_not_pair() {
        let mut host = MockHost::new()
            .file("/r/app/controllers/gear.unit", &["Acme::Gear"])
            .file("/r/app/controllers/gear_controller.unit", &["Acme::GearController"]);
        resolve(&acme(), &mut host, "Acme::Gear").unwrap().unwrap();
        assert_eq!(host.loads, vec![PathBuf::from("/r/app/controllers/gear.unit")]);
    }

    #[test]
    fn test_file_that_does_not_define_symbol() {
        let mut host = MockHost::new().file("/r/app/lib/gear.unit", &["Acme::Cog"]);
        let err = resolve(&acme(), &mut host, "Acme::Gear").unwrap_err();
        match &err {
            ResolveError::UninitializedSymbol { expected, .. } => {
                assert_eq!(expected.as_deref(), Some(Path::new("/r/app/lib/gear.unit")))
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(
            err.to_string(),
            "uninitialized constant Acme::Gear (expected it to be defined in: /r/app/lib/gear.unit)"
        );
    }

    #[test]
    fn test_load_failure_propagates() {
        let mut host = MockHost::new().broken("/r/app/models/gear.unit");
        let err = resolve(&acme(), &mut host, "Acme::Gear").unwrap_err();
        assert!(matches!(err, ResolveError::Load(LoadError::Execution { .. })));
    }

    #[test]
    fn test_nothing_found_lists_searched_paths() {
        let mut host = MockHost::new();
        match resolve(&acme(), &mut host, "Acme::Gear").unwrap_err() {
            ResolveError::UninitializedSymbol {
                identifier,
                expected,
                searched,
            } => {
                assert_eq!(identifier, id("Acme::Gear"));
                assert!(expected.is_none());
                assert_eq!(searched.len(), 6);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_qualifies_with_enclosing_scope() {
        let scope = ScopeId::new();
        let mut host = MockHost::new().file("/r/app/models/gear.unit", &["Acme::Gear"]);
        host.scope_paths.insert(scope, id("Acme"));
        let symbol = acme().resolve(&mut host, &id("Gear"), scope).unwrap().unwrap();
        assert_eq!(symbol.name, id("Acme::Gear"));
    }

    #[test]
    fn test_in_flight_identifier_short_circuits_in_every_scope() {
        let resolver = acme();
        let acme_scope = ScopeId::new();
        let mut host = MockHost::new().file("/r/app/models/gear.unit", &["Acme::Gear"]);
        host.scope_paths.insert(acme_scope, id("Acme"));

        let token = resolver.guard.enter("Acme::Gear").unwrap();
        assert!(resolver
            .resolve(&mut host, &id("Acme::Gear"), ScopeId::new())
            .unwrap()
            .is_none());
        // `Gear` inside `Acme` qualifies to the same in-flight identifier.
        assert!(resolver
            .resolve(&mut host, &id("Gear"), acme_scope)
            .unwrap()
            .is_none());
        assert_eq!(host.probe_count(), 0);
        assert!(host.loads.is_empty());

        drop(token);
        assert!(resolver
            .resolve(&mut host, &id("Gear"), acme_scope)
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_guard_released_after_failure() {
        let resolver = acme();
        let mut host = MockHost::new().broken("/r/app/models/gear.unit");
        assert!(resolver.resolve(&mut host, &id("Acme::Gear"), ScopeId::new()).is_err());
        assert!(resolver.guard.is_idle());
    }

    #[test]
    fn test_guard_idle_after_success() {
        let resolver = acme();
        let mut host = MockHost::new()
            .file("/r/app/models/widget.unit", &["Acme::Widget"])
            .file("/r/app/controllers/widget_controller.unit", &["Acme::WidgetController"]);
        for _ in 0..3 {
            resolve(&resolver, &mut host, "Acme::Widget").unwrap();
        }
        assert!(resolver.guard.is_idle());
    }

    #[test]
    fn test_best_effort_without_match_is_silent() {
        let resolver = acme();
        let mut host = MockHost::new();
        let ctx = ResolutionContext::best_effort(id("Acme::GearController"), ScopeId::new());
        assert!(resolver.resolve_with(&mut host, &ctx).unwrap().is_none());
    }

    #[test]
    fn test_single_segment_identifier_probes_one_pass() {
        let resolver = acme();
        assert_eq!(
            resolver.candidates(&id("Acme")),
            vec![
                PathBuf::from("/r/app/models/acme.unit"),
                PathBuf::from("/r/app/controllers/acme.unit"),
                PathBuf::from("/r/app/lib/acme.unit"),
            ]
        );
        assert!(resolver.candidates(&id("Other::Gear")).is_empty());
    }
}
