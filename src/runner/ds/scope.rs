//! Scope tree of the unit-script runtime.
//!
//! The tree has one root scope and one scope per namespace. Scope ids are
//! UUIDs so that state keyed by scope (such as resolution guards) never
//! collides between two runtimes sharing the same resolver.

use std::collections::HashMap;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::runner::ds::error::RuntimeError;
use crate::runner::ds::identifier::Identifier;

/// Globally unique scope identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(Uuid);

impl ScopeId {
    pub fn new() -> Self {
        ScopeId(Uuid::new_v4())
    }
}

impl Display for ScopeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hyphenated())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SymbolKind {
    /// A namespace, backed by its own scope.
    Namespace(ScopeId),
    /// A plain definition (`define Gear`).
    Definition,
}

/// A defined symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    /// Fully qualified name.
    pub name: Identifier,
    pub kind: SymbolKind,
    /// File whose execution defined the symbol. `None` for symbols defined by
    /// evaluated snippets.
    pub origin: Option<PathBuf>,
}

impl Symbol {
    pub fn is_namespace(&self) -> bool {
        matches!(self.kind, SymbolKind::Namespace(_))
    }
}

struct ScopeData {
    /// Qualified path of the namespace. `None` for the root scope.
    path: Option<Identifier>,
    parent: Option<ScopeId>,
    symbols: HashMap<String, Symbol>,
}

/// Outcome of a lexical lookup.
#[derive(Debug, PartialEq)]
pub enum Lookup {
    Found(Symbol),
    /// Lookup stopped at `rest`, which was expected inside `scope`.
    Missing { scope: ScopeId, rest: Identifier },
}

pub struct ScopeTree {
    root: ScopeId,
    scopes: HashMap<ScopeId, ScopeData>,
}

impl ScopeTree {
    pub fn new() -> Self {
        let root = ScopeId::new();
        let mut scopes = HashMap::new();
        scopes.insert(
            root,
            ScopeData {
                path: None,
                parent: None,
                symbols: HashMap::new(),
            },
        );
        ScopeTree { root, scopes }
    }

    pub fn root(&self) -> ScopeId {
        self.root
    }

    /// Qualified path of a scope. `None` for the root (or an unknown scope).
    pub fn path_of(&self, id: ScopeId) -> Option<&Identifier> {
        self.scopes.get(&id).and_then(|s| s.path.as_ref())
    }

    /// Symbol named `name` directly inside `scope`.
    pub fn symbol(&self, scope: ScopeId, name: &str) -> Option<&Symbol> {
        self.scopes.get(&scope).and_then(|s| s.symbols.get(name))
    }

    fn qualify(&self, scope: ScopeId, name: &str) -> Identifier {
        match self.path_of(scope) {
            Some(path) => path.child(name),
            None => Identifier::single(name),
        }
    }

    /// Open (or reopen) namespace `name` inside `parent`.
    pub fn open_namespace(
        &mut self,
        parent: ScopeId,
        name: &str,
        origin: Option<&Path>,
    ) -> Result<ScopeId, RuntimeError> {
        if let Some(existing) = self.symbol(parent, name) {
            return match existing.kind {
                SymbolKind::Namespace(id) => Ok(id),
                SymbolKind::Definition => Err(RuntimeError::NotANamespace {
                    identifier: existing.name.clone(),
                }),
            };
        }

        let path = self.qualify(parent, name);
        let id = ScopeId::new();
        self.scopes.insert(
            id,
            ScopeData {
                path: Some(path.clone()),
                parent: Some(parent),
                symbols: HashMap::new(),
            },
        );
        self.insert_symbol(
            parent,
            Symbol {
                name: path,
                kind: SymbolKind::Namespace(id),
                origin: origin.map(Path::to_path_buf),
            },
        );
        Ok(id)
    }

    /// Define `name` inside `scope`. Redefining an existing name keeps the
    /// original symbol.
    pub fn define(&mut self, scope: ScopeId, name: &str, origin: Option<&Path>) -> Symbol {
        if let Some(existing) = self.symbol(scope, name) {
            return existing.clone();
        }
        let symbol = Symbol {
            name: self.qualify(scope, name),
            kind: SymbolKind::Definition,
            origin: origin.map(Path::to_path_buf),
        };
        self.insert_symbol(scope, symbol.clone());
        symbol
    }

    fn insert_symbol(&mut self, scope: ScopeId, symbol: Symbol) {
        if let Some(data) = self.scopes.get_mut(&scope) {
            data.symbols.insert(symbol.name.name().to_string(), symbol);
        }
    }

    /// Walk `identifier` starting from `scope`.
    ///
    /// The first segment is searched through the lexical chain, innermost
    /// first; the remaining segments are searched inside the namespace found.
    pub fn lookup(&self, scope: ScopeId, identifier: &Identifier) -> Result<Lookup, RuntimeError> {
        let first = identifier.namespace();
        let mut current = Some(scope);
        let mut found = None;
        while let Some(id) = current {
            if let Some(symbol) = self.symbol(id, first) {
                found = Some(symbol);
                break;
            }
            current = self.scopes.get(&id).and_then(|s| s.parent);
        }

        let mut symbol = match found {
            Some(s) => s,
            None => {
                return Ok(Lookup::Missing {
                    scope,
                    rest: identifier.clone(),
                })
            }
        };

        for (idx, segment) in identifier.segments().iter().enumerate().skip(1) {
            let inner = match symbol.kind {
                SymbolKind::Namespace(id) => id,
                SymbolKind::Definition => {
                    return Err(RuntimeError::NotANamespace {
                        identifier: symbol.name.clone(),
                    })
                }
            };
            symbol = match self.symbol(inner, segment) {
                Some(s) => s,
                None => {
                    return Ok(Lookup::Missing {
                        scope: inner,
                        rest: identifier.rest_from(idx),
                    })
                }
            };
        }
        Ok(Lookup::Found(symbol.clone()))
    }

    /// Absolute lookup from the root scope. Never consults a hook.
    pub fn find(&self, identifier: &Identifier) -> Option<Symbol> {
        let (last, parents) = identifier.segments().split_last()?;
        let mut scope = self.root;
        for segment in parents {
            match self.symbol(scope, segment)?.kind {
                SymbolKind::Namespace(id) => scope = id,
                SymbolKind::Definition => return None,
            }
        }
        self.symbol(scope, last).cloned()
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}
