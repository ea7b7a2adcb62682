//! Interpreter for unit scripts.
//!
//! The runtime owns the scope tree, the set of already-loaded files and the
//! failed-lookup call site. When a `use` cannot be satisfied by the lexical
//! chain, the runtime hands the remaining identifier to whatever hook is
//! installed on its [`ActivationSwitch`]:
//!
//! ```text
//! use Acme::Gear
//!      ↓
//! 1. Look up `Acme` through the lexical chain → namespace found
//! 2. Look up `Gear` inside `Acme` → missing
//! 3. Hook installed? → on_unresolved(runtime, "Gear", <Acme scope>)
//! 4. Hook returns a symbol → done
//! 5. No hook / no symbol → NameError
//! ```
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use autoload::loader::activation::ActivationSwitch;
//! use autoload::runner::runtime::Runtime;
//!
//! let mut runtime = Runtime::with_switch(Arc::new(ActivationSwitch::new()));
//! let gear = runtime
//!     .eval_str("namespace Acme { define Gear }\nuse Acme::Gear")
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(gear.name.to_string(), "Acme::Gear");
//! ```

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::loader::activation::ActivationSwitch;
use crate::loader::hook::Host;
use crate::parser::ast::{Statement, StatementKind};
use crate::parser::UnitParser;
use crate::runner::ds::error::{LoadError, RuntimeError};
use crate::runner::ds::identifier::Identifier;
use crate::runner::ds::scope::{Lookup, ScopeId, ScopeTree, Symbol};

pub struct Runtime {
    scopes: ScopeTree,
    /// Canonical paths of files that are loaded or currently loading.
    loaded: HashSet<PathBuf>,
    /// Every file execution, in order.
    loaded_files: Vec<PathBuf>,
    /// Files currently executing, innermost last.
    file_stack: Vec<PathBuf>,
    switch: Arc<ActivationSwitch>,
}

impl Runtime {
    /// A runtime bound to the process-wide activation switch.
    pub fn new() -> Self {
        Self::with_switch(ActivationSwitch::global())
    }

    /// A runtime bound to a specific switch.
    pub fn with_switch(switch: Arc<ActivationSwitch>) -> Self {
        Runtime {
            scopes: ScopeTree::new(),
            loaded: HashSet::new(),
            loaded_files: Vec::new(),
            file_stack: Vec::new(),
            switch,
        }
    }

    pub fn switch(&self) -> &Arc<ActivationSwitch> {
        &self.switch
    }

    pub fn root(&self) -> ScopeId {
        self.scopes.root()
    }

    pub fn scopes(&self) -> &ScopeTree {
        &self.scopes
    }

    /// Files executed so far, in execution order.
    pub fn loaded_files(&self) -> &[PathBuf] {
        &self.loaded_files
    }

    /// Number of times `path` has been executed.
    pub fn load_count(&self, path: &Path) -> usize {
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        self.loaded_files.iter().filter(|p| **p == path).count()
    }

    /// Evaluate a snippet in the root scope. Returns the value of the last
    /// statement that produced one.
    pub fn eval_str(&mut self, code: &str) -> Result<Option<Symbol>, RuntimeError> {
        let script = UnitParser::parse_to_ast_from_str(code)
            .map_err(|e| RuntimeError::Syntax(e.to_string()))?;
        let root = self.root();
        self.execute_block(&script.body, root)
    }

    pub fn execute_block(
        &mut self,
        statements: &[Statement],
        scope: ScopeId,
    ) -> Result<Option<Symbol>, RuntimeError> {
        self.run(statements, scope).map_err(|(_, e)| e)
    }

    /// Executes `statements`; on failure also reports the line of the
    /// innermost failing statement.
    fn run(
        &mut self,
        statements: &[Statement],
        scope: ScopeId,
    ) -> Result<Option<Symbol>, (usize, RuntimeError)> {
        let mut value = None;
        for statement in statements {
            let line = statement.line;
            match &statement.kind {
                StatementKind::Define(name) => {
                    let origin = self.file_stack.last().cloned();
                    value = Some(self.scopes.define(scope, name, origin.as_deref()));
                }
                StatementKind::Use(identifier) => {
                    value = Some(self.lookup(scope, identifier).map_err(|e| (line, e))?);
                }
                StatementKind::Load(file) => {
                    let path = self.relative_to_current_file(file);
                    self.load_file(&path)
                        .map_err(|e| (line, RuntimeError::from(e)))?;
                }
                StatementKind::Namespace { path, body } => {
                    let inner = self
                        .open_namespace_path(scope, path)
                        .map_err(|e| (line, e))?;
                    if let Some(symbol) = self.run(body, inner)? {
                        value = Some(symbol);
                    }
                }
            }
        }
        Ok(value)
    }

    fn open_namespace_path(
        &mut self,
        scope: ScopeId,
        path: &Identifier,
    ) -> Result<ScopeId, RuntimeError> {
        let origin = self.file_stack.last().cloned();
        let mut current = scope;
        for segment in path.segments() {
            current = self
                .scopes
                .open_namespace(current, segment, origin.as_deref())?;
        }
        Ok(current)
    }

    fn relative_to_current_file(&self, file: &str) -> PathBuf {
        let file = Path::new(file);
        match self.file_stack.last().and_then(|p| p.parent()) {
            Some(dir) if file.is_relative() => dir.join(file),
            _ => file.to_path_buf(),
        }
    }

    /// Resolve `identifier` as referenced from `scope`, consulting the
    /// installed failed-lookup hook when the lexical chain has no answer.
    pub fn lookup(
        &mut self,
        scope: ScopeId,
        identifier: &Identifier,
    ) -> Result<Symbol, RuntimeError> {
        let (missing_scope, rest) = match self.scopes.lookup(scope, identifier)? {
            Lookup::Found(symbol) => return Ok(symbol),
            Lookup::Missing { scope, rest } => (scope, rest),
        };

        if let Some(hook) = self.switch.hook() {
            trace!(identifier = %rest, hook = hook.name(), "lookup failed, consulting hook");
            if let Some(symbol) = hook.on_unresolved(self, &rest, missing_scope)? {
                return Ok(symbol);
            }
        }

        let identifier = match self.scopes.path_of(missing_scope) {
            Some(path) => path.join(&rest),
            None => rest,
        };
        Err(RuntimeError::NameError { identifier })
    }

    /// Execute a script file, returning the value of its last statement.
    pub fn run_file(&mut self, path: &Path) -> Result<Option<Symbol>, RuntimeError> {
        Ok(self.execute_file(path)?)
    }

    /// The file-execution primitive.
    ///
    /// Files already loaded are skipped. A file counts as loaded from the
    /// moment it starts executing and stops counting if its execution fails.
    pub fn load_file(&mut self, path: &Path) -> Result<(), LoadError> {
        self.execute_file(path).map(|_| ())
    }

    fn execute_file(&mut self, path: &Path) -> Result<Option<Symbol>, LoadError> {
        let path = path.canonicalize().map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => LoadError::NotFound {
                path: path.to_path_buf(),
            },
            _ => LoadError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })?;
        if self.loaded.contains(&path) {
            trace!(file = %path.display(), "already loaded");
            return Ok(None);
        }

        let source = fs::read_to_string(&path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        let script =
            UnitParser::parse_to_ast_from_str(&source).map_err(|e| LoadError::Syntax {
                path: path.clone(),
                message: e.to_string(),
            })?;

        debug!(file = %path.display(), "loading");
        self.loaded.insert(path.clone());
        self.loaded_files.push(path.clone());
        self.file_stack.push(path.clone());
        let root = self.root();
        let result = self.run(&script.body, root);
        self.file_stack.pop();

        match result {
            Ok(value) => Ok(value),
            Err((line, source)) => {
                self.loaded.remove(&path);
                Err(LoadError::Execution {
                    path,
                    line,
                    source: Box::new(source),
                })
            }
        }
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for Runtime {
    fn load(&mut self, path: &Path) -> Result<(), LoadError> {
        self.load_file(path)
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn scope_path(&self, scope: ScopeId) -> Option<Identifier> {
        self.scopes.path_of(scope).cloned()
    }

    fn find_symbol(&self, identifier: &Identifier) -> Option<Symbol> {
        self.scopes.find(identifier)
    }
}
