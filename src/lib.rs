//! # autoload - lazy symbol resolution for unit scripts
//!
//! When a unit script references a namespaced identifier that has not been
//! defined yet, the runtime asks an installed hook to find it. The autoloader
//! hook derives the file that should define the identifier from its name,
//! loads it, and hands the symbol back.
//!
//! ## Quick Start
//!
//! ### Parsing unit scripts
//!
//! ```
//! use autoload::parser::UnitParser;
//!
//! let script = UnitParser::parse_to_ast_from_str("namespace Acme { define Gear }").unwrap();
//! assert_eq!(script.body.len(), 1);
//! ```
//!
//! ### Resolving against a workspace
//!
//! ```no_run
//! use std::sync::Arc;
//! use autoload::loader::{ActivationSwitch, Component, Resolver, Workspace};
//! use autoload::runner::runtime::Runtime;
//!
//! let workspace = Workspace::new(Component::new("Acme", "/srv/acme"));
//! let switch = Arc::new(ActivationSwitch::new());
//! switch.enable(Arc::new(Resolver::new(Arc::new(workspace))));
//!
//! // Loads /srv/acme/app/models/gear.unit (or one of its siblings).
//! let mut runtime = Runtime::with_switch(switch);
//! let gear = runtime.eval_str("use Acme::Gear").unwrap();
//! ```
//!
//! ## Architecture
//!
//! - **[`parser`]** - PEG parser and AST types
//! - **[`runner`]** - the host runtime
//!   - **[`runner::ds`]** - identifiers, scopes, runtime errors
//! - **[`loader`]** - resolution protocol, activation, workspace registry

#[macro_use]
extern crate lazy_static;

pub mod loader;
pub mod parser;
pub mod runner;

pub use loader::{disable, enable};
