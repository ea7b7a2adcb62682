//! Lazy symbol resolution.
//!
//! This module resolves identifiers the host runtime cannot find by loading
//! the file that, by convention, defines them.
//!
//! ## Conventions
//!
//! Every [`Component`](registry::Component) (the application or a plugin)
//! owns one top-level namespace and a root directory. An identifier
//! `Acme::Widgets::GearBox` is looked for under the owner's source directory:
//!
//! ```text
//! <root>/app/models/acme/widgets/gear_box.unit
//! <root>/app/controllers/acme/widgets/gear_box.unit
//! <root>/app/lib/acme/widgets/gear_box.unit
//! <root>/app/models/widgets/gear_box.unit
//! <root>/app/controllers/widgets/gear_box.unit
//! <root>/app/lib/widgets/gear_box.unit
//! ```
//!
//! Loading a model also loads its controller (`GearBoxController`) if there
//! is one.
//!
//! ### Key Components
//!
//! - **[`Resolver`]**: the resolution protocol, an [`UnresolvedHook`]
//! - **[`ActivationSwitch`]**: where a host runtime finds the installed hook
//! - **[`Workspace`]**: which component owns which namespace
//! - **[`ResolutionGuard`]**: stops a resolution from re-entering itself
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use autoload::loader::{Resolver, WorkspaceConfig};
//! use autoload::runner::runtime::Runtime;
//!
//! let config = WorkspaceConfig::load(Path::new("autoload.toml")).unwrap();
//! let layout = config.layout().clone();
//! let workspace = config.into_workspace(Path::new(".")).unwrap();
//! autoload::enable(Arc::new(Resolver::with_layout(Arc::new(workspace), layout)));
//!
//! let mut runtime = Runtime::new();
//! runtime.eval_str("use Acme::Gear").unwrap();
//! ```

pub mod activation;
pub mod config;
pub mod error;
pub mod guard;
pub mod hook;
pub mod inflect;
pub mod path;
pub mod registry;
pub mod resolver;

use std::sync::Arc;

pub use activation::ActivationSwitch;
pub use config::{Layout, WorkspaceConfig};
pub use error::{ConfigError, RegistryError, ResolveError};
pub use guard::ResolutionGuard;
pub use hook::{Host, UnresolvedHook};
pub use registry::{Component, NamespaceRegistry, Workspace};
pub use resolver::{ResolutionContext, Resolver};

/// Install `resolver` on the process-wide switch. Returns `false` if a hook
/// was already installed.
pub fn enable(resolver: Arc<Resolver>) -> bool {
    ActivationSwitch::global().enable(resolver)
}

/// Remove whatever hook is installed on the process-wide switch.
pub fn disable() -> bool {
    ActivationSwitch::global().disable()
}
