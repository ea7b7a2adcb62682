//! Namespace registry: which component owns which namespace.

use std::path::{Path, PathBuf};

use super::error::RegistryError;

/// An application or plugin that owns a namespace and a root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    namespace: String,
    root: PathBuf,
}

impl Component {
    pub fn new(namespace: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Component {
            namespace: namespace.into(),
            root: root.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Read-only view of component registration consumed by the resolver.
pub trait NamespaceRegistry: Send + Sync {
    /// The component owning `namespace`, if any.
    fn lookup_owner(&self, namespace: &str) -> Option<&Component>;

    /// Is there an application workspace to resolve against at all?
    fn is_workspace_active(&self) -> bool;
}

/// An application plus its plugins.
///
/// Owner lookup checks the application first, then plugins in registration
/// order. The workspace is active only when an application is present.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    app: Option<Component>,
    plugins: Vec<Component>,
}

impl Workspace {
    pub fn new(app: Component) -> Self {
        Workspace {
            app: Some(app),
            plugins: Vec::new(),
        }
    }

    /// A workspace with no application; every resolution fails.
    pub fn inactive() -> Self {
        Self::default()
    }

    pub fn app(&self) -> Option<&Component> {
        self.app.as_ref()
    }

    pub fn plugins(&self) -> &[Component] {
        &self.plugins
    }

    fn components(&self) -> impl Iterator<Item = &Component> {
        self.app.iter().chain(self.plugins.iter())
    }

    /// Register a plugin. Namespaces are unique across the workspace.
    pub fn add_plugin(&mut self, plugin: Component) -> Result<(), RegistryError> {
        if self.components().any(|c| c.namespace == plugin.namespace) {
            return Err(RegistryError::DuplicateNamespace {
                namespace: plugin.namespace,
            });
        }
        self.plugins.push(plugin);
        Ok(())
    }

    pub fn with_plugin(mut self, plugin: Component) -> Result<Self, RegistryError> {
        self.add_plugin(plugin)?;
        Ok(self)
    }
}

impl NamespaceRegistry for Workspace {
    fn lookup_owner(&self, namespace: &str) -> Option<&Component> {
        self.components().find(|c| c.namespace == namespace)
    }

    fn is_workspace_active(&self) -> bool {
        self.app.is_some()
    }
}
