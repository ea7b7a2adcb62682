//! Workspace manifest parsing.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::error::ConfigError;
use super::registry::{Component, Workspace};

/// A component entry (`[app]` or one of `[[plugins]]`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ComponentConfig {
    /// Namespace the component owns.
    pub namespace: String,
    /// Root directory, relative to the manifest's directory unless absolute.
    pub root: PathBuf,
    /// Whether the component is registered.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

/// Directory conventions used when deriving candidate files.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Layout {
    /// Directory under each component root holding `models`, `controllers`
    /// and `lib`.
    pub source_dir: PathBuf,
    /// Extension of loadable files.
    pub extension: String,
    /// Suffix naming the controller paired with a model.
    pub controller_suffix: String,
}

impl Default for Layout {
    fn default() -> Self {
        Layout {
            source_dir: PathBuf::from("app"),
            extension: "unit".to_string(),
            controller_suffix: "Controller".to_string(),
        }
    }
}

/// Complete workspace manifest.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WorkspaceConfig {
    pub app: Option<ComponentConfig>,
    #[serde(default)]
    pub plugins: Vec<ComponentConfig>,
    #[serde(default)]
    pub autoload: Layout,
}

impl WorkspaceConfig {
    /// Load configuration from a TOML file.
    ///
    /// Expected format:
    /// ```toml
    /// [app]
    /// namespace = "Acme"
    /// root = "."
    ///
    /// [[plugins]]
    /// namespace = "Gizmo"
    /// root = "../gizmo"
    /// enabled = true
    ///
    /// [autoload]
    /// source_dir = "app"
    /// extension = "unit"
    /// controller_suffix = "Controller"
    /// ```
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn layout(&self) -> &Layout {
        &self.autoload
    }

    /// Build the registry. Relative roots are resolved against `base_dir`;
    /// disabled plugins are skipped.
    pub fn into_workspace(self, base_dir: &Path) -> Result<Workspace, ConfigError> {
        let component = |c: ComponentConfig| Component::new(c.namespace, base_dir.join(c.root));

        let mut workspace = match self.app.filter(|app| app.enabled) {
            Some(app) => Workspace::new(component(app)),
            None => Workspace::inactive(),
        };
        for plugin in self.plugins.into_iter().filter(|p| p.enabled) {
            workspace.add_plugin(component(plugin))?;
        }
        Ok(workspace)
    }
}
