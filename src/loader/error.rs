//! Error types for the autoloader.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::runner::ds::error::LoadError;
use crate::runner::ds::identifier::Identifier;

/// Failure of a resolution attempt.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No candidate file matched, or a matched file did not define the
    /// identifier. `expected` is the matched file in the latter case.
    #[error("uninitialized constant {identifier}{}", expected_hint(.expected))]
    UninitializedSymbol {
        identifier: Identifier,
        expected: Option<PathBuf>,
        /// Candidate files probed, in probe order.
        searched: Vec<PathBuf>,
    },

    /// A matched file failed to load.
    #[error(transparent)]
    Load(#[from] LoadError),
}

fn expected_hint(expected: &Option<PathBuf>) -> String {
    match expected {
        Some(file) => format!(" (expected it to be defined in: {})", file.display()),
        None => String::new(),
    }
}

impl ResolveError {
    pub(crate) fn uninitialized(identifier: &Identifier) -> Self {
        ResolveError::UninitializedSymbol {
            identifier: identifier.clone(),
            expected: None,
            searched: Vec::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("namespace `{namespace}` is already registered")]
    DuplicateNamespace { namespace: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read workspace manifest {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse workspace manifest: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
