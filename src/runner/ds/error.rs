use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::loader::error::ResolveError;
use crate::runner::ds::identifier::Identifier;

/// Errors raised while executing unit scripts.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("uninitialized constant {identifier}")]
    NameError { identifier: Identifier },

    #[error("{identifier} is not a namespace")]
    NotANamespace { identifier: Identifier },

    #[error("syntax error: {0}")]
    Syntax(String),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Failure of the host's file-execution primitive.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot load such file -- {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("syntax error in {}: {message}", path.display())]
    Syntax { path: PathBuf, message: String },

    #[error("error while loading {} (line {line}): {source}", path.display())]
    Execution {
        path: PathBuf,
        line: usize,
        #[source]
        source: Box<RuntimeError>,
    },
}
