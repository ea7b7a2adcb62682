//! Host runtime for unit scripts.
//!
//! - **[`ds`]** - identifiers, scopes, symbols and runtime errors
//! - **[`runtime`]** - the interpreter and its file-execution primitive

pub mod ds;
pub mod runtime;
