pub mod error;
pub mod identifier;
pub mod scope;
