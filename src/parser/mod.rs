mod api;
pub mod ast;

pub use api::{ParseError, Rule, UnitParser};
