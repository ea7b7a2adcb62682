use crate::runner::ds::identifier::Identifier;

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    /// 1-based source line the statement starts on.
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    /// `define Gear`
    Define(String),
    /// `use Acme::Gear`
    Use(Identifier),
    /// `load "relative/path.unit"`
    Load(String),
    /// `namespace Acme::Widgets { ... }`
    Namespace {
        path: Identifier,
        body: Vec<Statement>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    pub body: Vec<Statement>,
}
