use pest_consume::{match_nodes, Error, Parser};

use super::ast::*;
use crate::runner::ds::identifier::Identifier;

type Result<T> = std::result::Result<T, Error<Rule>>;
type Node<'i> = pest_consume::Node<'i, Rule, ()>;

#[derive(Parser)]
#[grammar = "parser/unit_grammar.pest"] // relative to src
pub struct UnitParser;

pub type ParseError = Error<Rule>;

impl UnitParser {
    pub fn parse_to_ast_from_str(script: &str) -> Result<Script> {
        let nodes = UnitParser::parse(Rule::script, script)?;
        let node = nodes.single()?;
        UnitParser::script(node)
    }
}

#[pest_consume::parser]
impl UnitParser {
    #[allow(non_snake_case)]
    fn EOI(_input: Node) -> Result<()> {
        Ok(())
    }

    fn ident(input: Node) -> Result<String> {
        Ok(input.as_str().to_string())
    }

    fn path(input: Node) -> Result<Identifier> {
        let segments: Vec<String> = match_nodes!(input.children();
            [ident(segments)..] => segments.collect(),
        );
        Identifier::new(segments).ok_or_else(|| input.error("empty identifier"))
    }

    fn string_inner(input: Node) -> Result<String> {
        Ok(input.as_str().to_string())
    }

    fn string(input: Node) -> Result<String> {
        Ok(match_nodes!(input.into_children();
            [string_inner(s)] => s,
        ))
    }

    fn define_stmt(input: Node) -> Result<StatementKind> {
        Ok(match_nodes!(input.into_children();
            [ident(name)] => StatementKind::Define(name),
        ))
    }

    fn use_stmt(input: Node) -> Result<StatementKind> {
        Ok(match_nodes!(input.into_children();
            [path(p)] => StatementKind::Use(p),
        ))
    }

    fn load_stmt(input: Node) -> Result<StatementKind> {
        Ok(match_nodes!(input.into_children();
            [string(file)] => StatementKind::Load(file),
        ))
    }

    fn namespace_head(input: Node) -> Result<Identifier> {
        Ok(match_nodes!(input.into_children();
            [path(p)] => p,
        ))
    }

    fn namespace_stmt(input: Node) -> Result<StatementKind> {
        Ok(match_nodes!(input.into_children();
            [namespace_head(p), statement(body)..] => StatementKind::Namespace {
                path: p,
                body: body.collect(),
            },
        ))
    }

    fn statement(input: Node) -> Result<Statement> {
        let line = input.as_span().start_pos().line_col().0;
        let kind = match_nodes!(input.into_children();
            [namespace_stmt(k)] => k,
            [define_stmt(k)] => k,
            [use_stmt(k)] => k,
            [load_stmt(k)] => k,
        );
        Ok(Statement { kind, line })
    }

    fn script(input: Node) -> Result<Script> {
        Ok(match_nodes!(input.into_children();
            [statement(body).., EOI(_)] => Script { body: body.collect() },
        ))
    }
}
