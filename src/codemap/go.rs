//! Go adapter.

use tree_sitter::Node;

use super::query::{brace_body, delimited_literal};
use super::{BodyRange, LiteralRange};

pub(super) fn grammar() -> tree_sitter::Language {
    tree_sitter_go::LANGUAGE.into()
}

pub(super) const BODY_QUERY: &str = r#"
(function_declaration body: (block) @body)
(method_declaration body: (block) @body)
"#;

pub(super) const LITERAL_QUERY: &str = r#"
(interpreted_string_literal) @literal
(raw_string_literal) @literal
"#;

const ATOMS: &[&str] = &["escape_sequence"];

pub(super) fn body_range(node: Node<'_>, source: &str) -> Option<BodyRange> {
    Some(brace_body(node, source))
}

pub(super) fn literal_range(node: Node<'_>, _source: &str) -> Option<LiteralRange> {
    delimited_literal(node, 0, 1, ATOMS)
}
