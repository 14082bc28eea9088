//! JavaScript and JSX adapter. The TypeScript grammars share its node kinds,
//! so the queries and span conversion here serve them too.

use tree_sitter::Node;

use super::query::{brace_body, delimited_literal};
use super::{BodyRange, LiteralRange};

pub(super) fn grammar() -> tree_sitter::Language {
    tree_sitter_javascript::LANGUAGE.into()
}

// Arrow functions with expression bodies are left alone.
pub(super) const BODY_QUERY: &str = r#"
(function_declaration body: (statement_block) @body)
(generator_function_declaration body: (statement_block) @body)
(function_expression body: (statement_block) @body)
(generator_function body: (statement_block) @body)
(method_definition body: (statement_block) @body)
(arrow_function body: (statement_block) @body)
"#;

pub(super) const LITERAL_QUERY: &str = r#"
(string) @literal
(template_string) @literal
"#;

const ATOMS: &[&str] = &["escape_sequence", "template_substitution"];

pub(super) fn body_range(node: Node<'_>, source: &str) -> Option<BodyRange> {
    Some(brace_body(node, source))
}

pub(super) fn literal_range(node: Node<'_>, _source: &str) -> Option<LiteralRange> {
    delimited_literal(node, 0, 1, ATOMS)
}
