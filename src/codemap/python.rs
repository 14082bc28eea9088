//! Python adapter.
//!
//! Function bodies are replaced by `pass` at the body's indentation. A
//! leading docstring is kept, with `pass` placed after it.

use tree_sitter::Node;

use super::query::{child_of_kind, delimited_literal, line_indent};
use super::{BodyRange, LiteralRange};

pub(super) fn grammar() -> tree_sitter::Language {
    tree_sitter_python::LANGUAGE.into()
}

pub(super) const BODY_QUERY: &str = r#"
(function_definition body: (block) @body)
"#;

pub(super) const LITERAL_QUERY: &str = r#"
(string) @literal
"#;

const ATOMS: &[&str] = &["escape_sequence", "interpolation"];

/// Indentation added to the header line when a body sits on the same line
/// and the file gives no hint of its own.
const INDENT_STEP: &str = "    ";

pub(super) fn body_range(node: Node<'_>, source: &str) -> Option<BodyRange> {
    let function = node.parent()?;
    let colon = {
        let mut cursor = function.walk();
        let colon = function
            .children(&mut cursor)
            .filter(|c| c.kind() == ":" && c.end_byte() <= node.start_byte())
            .last();
        colon?
    };
    let first = {
        let mut cursor = node.walk();
        let first = node.named_children(&mut cursor).find(|c| c.kind() != "comment");
        first
    };

    let indent = match first {
        Some(stmt) if stmt.start_position().row != colon.end_position().row => {
            line_indent(source, stmt.start_byte()).to_string()
        }
        _ => {
            let header = line_indent(source, function.start_byte());
            format!("{}{}", header, indent_step(source, header))
        }
    };

    let start = colon.end_byte();
    let cut_start = match first {
        Some(stmt) if is_docstring(stmt) => stmt.end_byte(),
        _ => start,
    };

    Some(
        BodyRange::new(start, node.end_byte())
            .with_cut_start(cut_start)
            .with_indent(indent),
    )
}

/// One level of indentation in this file: a tab when the file indents with
/// tabs, four spaces otherwise.
fn indent_step(source: &str, header: &str) -> &'static str {
    let first_indent = if header.is_empty() {
        source
            .lines()
            .find_map(|line| line.chars().next().filter(|c| *c == ' ' || *c == '\t'))
    } else {
        header.chars().next()
    };
    match first_indent {
        Some('\t') => "\t",
        _ => INDENT_STEP,
    }
}

fn is_docstring(stmt: Node<'_>) -> bool {
    stmt.kind() == "expression_statement"
        && stmt.named_child_count() == 1
        && stmt
            .named_child(0)
            .is_some_and(|expr| matches!(expr.kind(), "string" | "concatenated_string"))
}

pub(super) fn literal_range(node: Node<'_>, _source: &str) -> Option<LiteralRange> {
    let open = child_of_kind(node, "string_start")?.byte_range().len();
    let close = child_of_kind(node, "string_end")?.byte_range().len();
    if close == 0 || open < close {
        return None;
    }
    delimited_literal(node, open - close, close, ATOMS)
}
