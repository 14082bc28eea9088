//! Rust adapter.

use tree_sitter::Node;

use super::query::{brace_body, delimited_literal};
use super::{BodyRange, LiteralRange};

pub(super) fn grammar() -> tree_sitter::Language {
    tree_sitter_rust::LANGUAGE.into()
}

pub(super) const BODY_QUERY: &str = r#"
(function_item body: (block) @body)
"#;

pub(super) const LITERAL_QUERY: &str = r#"
(string_literal) @literal
(raw_string_literal) @literal
"#;

const ATOMS: &[&str] = &["escape_sequence"];

pub(super) fn body_range(node: Node<'_>, source: &str) -> Option<BodyRange> {
    Some(brace_body(node, source))
}

/// `"…"`, `b"…"`, `c"…"` have one-byte quotes behind a letter prefix.
/// `r#"…"#` and `br##"…"##` close with the quote plus as many hashes as
/// they open with.
pub(super) fn literal_range(node: Node<'_>, source: &str) -> Option<LiteralRange> {
    let text = source.get(node.byte_range())?;
    let prefix = text.bytes().take_while(u8::is_ascii_alphabetic).count();
    let quote = if node.kind() == "raw_string_literal" {
        text[prefix..].bytes().take_while(|b| *b == b'#').count() + 1
    } else {
        1
    };
    delimited_literal(node, prefix, quote, ATOMS)
}
