//! Running the body and literal queries against a parsed file.

use std::ops::Range;

use smallvec::SmallVec;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, Query, QueryCursor};

use super::{BodyRange, CodemapError, Kit, LiteralRange, SourceFile};
use crate::filter::Language;

/// Raw query hits for one file, before planning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Spans {
    pub bodies: Vec<BodyRange>,
    pub literals: Vec<LiteralRange>,
}

pub(super) fn collect_spans(
    kit: &mut Kit,
    language: Language,
    file: &SourceFile<'_>,
) -> Result<Spans, CodemapError> {
    let source = file.content;
    let tree = kit
        .parser
        .parse(source, None)
        .ok_or_else(|| CodemapError::Parse {
            path: file.path.to_path_buf(),
            message: "parser produced no tree".to_string(),
        })?;
    let root = tree.root_node();

    let bodies = run_query(&kit.bodies, root, source, |node| {
        language.body_range(node, source)
    });
    let literals = run_query(&kit.literals, root, source, |node| {
        language.literal_range(node, source)
    });

    Ok(Spans { bodies, literals })
}

/// Convert every captured node of `query` under `root`.
pub(super) fn run_query<T>(
    query: &Query,
    root: Node<'_>,
    source: &str,
    mut convert: impl FnMut(Node<'_>) -> Option<T>,
) -> Vec<T> {
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, root, source.as_bytes());
    let mut out = Vec::new();
    while let Some(m) = matches.next() {
        for capture in m.captures {
            if let Some(item) = convert(capture.node) {
                out.push(item);
            }
        }
    }
    out
}

/// Body delimited by braces. Spaces and tabs between the signature and the
/// opening brace are removed along with the body.
pub(super) fn brace_body(node: Node<'_>, source: &str) -> BodyRange {
    let start = node.start_byte();
    let padding = source
        .as_bytes()
        .get(..start)
        .map_or(0, |before| {
            before
                .iter()
                .rev()
                .take_while(|b| matches!(b, b' ' | b'\t'))
                .count()
        });
    BodyRange::new(start, node.end_byte()).with_cut_start(start - padding)
}

/// Leading whitespace of the line containing `offset`.
pub(super) fn line_indent(source: &str, offset: usize) -> &str {
    let before = source.get(..offset).unwrap_or(source);
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let line = &source[line_start..];
    let width = line
        .bytes()
        .take_while(|b| matches!(b, b' ' | b'\t'))
        .count();
    &line[..width]
}

/// Literal with fixed-width delimiters. Returns `None` for literals the
/// parser could not fully recognise.
pub(super) fn delimited_literal(
    node: Node<'_>,
    prefix_len: usize,
    quote_len: usize,
    atom_kinds: &[&str],
) -> Option<LiteralRange> {
    if node.has_error() || node.is_missing() {
        return None;
    }
    let (start, end) = (node.start_byte(), node.end_byte());
    if end - start < prefix_len + 2 * quote_len {
        return None;
    }
    let mut literal = LiteralRange::new(start, end, prefix_len, quote_len);
    collect_atoms(node, atom_kinds, &mut literal.atoms);
    Some(literal)
}

fn collect_atoms(node: Node<'_>, kinds: &[&str], atoms: &mut SmallVec<[Range<usize>; 4]>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if kinds.contains(&child.kind()) {
            atoms.push(child.byte_range());
        } else {
            collect_atoms(child, kinds, atoms);
        }
    }
}

/// First direct child of `node` with the given kind.
pub(super) fn child_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|c| c.kind() == kind);
    found
}
