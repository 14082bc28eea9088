//! Canonical formatting of rewritten output.
//!
//! Go is the only language with a canonical layout in scope. The rewritten
//! text is re-parsed to make sure elision left valid syntax behind, then
//! trailing blanks and repeated blank lines are normalized the way gofmt
//! would leave them. Multi-line raw strings are never touched.

use std::ops::Range;
use std::path::Path;

use tree_sitter::{Node, Point};

use super::query::run_query;
use super::{with_kit, CodemapError};
use crate::filter::Language;

/// Validate and normalize rewritten output.
///
/// Only whitespace is normalized. Columns, including trailing comments
/// after a shortened line, are not re-aligned the way gofmt would.
pub(super) fn reformat(language: Language, path: &Path, text: &str) -> Result<String, CodemapError> {
    // The grammar needs the terminating newline the rewriter trimmed away.
    let text = &format!("{text}\n");
    let (error_at, protected) = with_kit(language, |kit| {
        let tree = kit
            .parser
            .parse(text, None)
            .ok_or_else(|| CodemapError::Parse {
                path: path.to_path_buf(),
                message: "parser produced no tree while formatting".to_string(),
            })?;
        let root = tree.root_node();

        let error_at = root
            .has_error()
            .then(|| first_error(root).unwrap_or_else(|| root.start_position()));
        let protected: Vec<Range<usize>> = run_query(&kit.literals, root, text, |node| {
            let range = node.byte_range();
            text.get(range.clone())
                .filter(|literal| literal.contains('\n'))
                .map(|_| range)
        });
        Ok((error_at, protected))
    })?;

    if let Some(point) = error_at {
        return Err(CodemapError::Format {
            path: path.to_path_buf(),
            language,
            message: format!(
                "rewritten source does not parse (line {}, column {})",
                point.row + 1,
                point.column + 1
            ),
        });
    }

    Ok(normalize_layout(text, &protected))
}

fn first_error(node: Node<'_>) -> Option<Point> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_position());
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

/// Strip trailing spaces and tabs and collapse blank-line runs, except on
/// lines whose newline falls inside a protected span.
fn normalize_layout(text: &str, protected: &[Range<usize>]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut offset = 0;
    let mut blank_run = 0;

    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();

        let (content, newline) = match line.strip_suffix('\n') {
            Some(content) => (content, true),
            None => (line, false),
        };
        let line_end = line_start + content.len();
        if protected.iter().any(|r| r.start < line_end && line_end < r.end) {
            out.push_str(line);
            blank_run = 0;
            continue;
        }

        let trimmed = content.trim_end_matches(|c| c == ' ' || c == '\t');
        if trimmed.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }

        out.push_str(trimmed);
        if newline {
            out.push('\n');
        }
    }

    out.trim().to_string()
}
