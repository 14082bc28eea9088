//! Turning raw body and literal hits into a set of disjoint cuts.
//!
//! The planner is shared by every language. It drops literals that sit inside
//! an elided body, measures the rest in characters, collapses nested cuts
//! into their outermost span, and refuses plans whose spans partially
//! overlap.

use std::ops::Range;

use thiserror::Error;

use super::{BodyRange, LiteralRange};

/// Replaces the tail of a truncated literal.
pub const TRUNCATION_MARKER: &str = "...";

/// What an elided body is replaced with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// Nothing; the signature is left on its own.
    Empty,
    /// A statement on its own line at the body's indentation.
    Statement(&'static str),
}

impl Placeholder {
    fn marker(self, indent: Option<&str>) -> String {
        match self {
            Placeholder::Empty => String::new(),
            Placeholder::Statement(stmt) => format!("\n{}{}", indent.unwrap_or(""), stmt),
        }
    }
}

/// Replace `cut_start..cut_end` of the source with `marker`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformation {
    pub cut_start: usize,
    pub cut_end: usize,
    pub marker: String,
}

impl Transformation {
    pub fn span(&self) -> Range<usize> {
        self.cut_start..self.cut_end
    }
}

/// Sorted, pairwise disjoint transformations for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    transformations: Vec<Transformation>,
}

impl Plan {
    pub fn iter(&self) -> std::slice::Iter<'_, Transformation> {
        self.transformations.iter()
    }

    pub fn len(&self) -> usize {
        self.transformations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transformations.is_empty()
    }

    pub fn as_slice(&self) -> &[Transformation] {
        &self.transformations
    }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a Transformation;
    type IntoIter = std::slice::Iter<'a, Transformation>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Two cuts that intersect without one containing the other.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("overlapping cut ranges {first:?} and {second:?}")]
pub struct PlanConflict {
    pub first: Range<usize>,
    pub second: Range<usize>,
}

/// Planner settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanOptions {
    pub max_literal_len: usize,
    pub placeholder: Placeholder,
}

/// Build the plan for `source`.
///
/// Literal lengths are counted in Unicode scalar values between the
/// delimiters. A literal longer than `max_literal_len` keeps exactly that
/// many characters, unless the cut would land inside an escape sequence or
/// interpolation, in which case it moves back to that atom's start.
pub fn plan(
    source: &str,
    bodies: &[BodyRange],
    literals: &[LiteralRange],
    options: &PlanOptions,
) -> Result<Plan, PlanConflict> {
    let mut candidates = Vec::with_capacity(bodies.len() + literals.len());

    for literal in literals {
        if bodies.iter().any(|b| b.contains(literal.start, literal.end)) {
            continue;
        }
        if let Some(cut) = truncation(source, literal, options.max_literal_len) {
            candidates.push(cut);
        }
    }

    for body in bodies {
        if body.cut_start < body.end {
            candidates.push(Transformation {
                cut_start: body.cut_start,
                cut_end: body.end,
                marker: options.placeholder.marker(body.indent.as_deref()),
            });
        }
    }

    // Outer spans sort before the spans they contain.
    candidates.sort_by(|a, b| {
        a.cut_start
            .cmp(&b.cut_start)
            .then_with(|| b.cut_end.cmp(&a.cut_end))
    });

    let mut kept: Vec<Transformation> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if let Some(last) = kept.last() {
            if candidate.cut_end <= last.cut_end {
                continue;
            }
            if candidate.cut_start < last.cut_end {
                return Err(PlanConflict {
                    first: last.span(),
                    second: candidate.span(),
                });
            }
        }
        kept.push(candidate);
    }

    Ok(Plan {
        transformations: kept,
    })
}

fn truncation(source: &str, literal: &LiteralRange, max: usize) -> Option<Transformation> {
    let content = literal.content();
    let text = source.get(content.clone())?;
    // Only literals with more than `max` characters have an nth(max) char.
    let (offset, _) = text.char_indices().nth(max)?;

    let mut cut = content.start + offset;
    if let Some(atom) = literal.atoms.iter().find(|a| a.start < cut && cut < a.end) {
        cut = atom.start;
    }

    Some(Transformation {
        cut_start: cut,
        cut_end: content.end,
        marker: TRUNCATION_MARKER.to_string(),
    })
}
