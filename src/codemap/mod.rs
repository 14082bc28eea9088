//! Code map generation using tree-sitter.
//!
//! Rewrites a source file into a condensed form: function and method bodies
//! are elided, over-long string literals are truncated, and everything else
//! (signatures, types, comments, docstrings) is kept byte for byte.
//!
//! Every language goes through the same pipeline: parse, query for body and
//! literal spans, plan non-overlapping cuts, rewrite, and optionally run the
//! language's formatter over the result.

mod format;
mod go;
mod java;
mod javascript;
mod plan;
mod python;
mod query;
mod rewrite;
mod rust;
mod typescript;

pub use plan::{plan, Placeholder, Plan, PlanConflict, PlanOptions, Transformation, TRUNCATION_MARKER};
pub use query::Spans;
pub use rewrite::rewrite;

use std::cell::RefCell;
use std::ops::Range;
use std::path::{Path, PathBuf};

use smallvec::SmallVec;
use thiserror::Error;
use tree_sitter::{Node, Parser, Query};

use crate::filter::{detect_language, Language};

/// Literal length (in characters, delimiters excluded) kept by default.
pub const DEFAULT_MAX_LITERAL_LEN: usize = 100;

/// A file to condense. The content must already be known to be UTF-8 text.
#[derive(Debug, Clone, Copy)]
pub struct SourceFile<'a> {
    /// Path used for language detection and error reporting.
    pub path: &'a Path,
    pub content: &'a str,
}

impl<'a> SourceFile<'a> {
    pub fn new(path: &'a Path, content: &'a str) -> Self {
        Self { path, content }
    }
}

/// A function or method body that may be elided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyRange {
    /// First byte of the body node.
    pub start: usize,
    /// One past the last byte of the body node.
    pub end: usize,
    /// First byte actually removed. Earlier than `start` when whitespace
    /// before an opening brace is absorbed, later when a docstring is kept.
    pub cut_start: usize,
    /// Indentation of the body's statements, for statement placeholders.
    pub indent: Option<String>,
}

impl BodyRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            cut_start: start,
            indent: None,
        }
    }

    pub fn with_cut_start(mut self, cut_start: usize) -> Self {
        self.cut_start = cut_start;
        self
    }

    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = Some(indent.into());
        self
    }

    /// True when `start..end` lies entirely inside this body.
    pub fn contains(&self, start: usize, end: usize) -> bool {
        self.start <= start && end <= self.end
    }
}

/// A string literal that may be truncated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralRange {
    /// First byte of the literal, prefix included.
    pub start: usize,
    /// One past the closing delimiter.
    pub end: usize,
    /// Marker characters before the opening quote (`f`, `b`, `r`, `br`).
    pub prefix_len: usize,
    /// Width of each quote delimiter.
    pub quote_len: usize,
    /// Escape sequences and interpolations a cut must not split.
    pub atoms: SmallVec<[Range<usize>; 4]>,
}

impl LiteralRange {
    pub fn new(start: usize, end: usize, prefix_len: usize, quote_len: usize) -> Self {
        Self {
            start,
            end,
            prefix_len,
            quote_len,
            atoms: SmallVec::new(),
        }
    }

    /// Byte range between the delimiters.
    pub fn content(&self) -> Range<usize> {
        self.start + self.prefix_len + self.quote_len..self.end - self.quote_len
    }
}

/// Options for generating a code map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapOptions {
    /// Literals with more characters than this are truncated.
    pub max_literal_len: usize,
    /// Run the language formatter, where one exists, over the rewritten text.
    pub reformat: bool,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            max_literal_len: DEFAULT_MAX_LITERAL_LEN,
            reformat: true,
        }
    }
}

impl MapOptions {
    pub fn with_max_literal_len(max_literal_len: usize) -> Self {
        Self {
            max_literal_len,
            ..Default::default()
        }
    }
}

/// Which of a language's queries failed to compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Body,
    Literal,
}

impl std::fmt::Display for QueryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryKind::Body => f.write_str("body"),
            QueryKind::Literal => f.write_str("literal"),
        }
    }
}

/// Errors during code map generation.
#[derive(Debug, Error)]
pub enum CodemapError {
    #[error("failed to load the {language} grammar")]
    ParseSetup {
        language: Language,
        #[source]
        source: tree_sitter::LanguageError,
    },

    #[error("invalid {kind} query for {language}: {source}")]
    Query {
        language: Language,
        kind: QueryKind,
        #[source]
        source: tree_sitter::QueryError,
    },

    #[error("parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("{path}: overlapping cut ranges {first:?} and {second:?}")]
    PlanningConflict {
        path: PathBuf,
        first: Range<usize>,
        second: Range<usize>,
    },

    #[error("{path}: {language} formatting failed: {message}")]
    Format {
        path: PathBuf,
        language: Language,
        message: String,
    },

    #[error("failed to read file: {path}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CodemapError {
    /// Grammar and query failures affect every file of a language, so a run
    /// cannot meaningfully continue past them.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CodemapError::ParseSetup { .. } | CodemapError::Query { .. })
    }

    /// The file the error concerns, if it is file-specific.
    pub fn path(&self) -> Option<&Path> {
        match self {
            CodemapError::Parse { path, .. }
            | CodemapError::PlanningConflict { path, .. }
            | CodemapError::Format { path, .. }
            | CodemapError::ReadFailed { path, .. } => Some(path),
            CodemapError::ParseSetup { .. } | CodemapError::Query { .. } => None,
        }
    }
}

/// A parser with the language's compiled queries.
pub(crate) struct Kit {
    parser: Parser,
    bodies: Query,
    literals: Query,
}

impl Kit {
    fn new(language: Language) -> Result<Self, CodemapError> {
        let grammar = language.grammar();

        let mut parser = Parser::new();
        parser
            .set_language(&grammar)
            .map_err(|source| CodemapError::ParseSetup { language, source })?;

        let bodies = Query::new(&grammar, language.body_query()).map_err(|source| {
            CodemapError::Query {
                language,
                kind: QueryKind::Body,
                source,
            }
        })?;
        let literals = Query::new(&grammar, language.literal_query()).map_err(|source| {
            CodemapError::Query {
                language,
                kind: QueryKind::Literal,
                source,
            }
        })?;

        Ok(Self {
            parser,
            bodies,
            literals,
        })
    }
}

// One kit per language per thread. Rayon workers each build their own on
// first use; nothing here may panic if the grammar fails to load.
thread_local! {
    static GO_KIT: RefCell<Option<Kit>> = const { RefCell::new(None) };
    static JAVA_KIT: RefCell<Option<Kit>> = const { RefCell::new(None) };
    static PYTHON_KIT: RefCell<Option<Kit>> = const { RefCell::new(None) };
    static JS_KIT: RefCell<Option<Kit>> = const { RefCell::new(None) };
    static TS_KIT: RefCell<Option<Kit>> = const { RefCell::new(None) };
    static TSX_KIT: RefCell<Option<Kit>> = const { RefCell::new(None) };
    static RUST_KIT: RefCell<Option<Kit>> = const { RefCell::new(None) };
}

fn kit_cell(language: Language) -> &'static std::thread::LocalKey<RefCell<Option<Kit>>> {
    match language {
        Language::Go => &GO_KIT,
        Language::Java => &JAVA_KIT,
        Language::Python => &PYTHON_KIT,
        Language::JavaScript => &JS_KIT,
        Language::TypeScript => &TS_KIT,
        Language::Tsx => &TSX_KIT,
        Language::Rust => &RUST_KIT,
    }
}

/// Run `f` with this thread's kit for `language`, building it on first use.
///
/// Calls must not nest for the same language.
pub(crate) fn with_kit<F, R>(language: Language, f: F) -> Result<R, CodemapError>
where
    F: FnOnce(&mut Kit) -> Result<R, CodemapError>,
{
    kit_cell(language).with(|cell| {
        let mut slot = cell.borrow_mut();
        let kit = match slot.take() {
            Some(kit) => kit,
            None => Kit::new(language)?,
        };
        f(slot.insert(kit))
    })
}

impl Language {
    pub(crate) fn grammar(self) -> tree_sitter::Language {
        match self {
            Language::Go => go::grammar(),
            Language::Java => java::grammar(),
            Language::Python => python::grammar(),
            Language::JavaScript => javascript::grammar(),
            Language::TypeScript => typescript::grammar(),
            Language::Tsx => typescript::tsx_grammar(),
            Language::Rust => rust::grammar(),
        }
    }

    fn body_query(self) -> &'static str {
        match self {
            Language::Go => go::BODY_QUERY,
            Language::Java => java::BODY_QUERY,
            Language::Python => python::BODY_QUERY,
            Language::JavaScript | Language::TypeScript | Language::Tsx => javascript::BODY_QUERY,
            Language::Rust => rust::BODY_QUERY,
        }
    }

    fn literal_query(self) -> &'static str {
        match self {
            Language::Go => go::LITERAL_QUERY,
            Language::Java => java::LITERAL_QUERY,
            Language::Python => python::LITERAL_QUERY,
            Language::JavaScript | Language::TypeScript | Language::Tsx => {
                javascript::LITERAL_QUERY
            }
            Language::Rust => rust::LITERAL_QUERY,
        }
    }

    fn body_range(self, node: Node, source: &str) -> Option<BodyRange> {
        match self {
            Language::Go => go::body_range(node, source),
            Language::Java => java::body_range(node, source),
            Language::Python => python::body_range(node, source),
            Language::JavaScript | Language::TypeScript | Language::Tsx => {
                javascript::body_range(node, source)
            }
            Language::Rust => rust::body_range(node, source),
        }
    }

    fn literal_range(self, node: Node, source: &str) -> Option<LiteralRange> {
        match self {
            Language::Go => go::literal_range(node, source),
            Language::Java => java::literal_range(node, source),
            Language::Python => python::literal_range(node, source),
            Language::JavaScript | Language::TypeScript | Language::Tsx => {
                javascript::literal_range(node, source)
            }
            Language::Rust => rust::literal_range(node, source),
        }
    }

    /// What replaces an elided body.
    pub fn placeholder(self) -> Placeholder {
        match self {
            Language::Python => Placeholder::Statement("pass"),
            _ => Placeholder::Empty,
        }
    }

    /// Whether rewritten output goes through a canonical formatter.
    pub fn has_formatter(self) -> bool {
        matches!(self, Language::Go)
    }
}

/// Locate elidable bodies and truncatable literals in `file`.
pub fn query_spans(language: Language, file: &SourceFile<'_>) -> Result<Spans, CodemapError> {
    with_kit(language, |kit| query::collect_spans(kit, language, file))
}

/// Condense a file whose language is already known.
pub fn condense_source(
    language: Language,
    file: &SourceFile<'_>,
    options: &MapOptions,
) -> Result<String, CodemapError> {
    let plan_options = PlanOptions {
        max_literal_len: options.max_literal_len,
        placeholder: language.placeholder(),
    };

    let plan = with_kit(language, |kit| {
        let spans = query::collect_spans(kit, language, file)?;
        plan::plan(file.content, &spans.bodies, &spans.literals, &plan_options).map_err(
            |conflict| CodemapError::PlanningConflict {
                path: file.path.to_path_buf(),
                first: conflict.first,
                second: conflict.second,
            },
        )
    })?;

    let rewritten = rewrite(file.content, &plan);
    tracing::debug!(
        path = %file.path.display(),
        %language,
        transformations = plan.len(),
        "condensed file"
    );

    if options.reformat && language.has_formatter() {
        format::reformat(language, file.path, &rewritten)
    } else {
        Ok(rewritten)
    }
}

/// Generate the code map text for one file.
///
/// Files without a language adapter are returned unchanged.
///
/// # Examples
///
/// ```
/// use condense::codemap::{generate_codemap, MapOptions, SourceFile};
/// use std::path::Path;
///
/// let file = SourceFile::new(Path::new("main.go"), "func main() { run() }\n");
/// let map = generate_codemap(&file, &MapOptions::default()).unwrap();
/// assert_eq!(map, "func main()");
/// ```
pub fn generate_codemap(file: &SourceFile<'_>, options: &MapOptions) -> Result<String, CodemapError> {
    match detect_language(file.path) {
        Some(language) => condense_source(language, file, options),
        None => {
            tracing::trace!(path = %file.path.display(), "no adapter, passing through");
            Ok(file.content.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn condense(path: &str, code: &str, max: usize) -> String {
        let file = SourceFile::new(Path::new(path), code);
        generate_codemap(&file, &MapOptions::with_max_literal_len(max)).unwrap()
    }

    #[test]
    fn test_every_language_kit_builds() {
        for lang in Language::all() {
            let built = with_kit(*lang, |_| Ok(()));
            assert!(built.is_ok(), "kit for {lang} failed: {built:?}");
        }
    }

    #[test]
    fn test_unsupported_extension_passes_through() {
        let text = "  some notes\n\twith \"a very long quoted string\" and { braces }\n\n";
        assert_eq!(condense("NOTES.txt", text, 1), text);
    }

    #[test]
    fn test_unsupported_extension_keeps_bytes_exactly() {
        let text = "\u{feff}héllo\r\nwörld\r\n";
        assert_eq!(condense("data.csv", text, 0), text);
    }

    #[test]
    fn test_literal_range_content() {
        let literal = LiteralRange::new(10, 20, 1, 3);
        assert_eq!(literal.content(), 14..17);
    }

    #[test]
    fn test_body_range_contains() {
        let body = BodyRange::new(10, 50);
        assert!(body.contains(10, 50));
        assert!(body.contains(20, 30));
        assert!(!body.contains(5, 30));
        assert!(!body.contains(40, 51));
    }

    #[test]
    fn test_deterministic_output() {
        let code = "package main\n\nconst A = \"abcdefghijklmnop\"\n\nfunc f() int {\n\treturn 1\n}\n";
        let first = condense("main.go", code, 4);
        for _ in 0..5 {
            assert_eq!(condense("main.go", code, 4), first);
        }
    }

    #[test]
    fn test_query_spans_reports_bodies_and_literals() {
        let code = "func f() {\n\tg(\"x\")\n}\n\nvar s = \"hello\"\n";
        let file = SourceFile::new(Path::new("a.go"), code);
        let spans = query_spans(Language::Go, &file).unwrap();
        assert_eq!(spans.bodies.len(), 1);
        assert_eq!(spans.literals.len(), 2);
        assert_eq!(&code[spans.bodies[0].start..spans.bodies[0].end], "{\n\tg(\"x\")\n}");
    }

    #[test]
    fn test_error_path_and_fatality() {
        let err = CodemapError::PlanningConflict {
            path: PathBuf::from("a.go"),
            first: 0..10,
            second: 5..20,
        };
        assert!(!err.is_fatal());
        assert_eq!(err.path(), Some(Path::new("a.go")));
        assert!(err.to_string().contains("0..10"));
    }
}
