//! Language detection and content filtering.
//!
//! Decides which language adapter handles a file (by extension) and whether
//! a file's bytes are text at all. Files with an unrecognized extension are
//! still mapped; they pass through unchanged.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of leading bytes inspected by the binary heuristic.
pub const SNIFF_LEN: usize = 8 * 1024;

/// Languages with a dedicated condensing adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Go,
    Java,
    Python,
    JavaScript,
    TypeScript,
    Tsx,
    Rust,
}

impl Language {
    /// Every supported language, in display order.
    pub fn all() -> &'static [Language] {
        &[
            Language::Go,
            Language::Java,
            Language::Python,
            Language::JavaScript,
            Language::TypeScript,
            Language::Tsx,
            Language::Rust,
        ]
    }

    /// File extensions (without the dot) handled by this language.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Language::Go => &["go"],
            Language::Java => &["java"],
            Language::Python => &["py", "pyi"],
            Language::JavaScript => &["js", "jsx", "mjs", "cjs"],
            Language::TypeScript => &["ts", "mts", "cts"],
            Language::Tsx => &["tsx"],
            Language::Rust => &["rs"],
        }
    }

    /// Look up a language by extension, case-insensitively.
    pub fn from_extension(ext: &str) -> Option<Language> {
        let ext = ext.to_ascii_lowercase();
        Language::all()
            .iter()
            .copied()
            .find(|lang| lang.extensions().contains(&ext.as_str()))
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Language::Go => "go",
            Language::Java => "java",
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Tsx => "tsx",
            Language::Rust => "rust",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for Language {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "go" | "golang" => Ok(Language::Go),
            "java" => Ok(Language::Java),
            "python" | "py" => Ok(Language::Python),
            "javascript" | "js" | "jsx" => Ok(Language::JavaScript),
            "typescript" | "ts" => Ok(Language::TypeScript),
            "tsx" => Ok(Language::Tsx),
            "rust" | "rs" => Ok(Language::Rust),
            _ => Err(FilterError::UnknownLanguage(s.to_string())),
        }
    }
}

/// Errors produced while interpreting filter settings.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("unknown language: {0}")]
    UnknownLanguage(String),

    #[error("invalid exclude pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

/// Detect the language of a file from its extension.
///
/// Returns `None` for files without a dedicated adapter; those are emitted
/// verbatim.
///
/// # Examples
///
/// ```
/// use condense::filter::{detect_language, Language};
/// use std::path::Path;
///
/// assert_eq!(detect_language(Path::new("cmd/main.go")), Some(Language::Go));
/// assert_eq!(detect_language(Path::new("README.md")), None);
/// ```
pub fn detect_language(path: &Path) -> Option<Language> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(Language::from_extension)
}

/// Why a file was left out of the code map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// A NUL byte appeared in the sniffed prefix.
    Binary,
    /// The content is not valid UTF-8.
    NotUtf8,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::Binary => f.write_str("binary content"),
            RejectReason::NotUtf8 => f.write_str("not valid UTF-8"),
        }
    }
}

/// Outcome of [`classify`].
#[derive(Debug, PartialEq, Eq)]
pub enum FilterResult<'a> {
    Accept(&'a str),
    Reject(RejectReason),
}

/// Decide whether raw file bytes can be condensed, borrowing them as text.
pub fn classify(bytes: &[u8]) -> FilterResult<'_> {
    let sniff = &bytes[..bytes.len().min(SNIFF_LEN)];
    if sniff.contains(&0) {
        return FilterResult::Reject(RejectReason::Binary);
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => FilterResult::Accept(text),
        Err(_) => FilterResult::Reject(RejectReason::NotUtf8),
    }
}

/// Check a path against an optional language allow-list.
///
/// An empty allow-list admits every file, including unsupported ones. A
/// non-empty list admits only files of the listed languages.
pub fn passes_language_filter(path: &Path, allowed: &[Language]) -> bool {
    if allowed.is_empty() {
        return true;
    }
    detect_language(path).is_some_and(|lang| allowed.contains(&lang))
}

/// Glob patterns matched against relative paths.
#[derive(Debug, Clone, Default)]
pub struct ExcludeSet {
    patterns: Vec<glob::Pattern>,
}

impl ExcludeSet {
    /// Compile the given glob patterns.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, FilterError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                glob::Pattern::new(p.as_ref()).map_err(|source| FilterError::InvalidPattern {
                    pattern: p.as_ref().to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// True when the relative path, or its file name, matches any pattern.
    pub fn is_excluded(&self, relative: &Path) -> bool {
        let options = glob::MatchOptions {
            require_literal_separator: false,
            ..Default::default()
        };
        let file_name = relative.file_name().map(Path::new);
        self.patterns.iter().any(|pattern| {
            pattern.matches_path_with(relative, options)
                || file_name.is_some_and(|name| pattern.matches_path_with(name, options))
        })
    }
}
