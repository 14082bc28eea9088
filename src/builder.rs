//! Fluent builder API for condense.
//!
//! Provides both function composition and builder-style APIs for turning a
//! directory (or an in-memory set of sources) into a code map.

use std::io::Write;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::codemap::{generate_codemap, CodemapError, MapOptions, SourceFile};
use crate::config::Config;
use crate::errors::CondenseError;
use crate::filter::{classify, detect_language, passes_language_filter, ExcludeSet, FilterResult, Language};
use crate::output::{display_path, format_code_map, write_code_map, FileMap};
use crate::tokens::{Encoding, Reduction};
use crate::walker::{collect_files, WalkEntry, WalkOptions};

/// What to do when a single file cannot be condensed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Stop at the first failing file.
    #[default]
    Abort,
    /// Log the failure, leave the file out, and continue. Grammar and query
    /// failures still abort.
    Skip,
}

/// Builder for condensing a codebase.
///
/// # Examples
///
/// ```no_run
/// use condense::builder::Condense;
///
/// let result = Condense::new("./project")
///     .max_literal_len(40)
///     .languages(&[condense::filter::Language::Go])
///     .build()
///     .unwrap();
/// print!("{}", result.render());
/// ```
#[derive(Debug, Clone)]
pub struct Condense {
    root: PathBuf,
    options: MapOptions,
    walk_options: WalkOptions,
    languages: Vec<Language>,
    policy: ErrorPolicy,
    measure: Option<Encoding>,
}

impl Condense {
    /// Create a new builder for the given root path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            options: MapOptions::default(),
            walk_options: WalkOptions::default(),
            languages: Vec::new(),
            policy: ErrorPolicy::default(),
            measure: None,
        }
    }

    /// Create a builder preloaded with settings from a config file.
    pub fn from_config(root: impl Into<PathBuf>, config: &Config) -> Result<Self, CondenseError> {
        let exclude = ExcludeSet::new(&config.exclude)?;
        let policy = if config.keep_going {
            ErrorPolicy::Skip
        } else {
            ErrorPolicy::Abort
        };
        Ok(Self::new(root)
            .max_literal_len(config.max_literal_len)
            .reformat(config.reformat)
            .include_hidden(config.include_hidden)
            .languages(&config.languages)
            .exclude(exclude)
            .on_error(policy))
    }

    /// Truncate literals longer than `len` characters.
    pub fn max_literal_len(mut self, len: usize) -> Self {
        self.options.max_literal_len = len;
        self
    }

    /// Run language formatters over condensed output (default: true).
    pub fn reformat(mut self, reformat: bool) -> Self {
        self.options.reformat = reformat;
        self
    }

    /// Only include files of these languages. Empty means every text file.
    pub fn languages(mut self, langs: &[Language]) -> Self {
        self.languages = langs.to_vec();
        self
    }

    /// Include hidden files.
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.walk_options.include_hidden = include;
        self
    }

    /// Set maximum directory depth.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.walk_options.max_depth = Some(depth);
        self
    }

    /// Skip paths matching these globs.
    pub fn exclude(mut self, exclude: ExcludeSet) -> Self {
        self.walk_options.exclude = exclude;
        self
    }

    pub fn on_error(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Collect token and line statistics with the given encoding.
    pub fn measure(mut self, encoding: Encoding) -> Self {
        self.measure = Some(encoding);
        self
    }

    /// Walk the root and condense every file in parallel.
    pub fn build(self) -> Result<CondenseResult, CondenseError> {
        if !self.root.exists() {
            return Err(CondenseError::PathNotFound(self.root));
        }

        let entries: Vec<WalkEntry> = collect_files(&self.root, &self.walk_options)?
            .into_iter()
            .filter(|entry| passes_language_filter(&entry.relative, &self.languages))
            .collect();
        if entries.is_empty() {
            return Err(CondenseError::NoFilesFound(self.root));
        }

        tracing::info!(root = %self.root.display(), files = entries.len(), "condensing");

        let policy = self.policy;
        let processed = entries
            .par_iter()
            .map(|entry| match process_entry(entry, &self.options, self.measure) {
                Err(err) if policy == ErrorPolicy::Skip && !err.is_fatal() => {
                    tracing::warn!(path = %entry.relative.display(), error = %err, "skipping file");
                    Ok(Processed::Skipped(SkippedFile {
                        path: entry.relative.clone(),
                        reason: err.to_string(),
                    }))
                }
                other => other,
            })
            .collect::<Result<Vec<_>, CodemapError>>()?;

        let mut result = CondenseResult {
            files: Vec::with_capacity(processed.len()),
            skipped: Vec::new(),
            reduction: self.measure.map(|_| Reduction::default()),
        };
        for item in processed {
            match item {
                Processed::Mapped(file, reduction) => {
                    if let (Some(total), Some(r)) = (result.reduction.as_mut(), reduction) {
                        *total += r;
                    }
                    result.files.push(file);
                }
                Processed::Skipped(skipped) => result.skipped.push(skipped),
            }
        }

        tracing::info!(
            mapped = result.files.len(),
            skipped = result.skipped.len(),
            "condense finished"
        );
        Ok(result)
    }
}

/// A file left out of the code map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of a condense run.
#[derive(Debug, Clone, Default)]
pub struct CondenseResult {
    /// Condensed files, sorted by relative path.
    pub files: Vec<FileMap>,
    /// Files left out: binary, non-UTF-8, or failed under `ErrorPolicy::Skip`.
    pub skipped: Vec<SkippedFile>,
    /// Totals, when measuring was requested.
    pub reduction: Option<Reduction>,
}

impl CondenseResult {
    /// Render the `<code_map>` document.
    pub fn render(&self) -> String {
        format_code_map(&self.files)
    }

    /// Stream the `<code_map>` document.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), CondenseError> {
        write_code_map(writer, &self.files)?;
        Ok(())
    }

    /// Look up the code map of one file by relative path.
    pub fn file(&self, path: &Path) -> Option<&FileMap> {
        self.files.iter().find(|f| f.path == path)
    }
}

enum Processed {
    Mapped(FileMap, Option<Reduction>),
    Skipped(SkippedFile),
}

fn process_entry(
    entry: &WalkEntry,
    options: &MapOptions,
    measure: Option<Encoding>,
) -> Result<Processed, CodemapError> {
    let bytes = std::fs::read(&entry.path).map_err(|source| CodemapError::ReadFailed {
        path: entry.relative.clone(),
        source,
    })?;

    let text = match classify(&bytes) {
        FilterResult::Accept(text) => text,
        FilterResult::Reject(reason) => {
            tracing::debug!(path = %entry.relative.display(), %reason, "not condensing");
            return Ok(Processed::Skipped(SkippedFile {
                path: entry.relative.clone(),
                reason: reason.to_string(),
            }));
        }
    };

    let file = map_one(&entry.relative, text, options)?;
    let reduction = measure.map(|encoding| Reduction::measure(text, &file.content, encoding));
    Ok(Processed::Mapped(file, reduction))
}

fn map_one(path: &Path, content: &str, options: &MapOptions) -> Result<FileMap, CodemapError> {
    let source = SourceFile::new(path, content);
    let mapped = generate_codemap(&source, options)?;
    Ok(FileMap::new(path, detect_language(path), mapped))
}

// ============================================================================
// Functional API
// ============================================================================

/// Condense in-memory sources, in parallel, returning maps sorted by path.
///
/// # Examples
///
/// ```
/// use condense::builder::map_sources;
/// use condense::codemap::MapOptions;
///
/// let sources = [("b.py", "def b():\n    return 2\n"), ("a.go", "func a() int { return 1 }")];
/// let maps = map_sources(&sources, &MapOptions::default()).unwrap();
/// assert_eq!(maps[0].content, "func a() int");
/// assert_eq!(maps[1].content, "def b():\n    pass");
/// ```
pub fn map_sources<P, S>(sources: &[(P, S)], options: &MapOptions) -> Result<Vec<FileMap>, CodemapError>
where
    P: AsRef<Path> + Sync,
    S: AsRef<str> + Sync,
{
    let mut files = sources
        .par_iter()
        .map(|(path, content)| map_one(path.as_ref(), content.as_ref(), options))
        .collect::<Result<Vec<_>, _>>()?;
    files.sort_by_cached_key(|file| display_path(&file.path));
    Ok(files)
}

/// Condense a directory with default settings and render the document.
pub fn condense_path(root: impl AsRef<Path>, options: &MapOptions) -> Result<String, CondenseError> {
    let result = Condense::new(root.as_ref())
        .max_literal_len(options.max_literal_len)
        .reformat(options.reformat)
        .build()?;
    Ok(result.render())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_project() -> TempDir {
        let dir = TempDir::new().unwrap();

        fs::create_dir_all(dir.path().join("cmd")).unwrap();
        fs::write(
            dir.path().join("cmd/main.go"),
            "package main\n\nfunc main() {\n\trun(\"a string that is rather long\")\n}\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("lib.py"),
            "GREETING = \"hello there, friend\"\n\ndef greet(name):\n    return GREETING + name\n",
        )
        .unwrap();
        fs::write(dir.path().join("NOTES.md"), "# Notes\n").unwrap();

        dir
    }

    #[test]
    fn test_builder_maps_all_text_files() {
        let dir = create_test_project();

        let result = Condense::new(dir.path()).max_literal_len(5).build().unwrap();

        let paths: Vec<_> = result.files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("NOTES.md"),
                PathBuf::from("cmd").join("main.go"),
                PathBuf::from("lib.py"),
            ]
        );
        assert_eq!(result.files[0].content, "# Notes\n");
        assert_eq!(result.files[1].content, "package main\n\nfunc main()");
        assert_eq!(
            result.files[2].content,
            "GREETING = \"hello...\"\n\ndef greet(name):\n    pass"
        );
        assert!(result.reduction.is_none());
    }

    #[test]
    fn test_language_filter() {
        let dir = create_test_project();

        let result = Condense::new(dir.path())
            .languages(&[Language::Python])
            .build()
            .unwrap();

        assert_eq!(result.files.len(), 1);
        assert_eq!(result.files[0].path, PathBuf::from("lib.py"));
    }

    #[test]
    fn test_binary_file_skipped() {
        let dir = create_test_project();
        fs::write(dir.path().join("logo.png"), [0x89, b'P', b'N', b'G', 0, 0]).unwrap();

        let result = Condense::new(dir.path()).build().unwrap();

        assert!(result.file(Path::new("logo.png")).is_none());
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].path, PathBuf::from("logo.png"));
    }

    #[test]
    fn test_abort_policy_stops_on_failure() {
        let dir = create_test_project();
        fs::write(dir.path().join("broken.go"), "package main\n\nfunc f( {\n").unwrap();

        match Condense::new(dir.path()).build() {
            Err(CondenseError::Codemap(CodemapError::Format { path, .. })) => {
                assert_eq!(path, PathBuf::from("broken.go"));
            }
            other => panic!("expected format error, got {other:?}"),
        }
    }

    #[test]
    fn test_skip_policy_continues() {
        let dir = create_test_project();
        fs::write(dir.path().join("broken.go"), "package main\n\nfunc f( {\n").unwrap();

        let result = Condense::new(dir.path())
            .on_error(ErrorPolicy::Skip)
            .build()
            .unwrap();

        assert_eq!(result.files.len(), 3);
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].path, PathBuf::from("broken.go"));
    }

    #[test]
    fn test_measure_reduction() {
        let dir = create_test_project();

        let result = Condense::new(dir.path())
            .measure(Encoding::Cl100kBase)
            .build()
            .unwrap();

        let reduction = result.reduction.unwrap();
        assert_eq!(reduction.files, 3);
        assert!(reduction.map_tokens < reduction.source_tokens);
    }

    #[test]
    fn test_from_config() {
        let dir = create_test_project();
        let config = Config {
            max_literal_len: 5,
            exclude: vec!["*.md".to_string()],
            ..Config::default()
        };

        let result = Condense::from_config(dir.path(), &config).unwrap().build().unwrap();
        assert_eq!(result.files.len(), 2);
        assert!(result.file(Path::new("NOTES.md")).is_none());
    }

    #[test]
    fn test_missing_root() {
        let result = Condense::new("/nonexistent/condense/root").build();
        assert!(matches!(result, Err(CondenseError::PathNotFound(_))));
    }

    #[test]
    fn test_empty_root() {
        let dir = TempDir::new().unwrap();
        let result = Condense::new(dir.path()).build();
        assert!(matches!(result, Err(CondenseError::NoFilesFound(_))));
    }

    #[test]
    fn test_map_sources_order_independent() {
        let forward = [("a.go", "func a() { x() }"), ("b.go", "func b() { y() }")];
        let reverse = [("b.go", "func b() { y() }"), ("a.go", "func a() { x() }")];

        let options = MapOptions::default();
        assert_eq!(
            map_sources(&forward, &options).unwrap(),
            map_sources(&reverse, &options).unwrap()
        );
    }

    #[test]
    fn test_map_sources_sorted_by_path_string() {
        let sources = [("a/b.go", "package a"), ("a-b/x.go", "package ab"), ("a.go", "package p")];
        let maps = map_sources(&sources, &MapOptions::default()).unwrap();
        let paths: Vec<String> = maps.iter().map(|m| display_path(&m.path)).collect();
        assert_eq!(paths, ["a-b/x.go", "a.go", "a/b.go"]);
    }

    #[test]
    fn test_condense_path_renders_document() {
        let dir = create_test_project();
        let doc = condense_path(dir.path(), &MapOptions::with_max_literal_len(5)).unwrap();
        assert!(doc.starts_with("<code_map>\n<file>\n<path>NOTES.md</path>\n"));
        assert!(doc.ends_with("</file_map>\n</file>\n</code_map>\n"));
    }
}
