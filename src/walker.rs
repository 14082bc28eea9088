//! Directory traversal with gitignore support.
//!
//! Uses the `ignore` crate to walk directories while respecting
//! .gitignore, .git/info/exclude, global gitignore, and a root-level
//! .condenseignore. Exclude globs from configuration are applied on top.
//! The root's own .condenseignore and condense.toml are never listed.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use thiserror::Error;

use crate::config::CONFIG_FILE;
use crate::filter::ExcludeSet;
use crate::output::display_path;

/// Project-specific ignore file, gitignore syntax.
pub const IGNORE_FILE: &str = ".condenseignore";

/// Errors that can occur during directory walking.
#[derive(Debug, Error)]
pub enum WalkError {
    #[error("path not found: {path}")]
    NotFound { path: PathBuf },

    #[error("permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Options for directory walking.
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Maximum depth to recurse (None = unlimited).
    pub max_depth: Option<usize>,
    /// Follow symbolic links.
    pub follow_symlinks: bool,
    /// Include hidden files and directories.
    pub include_hidden: bool,
    /// Respect .gitignore patterns.
    pub respect_gitignore: bool,
    /// Paths matching these globs (relative to the root) are skipped.
    pub exclude: ExcludeSet,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            follow_symlinks: false,
            include_hidden: false,
            respect_gitignore: true,
            exclude: ExcludeSet::default(),
        }
    }
}

impl WalkOptions {
    /// Create options that include hidden files.
    pub fn with_hidden() -> Self {
        Self {
            include_hidden: true,
            ..Default::default()
        }
    }

    /// Set maximum depth.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }
}

/// A file found by the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Path usable for reading.
    pub path: PathBuf,
    /// Path relative to the walk root; used in output and sort order.
    pub relative: PathBuf,
}

/// Collect all files under `root`, sorted by relative path as a
/// `/`-separated string.
///
/// A file root yields a single entry named after the file.
///
/// # Examples
///
/// ```no_run
/// use condense::walker::{collect_files, WalkOptions};
/// use std::path::Path;
///
/// for entry in collect_files(Path::new("."), &WalkOptions::default()).unwrap() {
///     println!("{}", entry.relative.display());
/// }
/// ```
pub fn collect_files(root: &Path, options: &WalkOptions) -> Result<Vec<WalkEntry>, WalkError> {
    let metadata = std::fs::metadata(root).map_err(|source| match source.kind() {
        std::io::ErrorKind::NotFound => WalkError::NotFound {
            path: root.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => WalkError::PermissionDenied {
            path: root.to_path_buf(),
        },
        _ => WalkError::Io {
            path: root.to_path_buf(),
            source,
        },
    })?;

    if metadata.is_file() {
        let relative = root
            .file_name()
            .map_or_else(|| root.to_path_buf(), PathBuf::from);
        return Ok(vec![WalkEntry {
            path: root.to_path_buf(),
            relative,
        }]);
    }

    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(!options.include_hidden)
        .git_ignore(options.respect_gitignore)
        .git_global(options.respect_gitignore)
        .git_exclude(options.respect_gitignore)
        .follow_links(options.follow_symlinks)
        .max_depth(options.max_depth);

    let ignore_file = root.join(IGNORE_FILE);
    if ignore_file.exists() {
        if let Some(err) = builder.add_ignore(&ignore_file) {
            tracing::warn!(path = %ignore_file.display(), error = %err, "ignoring malformed ignore file");
        }
    }

    let mut entries = Vec::new();
    for result in builder.build() {
        let entry = match result {
            Ok(entry) => entry,
            Err(ignore::Error::Io(err)) if err.kind() == std::io::ErrorKind::PermissionDenied => {
                tracing::warn!(error = %err, "skipping unreadable path");
                continue;
            }
            Err(err) => {
                tracing::debug!(error = %err, "walk error");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        let path = entry.into_path();
        let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
        if relative.as_os_str() == IGNORE_FILE || relative.as_os_str() == CONFIG_FILE {
            continue;
        }
        if options.exclude.is_excluded(&relative) {
            tracing::trace!(path = %relative.display(), "excluded by pattern");
            continue;
        }
        entries.push(WalkEntry { path, relative });
    }

    entries.sort_by_cached_key(|entry| display_path(&entry.relative));
    Ok(entries)
}
