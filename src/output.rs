//! Assembling per-file code maps into the final document.
//!
//! The layout is fixed:
//!
//! ```text
//! <code_map>
//! <file>
//! <path>src/main.go</path>
//! <file_map>
//! ...condensed source...
//! </file_map>
//! </file>
//! </code_map>
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::filter::Language;

/// Errors that can occur while writing output.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The condensed text of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMap {
    /// Path relative to the walked root.
    pub path: PathBuf,
    /// Adapter that produced `content`; `None` for pass-through files.
    pub language: Option<Language>,
    pub content: String,
}

impl FileMap {
    pub fn new(path: impl Into<PathBuf>, language: Option<Language>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            language,
            content: content.into(),
        }
    }
}

/// Render a path with `/` separators regardless of platform.
pub fn display_path(path: &Path) -> String {
    let text = path.to_string_lossy();
    if std::path::MAIN_SEPARATOR == '/' {
        text.into_owned()
    } else {
        text.replace(std::path::MAIN_SEPARATOR, "/")
    }
}

/// Format one `<file>` block.
///
/// A newline is added after the content only if it does not already end
/// with one, so pass-through files keep their exact bytes.
pub fn format_file_map(file: &FileMap) -> String {
    let path = display_path(&file.path);
    let mut out = String::with_capacity(file.content.len() + path.len() + 64);
    out.push_str("<file>\n<path>");
    out.push_str(&path);
    out.push_str("</path>\n<file_map>\n");
    out.push_str(&file.content);
    if !file.content.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("</file_map>\n</file>\n");
    out
}

/// Format the whole `<code_map>` document, in the order given.
pub fn format_code_map(files: &[FileMap]) -> String {
    let mut out = String::with_capacity(files.iter().map(|f| f.content.len() + 96).sum::<usize>() + 32);
    out.push_str("<code_map>\n");
    for file in files {
        out.push_str(&format_file_map(file));
    }
    out.push_str("</code_map>\n");
    out
}

/// Stream the document to `writer` without building it in memory.
pub fn write_code_map<W: Write>(writer: &mut W, files: &[FileMap]) -> Result<(), OutputError> {
    writer.write_all(b"<code_map>\n")?;
    for file in files {
        writer.write_all(format_file_map(file).as_bytes())?;
    }
    writer.write_all(b"</code_map>\n")?;
    writer.flush()?;
    Ok(())
}
