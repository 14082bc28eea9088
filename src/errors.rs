//! Error types for condense.

use std::path::PathBuf;

use crate::codemap::CodemapError;
use crate::config::ConfigError;
use crate::filter::FilterError;
use crate::output::OutputError;
use crate::walker::WalkError;

/// Top-level error type for condense operations.
#[derive(Debug, thiserror::Error)]
pub enum CondenseError {
    #[error("path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("no files found in {0}")]
    NoFilesFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("walk error: {0}")]
    Walk(#[from] WalkError),

    #[error("filter error: {0}")]
    Filter(#[from] FilterError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("codemap error: {0}")]
    Codemap(#[from] CodemapError),

    #[error("output error: {0}")]
    Output(#[from] OutputError),
}

/// Map an error to its exit code.
pub fn exit_code(error: &CondenseError) -> i32 {
    match error {
        CondenseError::PathNotFound(_) => 3,
        CondenseError::NoFilesFound(_) => 5,
        CondenseError::Io(_) => 1,
        CondenseError::Walk(WalkError::NotFound { .. }) => 3,
        CondenseError::Walk(WalkError::PermissionDenied { .. }) => 4,
        CondenseError::Walk(_) => 2,
        CondenseError::Filter(_) | CondenseError::Config(_) => 2,
        CondenseError::Codemap(e) if e.is_fatal() => 70,
        CondenseError::Codemap(_) => 1,
        CondenseError::Output(_) => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(&CondenseError::PathNotFound(PathBuf::from("x"))), 3);
        assert_eq!(
            exit_code(&CondenseError::Walk(WalkError::NotFound { path: PathBuf::from("x") })),
            3
        );
        assert_eq!(
            exit_code(&CondenseError::Walk(WalkError::PermissionDenied { path: PathBuf::from("x") })),
            4
        );
        assert_eq!(exit_code(&CondenseError::NoFilesFound(PathBuf::from("."))), 5);
    }

    #[test]
    fn test_per_file_codemap_error_exit_code() {
        let err = CondenseError::Codemap(CodemapError::Format {
            path: Path::new("a.go").to_path_buf(),
            language: crate::filter::Language::Go,
            message: "bad".into(),
        });
        assert_eq!(exit_code(&err), 1);
        assert!(err.to_string().contains("a.go"));
    }
}
