//! Optional `condense.toml` configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codemap::DEFAULT_MAX_LITERAL_LEN;
use crate::filter::Language;

/// Configuration file looked up in the walked root.
pub const CONFIG_FILE: &str = "condense.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Settings for a run. Command-line flags take precedence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub max_literal_len: usize,
    pub reformat: bool,
    pub include_hidden: bool,
    pub exclude: Vec<String>,
    pub languages: Vec<Language>,
    /// Skip files that fail instead of aborting the run.
    pub keep_going: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_literal_len: DEFAULT_MAX_LITERAL_LEN,
            reformat: true,
            include_hidden: false,
            exclude: Vec::new(),
            languages: Vec::new(),
            keep_going: false,
        }
    }
}

pub fn default_config_path(root: &Path) -> PathBuf {
    let dir = if root.is_file() {
        root.parent().unwrap_or(root)
    } else {
        root
    };
    dir.join(CONFIG_FILE)
}

/// Load the config at `path`. A missing file is not an error.
pub fn load_config(path: &Path) -> Result<Option<Config>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(Some(config))
}
