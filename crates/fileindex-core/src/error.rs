//! Error types for loading ignore patterns.
//!
//! A `ConfigError` never takes the indexer down. Callers log it and keep
//! whatever pattern set was active before the failed reload.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience type for functions that can fail while loading patterns.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Things that can go wrong when reading the ignore list.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The ignore file exists but couldn't be inspected or read.
    #[error("failed to read ignore file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The ignore file isn't a JSON array of strings.
    #[error("ignore file '{path}' is not a JSON array of strings: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// One of the patterns is not a valid regular expression.
    #[error("invalid ignore pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl ConfigError {
    /// Creates an IO error with the path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
