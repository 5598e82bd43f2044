//! Error types for the watcher.

use fileindex_core::ConfigError;
use fileindex_index::StoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for watcher operations.
pub type Result<T> = std::result::Result<T, WatchError>;

/// Errors that can occur while scanning, watching, or re-indexing.
#[derive(Error, Debug)]
pub enum WatchError {
    /// The root to index doesn't exist or can't be resolved.
    #[error("root directory not found: {path}")]
    RootNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The root exists but isn't a directory.
    #[error("root is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Registering with the file system notification backend failed.
    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),

    /// The ignore list couldn't be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The index couldn't be written.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The re-indexing worker is no longer running.
    #[error("index worker has stopped")]
    WorkerStopped,
}
