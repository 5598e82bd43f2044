//! Configuration for the indexing service.

use crate::scanner::ScanOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default location of the ignore list, relative to the root.
pub const DEFAULT_IGNORE_FILE: &str = "file-index-ignore.json";

/// Default location of the generated index, relative to the root.
pub const DEFAULT_INDEX_FILE: &str = "file-index.json";

/// Where to index, and where the ignore list and index live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// The directory tree to index.
    pub root: PathBuf,

    /// Ignore list path, relative to `root` unless absolute.
    pub ignore_file: PathBuf,

    /// Index output path, relative to `root` unless absolute.
    pub index_file: PathBuf,

    /// How the tree is walked.
    pub scan: ScanOptions,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

impl WatchConfig {
    /// Creates a config for `root` with the default file locations.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ignore_file: PathBuf::from(DEFAULT_IGNORE_FILE),
            index_file: PathBuf::from(DEFAULT_INDEX_FILE),
            scan: ScanOptions::default(),
        }
    }

    pub fn with_ignore_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.ignore_file = path.into();
        self
    }

    pub fn with_index_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.index_file = path.into();
        self
    }

    pub fn with_scan(mut self, scan: ScanOptions) -> Self {
        self.scan = scan;
        self
    }

    /// Full path of the ignore list.
    pub fn ignore_path(&self) -> PathBuf {
        self.resolve(&self.ignore_file)
    }

    /// Full path of the index file.
    pub fn index_path(&self) -> PathBuf {
        self.resolve(&self.index_file)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_locations() {
        let config = WatchConfig::new("/vault");
        assert_eq!(
            config.ignore_path(),
            Path::new("/vault/file-index-ignore.json")
        );
        assert_eq!(config.index_path(), Path::new("/vault/file-index.json"));
    }

    #[test]
    fn test_absolute_overrides() {
        let config = WatchConfig::new("/vault").with_index_file("/tmp/out/index.json");
        assert_eq!(config.index_path(), Path::new("/tmp/out/index.json"));
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: WatchConfig =
            serde_json::from_str(r#"{"root": "/vault", "scan": {"include_hidden": true}}"#)
                .unwrap();
        assert_eq!(config.index_file, Path::new(DEFAULT_INDEX_FILE));
        assert_eq!(config.ignore_file, Path::new(DEFAULT_IGNORE_FILE));
        assert!(config.scan.include_hidden);
        assert!(!config.scan.follow_symlinks);
    }
}
