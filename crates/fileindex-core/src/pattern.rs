//! Ignore patterns.
//!
//! The ignore list is a JSON array of regular expressions. A path is left
//! out of the index when at least one of them matches anywhere in it.

use crate::error::{ConfigError, Result};
use regex::Regex;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// An ordered set of compiled ignore patterns.
///
/// The default set is empty and matches nothing, which is the
/// "no filtering configured" state.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Regex>,
}

impl PatternSet {
    /// Creates a set that ignores nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compiles raw pattern strings, keeping their order.
    ///
    /// Fails on the first pattern the regex engine rejects.
    pub fn compile<I, S>(raw: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = raw
            .into_iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    /// Parses ignore-file contents: a JSON array of pattern strings.
    pub fn from_json(text: &str) -> Result<Self> {
        Self::parse_at(text, PathBuf::new())
    }

    /// Loads the ignore list from disk.
    ///
    /// A missing file, or a directory sitting where the file should be,
    /// yields the empty set. Anything that exists but can't be read or
    /// parsed is an error, so a bad edit never silently disables filtering.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use fileindex_core::PatternSet;
    /// use std::path::Path;
    ///
    /// let patterns = PatternSet::load(Path::new("file-index-ignore.json")).unwrap();
    /// println!("{} ignore patterns", patterns.len());
    /// ```
    pub fn load(path: &Path) -> Result<Self> {
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(
                    "Ignore file does not exist, not ignoring anything: {}",
                    path.display()
                );
                return Ok(Self::empty());
            }
            Err(e) => return Err(ConfigError::io(path, e)),
        };

        if metadata.is_dir() {
            debug!(
                "Ignore file is actually a directory, not ignoring anything: {}",
                path.display()
            );
            return Ok(Self::empty());
        }

        let text = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let set = Self::parse_at(&text, path.to_path_buf())?;
        debug!("Determined ignore list to be: {:?}", set.patterns());
        Ok(set)
    }

    fn parse_at(text: &str, path: PathBuf) -> Result<Self> {
        let raw: Vec<String> =
            serde_json::from_str(text).map_err(|source| ConfigError::Parse { path, source })?;
        Self::compile(&raw)
    }

    /// Returns true if any pattern matches the path.
    pub fn matches(&self, path: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(path))
    }

    /// The source text of each pattern, in order.
    pub fn patterns(&self) -> Vec<&str> {
        self.patterns.iter().map(Regex::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
