//! Index builder for turning a file listing into a FileIndex.
//!
//! The builder takes paths in the host's traversal order, drops the
//! ignored ones, and keys the rest by basename. Paths are sorted only
//! at the end, so the basename winner on a collision is the last file
//! in traversal order, not the last file in sorted order.

use crate::index::FileIndex;
use fileindex_core::{FileRecord, PatternSet};
use tracing::{debug, warn};

/// Two distinct files that normalize to the same basename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    /// The case-folded basename both files share.
    pub key: String,
    /// The path that held the key before.
    pub previous: String,
    /// The path that holds it now.
    pub current: String,
}

/// Everything a build produced.
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// The finished index.
    pub index: FileIndex,

    /// Basename collisions, in the order they were found.
    pub collisions: Vec<Collision>,

    /// Number of paths skipped by the ignore patterns.
    pub ignored: usize,
}

/// Builds a FileIndex one path at a time.
pub struct IndexBuilder<'a> {
    patterns: &'a PatternSet,
    index: FileIndex,
    collisions: Vec<Collision>,
    ignored: usize,
}

impl<'a> IndexBuilder<'a> {
    /// Creates a builder that filters with `patterns`.
    pub fn new(patterns: &'a PatternSet) -> Self {
        Self {
            patterns,
            index: FileIndex::new(),
            collisions: Vec::new(),
            ignored: 0,
        }
    }

    /// Adds a single path.
    ///
    /// Ignored paths are dropped. Otherwise the path is recorded and its
    /// basename key is pointed at it, replacing any earlier file.
    pub fn add(&mut self, path: &str) {
        if self.patterns.matches(path) {
            self.ignored += 1;
            return;
        }

        let record = FileRecord::new(path);
        let key = record.lookup_key();
        self.index.paths.push(record.path.clone());

        if let Some(previous) = self.index.basenames.insert(key.clone(), record.path) {
            // The same path listed twice is the same file, not a clash.
            if previous != path {
                warn!(
                    "Multiple files with the same basename detected: {} {}",
                    previous, path
                );
                self.collisions.push(Collision {
                    key,
                    previous,
                    current: path.to_string(),
                });
            }
        }
    }

    /// Adds every path from an iterator, in order.
    pub fn add_all<I, S>(&mut self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for path in paths {
            self.add(path.as_ref());
        }
    }

    /// Sorts the path list and returns the finished index.
    pub fn finish(mut self) -> BuildReport {
        self.index.paths.sort();

        debug!(
            "Determined index to be: {} paths, {} basenames, {} ignored",
            self.index.paths.len(),
            self.index.basenames.len(),
            self.ignored
        );

        BuildReport {
            index: self.index,
            collisions: self.collisions,
            ignored: self.ignored,
        }
    }
}

/// Builds an index from a file listing in one call.
///
/// # Example
///
/// ```
/// use fileindex_core::PatternSet;
/// use fileindex_index::build_index;
///
/// let patterns = PatternSet::compile([r"\.tmp$"]).unwrap();
/// let index = build_index(["b.md", "draft.tmp", "a.md"], &patterns);
/// assert_eq!(index.paths, vec!["a.md", "b.md"]);
/// ```
pub fn build_index<I, S>(files: I, patterns: &PatternSet) -> FileIndex
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut builder = IndexBuilder::new(patterns);
    builder.add_all(files);
    builder.finish().index
}
