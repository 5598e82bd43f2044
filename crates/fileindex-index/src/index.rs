//! The index document.

use fileindex_core::{basename_of, normalize_key};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The persisted index: a case-insensitive basename lookup plus the
/// sorted list of every indexed path.
///
/// Field order here is the key order in the JSON document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileIndex {
    /// Case-folded basename to the full path of the last file seen with it.
    pub basenames: BTreeMap<String, String>,
    /// Every indexed path, sorted ascending.
    pub paths: Vec<String>,
}

impl FileIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a file by basename, ignoring case.
    ///
    /// The query may carry an extension (`Note.md`); if the full name
    /// isn't a known basename, the extension is dropped and tried again.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.basenames
            .get(&normalize_key(name))
            .or_else(|| self.basenames.get(&normalize_key(basename_of(name))))
            .map(String::as_str)
    }

    /// Number of indexed paths.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FileIndex {
        let mut index = FileIndex::new();
        index
            .basenames
            .insert("note".to_string(), "B/note.md".to_string());
        index
            .basenames
            .insert("site.tar".to_string(), "site.tar.gz".to_string());
        index.paths = vec!["B/note.md".to_string(), "site.tar.gz".to_string()];
        index
    }

    #[test]
    fn test_lookup_ignores_case() {
        let index = sample();
        assert_eq!(index.lookup("NOTE"), Some("B/note.md"));
        assert_eq!(index.lookup("Note"), Some("B/note.md"));
        assert_eq!(index.lookup("missing"), None);
    }

    #[test]
    fn test_lookup_accepts_extension() {
        let index = sample();
        assert_eq!(index.lookup("Note.md"), Some("B/note.md"));
        assert_eq!(index.lookup("site.tar"), Some("site.tar.gz"));
        assert_eq!(index.lookup("site.tar.gz"), Some("site.tar.gz"));
    }

    #[test]
    fn test_serializes_basenames_before_paths() {
        let json = serde_json::to_string(&sample()).unwrap();
        let basenames_at = json.find("\"basenames\"").unwrap();
        let paths_at = json.find("\"paths\"").unwrap();
        assert!(basenames_at < paths_at);
    }
}
