//! File record representation.
//!
//! A FileRecord is a path as the index sees it: relative to the indexed
//! root, slash-delimited, with the original casing. The basename is what
//! the lookup table is keyed on.

use serde::{Deserialize, Serialize};

/// A single file known to the indexer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileRecord {
    /// Full root-relative path, e.g. `notes/Daily.md`.
    pub path: String,
    /// Final path segment without its extension, e.g. `Daily`.
    pub basename: String,
}

impl FileRecord {
    /// Creates a record from a slash-delimited path.
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let basename = basename_of(&path).to_string();
        Self { path, basename }
    }

    /// The key this file is stored under in the basename lookup.
    ///
    /// Basenames are case-folded, so `Note.md` and `note.txt` share a key.
    pub fn lookup_key(&self) -> String {
        normalize_key(&self.basename)
    }
}

/// Case-folds a basename for lookup.
pub fn normalize_key(basename: &str) -> String {
    basename.to_lowercase()
}

/// Returns the final segment of `path` with its last extension removed.
///
/// A leading dot doesn't start an extension, so `.gitignore` stays whole.
pub fn basename_of(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(dot) if dot > 0 => &name[..dot],
        _ => name,
    }
}

impl std::fmt::Display for FileRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basename_strips_directories_and_extension() {
        let record = FileRecord::new("A/Note.md");
        assert_eq!(record.path, "A/Note.md");
        assert_eq!(record.basename, "Note");
        assert_eq!(record.lookup_key(), "note");
    }

    #[test]
    fn test_only_last_extension_is_removed() {
        assert_eq!(basename_of("backups/site.tar.gz"), "site.tar");
        assert_eq!(basename_of("README"), "README");
    }

    #[test]
    fn test_dotfiles_keep_their_name() {
        assert_eq!(basename_of(".gitignore"), ".gitignore");
        assert_eq!(basename_of("config/.env.local"), ".env");
    }

    #[test]
    fn test_lookup_key_folds_unicode_case() {
        assert_eq!(FileRecord::new("Über/ÄRGER.md").lookup_key(), "ärger");
    }
}
