use crate::index::FileIndex;
use serde::Serialize;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("cannot write index where a directory exists: {0}")]
    DirectoryInTheWay(PathBuf),
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Corrupted index '{path}': {source}")]
    Corrupted {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// What `persist` did to the target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    /// No file existed; one was created.
    Created,
    /// An existing file with different contents was replaced.
    Overwritten,
    /// The file already held exactly these contents; nothing was written.
    Unchanged,
}

/// Renders an index as tab-indented JSON with no trailing newline.
///
/// Equal indexes always render to identical bytes.
pub fn to_canonical_json(index: &FileIndex) -> Result<String, StoreError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    index.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Reads and writes the index file at a fixed location.
pub struct IndexStore {
    target: PathBuf,
}

impl IndexStore {
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
        }
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Writes the index to the target path.
    ///
    /// The new contents land in a hidden temporary sibling which is then
    /// renamed over the target, so readers never see a half-written file.
    /// A directory at the target is an error and nothing is written.
    pub fn persist(&self, index: &FileIndex) -> Result<PersistOutcome, StoreError> {
        let contents = to_canonical_json(index)?;

        let existing = match fs::metadata(&self.target) {
            Ok(meta) if meta.is_dir() => {
                debug!(
                    "Cannot create file index, as there's a directory at: {}",
                    self.target.display()
                );
                return Err(StoreError::DirectoryInTheWay(self.target.clone()));
            }
            Ok(meta) => {
                let bytes = fs::read(&self.target).map_err(|e| StoreError::io(&self.target, e))?;
                Some((bytes, meta.permissions()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(StoreError::io(&self.target, e)),
        };

        match existing {
            Some((bytes, _)) if bytes == contents.as_bytes() => {
                debug!("File index is up to date: {}", self.target.display());
                Ok(PersistOutcome::Unchanged)
            }
            Some((_, permissions)) => {
                debug!(
                    "File index already exists, overwriting contents of: {}",
                    self.target.display()
                );
                self.write_atomic(contents.as_bytes(), Some(permissions))?;
                Ok(PersistOutcome::Overwritten)
            }
            None => {
                debug!(
                    "File index does not exist, creating it right now at: {}",
                    self.target.display()
                );
                self.write_atomic(contents.as_bytes(), None)?;
                Ok(PersistOutcome::Created)
            }
        }
    }

    /// Loads the index currently on disk, if there is one.
    pub fn load(&self) -> Result<Option<FileIndex>, StoreError> {
        let text = match fs::read_to_string(&self.target) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(&self.target, e)),
        };

        let index = serde_json::from_str(&text).map_err(|source| StoreError::Corrupted {
            path: self.target.clone(),
            source,
        })?;
        Ok(Some(index))
    }

    fn write_atomic(
        &self,
        bytes: &[u8],
        permissions: Option<fs::Permissions>,
    ) -> Result<(), StoreError> {
        let parent = match self.target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;

        let name = self
            .target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let prefix = format!(".{}.", name);

        let mut tmp = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(".tmp")
            .tempfile_in(parent)
            .map_err(|e| StoreError::io(parent, e))?;

        tmp.write_all(bytes)
            .map_err(|e| StoreError::io(tmp.path(), e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| StoreError::io(tmp.path(), e))?;

        let permissions = permissions.or_else(default_permissions);
        if let Some(permissions) = permissions {
            tmp.as_file()
                .set_permissions(permissions)
                .map_err(|e| StoreError::io(tmp.path(), e))?;
        }

        tmp.persist(&self.target)
            .map_err(|e| StoreError::io(&self.target, e.error))?;
        Ok(())
    }
}

// Temporary files are created owner-only; a fresh index should be readable
// like any other file the user creates.
#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_index;
    use fileindex_core::PatternSet;
    use tempfile::tempdir;

    fn sample() -> FileIndex {
        build_index(["b.md", "A/Note.md", "a.md"], &PatternSet::empty())
    }

    #[test]
    fn test_canonical_json_is_tab_indented() {
        let json = to_canonical_json(&sample()).unwrap();
        let expected = "{\n\t\"basenames\": {\n\t\t\"a\": \"a.md\",\n\t\t\"b\": \"b.md\",\n\t\t\"note\": \"A/Note.md\"\n\t},\n\t\"paths\": [\n\t\t\"A/Note.md\",\n\t\t\"a.md\",\n\t\t\"b.md\"\n\t]\n}";
        assert_eq!(json, expected);
    }

    #[test]
    fn test_empty_index_json() {
        let json = to_canonical_json(&FileIndex::new()).unwrap();
        assert_eq!(json, "{\n\t\"basenames\": {},\n\t\"paths\": []\n}");
    }

    #[test]
    fn test_persist_creates_then_overwrites() {
        let dir = tempdir().unwrap();
        let store = IndexStore::new(dir.path().join("file-index.json"));

        assert_eq!(store.persist(&sample()).unwrap(), PersistOutcome::Created);

        let smaller = build_index(["only.md"], &PatternSet::empty());
        assert_eq!(store.persist(&smaller).unwrap(), PersistOutcome::Overwritten);
        assert_eq!(store.load().unwrap(), Some(smaller));
    }

    #[test]
    fn test_persisting_twice_is_byte_identical() {
        let dir = tempdir().unwrap();
        let store = IndexStore::new(dir.path().join("file-index.json"));

        store.persist(&sample()).unwrap();
        let first = fs::read(store.target()).unwrap();

        assert_eq!(store.persist(&sample()).unwrap(), PersistOutcome::Unchanged);
        let second = fs::read(store.target()).unwrap();

        assert_eq!(first, second);
        assert_eq!(first, to_canonical_json(&sample()).unwrap().into_bytes());
    }

    #[test]
    fn test_directory_at_target_is_an_error() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("file-index.json");
        fs::create_dir(&target).unwrap();

        let store = IndexStore::new(&target);
        let err = store.persist(&sample()).unwrap_err();
        assert!(matches!(err, StoreError::DirectoryInTheWay(_)));
        assert!(target.is_dir());
    }

    #[test]
    fn test_no_temporary_files_are_left_behind() {
        let dir = tempdir().unwrap();
        let store = IndexStore::new(dir.path().join("file-index.json"));
        store.persist(&sample()).unwrap();
        store.persist(&FileIndex::new()).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["file-index.json".to_string()]);
    }

    #[test]
    fn test_persist_creates_missing_parents() {
        let dir = tempdir().unwrap();
        let store = IndexStore::new(dir.path().join("meta").join("file-index.json"));
        assert_eq!(store.persist(&sample()).unwrap(), PersistOutcome::Created);
        assert!(store.target().is_file());
    }

    #[test]
    fn test_load_missing_and_corrupted() {
        let dir = tempdir().unwrap();
        let store = IndexStore::new(dir.path().join("file-index.json"));
        assert_eq!(store.load().unwrap(), None);

        fs::write(store.target(), "{ not json").unwrap();
        assert!(matches!(store.load(), Err(StoreError::Corrupted { .. })));
    }
}
