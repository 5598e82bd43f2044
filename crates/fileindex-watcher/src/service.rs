//! The re-indexing service.
//!
//! `IndexService` owns everything a rebuild needs: the config, the active
//! ignore patterns, and the index store. It is driven one change at a
//! time, and every failure is logged rather than returned, so a bad
//! ignore list or a blocked index path never stops the next change from
//! being processed.

use crate::config::WatchConfig;
use crate::error::{Result, WatchError};
use crate::scanner::{scan_files, to_relative};
use crate::watcher::{EventFilter, FileChange};
use fileindex_core::{ConfigError, PatternSet};
use fileindex_index::{Collision, IndexBuilder, IndexStore, PersistOutcome};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Summary of one rebuild.
#[derive(Debug, Clone)]
pub struct RebuildReport {
    /// What happened to the index file.
    pub outcome: PersistOutcome,

    /// Files found under the root.
    pub files_scanned: usize,

    /// Paths written to the index.
    pub paths: usize,

    /// Distinct basenames in the lookup.
    pub basenames: usize,

    /// Files skipped by the ignore patterns.
    pub ignored: usize,

    /// Basename collisions found during the build.
    pub collisions: Vec<Collision>,

    /// Time taken in milliseconds.
    pub duration_ms: u64,
}

/// Rebuilds and persists the index in response to changes.
pub struct IndexService {
    config: WatchConfig,
    ignore_key: Option<String>,
    patterns: PatternSet,
    store: IndexStore,
}

impl IndexService {
    /// Creates a service for `config`.
    ///
    /// The root is resolved to its canonical form so that paths reported
    /// by the notification backend line up with it. No patterns are
    /// loaded yet; call [`IndexService::startup`] for that.
    pub fn new(config: WatchConfig) -> Result<Self> {
        let root = config
            .root
            .canonicalize()
            .map_err(|source| WatchError::RootNotFound {
                path: config.root.clone(),
                source,
            })?;
        if !root.is_dir() {
            return Err(WatchError::NotADirectory(root));
        }

        let config = WatchConfig { root, ..config };
        let ignore_key = to_relative(&config.root, &config.ignore_path());
        let store = IndexStore::new(config.index_path());

        Ok(Self {
            config,
            ignore_key,
            patterns: PatternSet::empty(),
            store,
        })
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    /// The ignore patterns currently in effect.
    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    pub fn store(&self) -> &IndexStore {
        &self.store
    }

    /// The filter a `FileWatcher` for this service should use.
    pub fn event_filter(&self) -> EventFilter {
        EventFilter {
            root: self.config.root.clone(),
            ignore_file: self.ignore_key.clone(),
            include_hidden: self.config.scan.include_hidden,
        }
    }

    /// Loads the ignore patterns, then builds and writes the index once.
    pub fn startup(&mut self) -> Option<RebuildReport> {
        if let Err(e) = self.reload_patterns() {
            warn!("Not ignoring anything until the ignore file is fixed: {}", e);
        }
        self.recreate()
    }

    /// Reloads the ignore list from disk.
    ///
    /// On error the previously active patterns stay in effect.
    pub fn reload_patterns(&mut self) -> std::result::Result<(), ConfigError> {
        let patterns = PatternSet::load(&self.config.ignore_path())?;
        info!("Loaded {} ignore patterns", patterns.len());
        self.patterns = patterns;
        Ok(())
    }

    /// Scans the tree, builds the index, and writes it out.
    pub fn rebuild(&self) -> Result<RebuildReport> {
        let start = Instant::now();

        let files = scan_files(&self.config.root, &self.config.scan)?;
        let files_scanned = files.len();

        let mut builder = IndexBuilder::new(&self.patterns);
        builder.add_all(&files);
        let report = builder.finish();

        let outcome = self.store.persist(&report.index)?;
        let duration = start.elapsed();

        info!(
            "Indexed {} files ({} ignored, {} collisions) in {:?}: {:?}",
            report.index.paths.len(),
            report.ignored,
            report.collisions.len(),
            duration,
            outcome
        );

        Ok(RebuildReport {
            outcome,
            files_scanned,
            paths: report.index.paths.len(),
            basenames: report.index.basenames.len(),
            ignored: report.ignored,
            collisions: report.collisions,
            duration_ms: duration.as_millis() as u64,
        })
    }

    /// Rebuilds the index, logging instead of returning failures.
    ///
    /// This is the "force index recreation" action.
    pub fn recreate(&self) -> Option<RebuildReport> {
        match self.rebuild() {
            Ok(report) => Some(report),
            Err(e) => {
                warn!("Failed to rebuild file index: {}", e);
                None
            }
        }
    }

    /// True if the change involves the ignore list.
    pub fn touches_ignore_file(&self, change: &FileChange) -> bool {
        match &self.ignore_key {
            Some(key) => change.paths().contains(&key.as_str()),
            None => false,
        }
    }

    /// Reacts to one change in the tree.
    ///
    /// If the change involves the ignore list it is reloaded first. The
    /// index is then rebuilt whether or not the reload worked. Content
    /// edits of anything but the ignore list are skipped.
    pub fn handle(&mut self, change: &FileChange) -> Option<RebuildReport> {
        if self.touches_ignore_file(change) {
            debug!("Ignore file changed, reloading: {}", change);
            if let Err(e) = self.reload_patterns() {
                warn!("Keeping the previous ignore list: {}", e);
            }
        } else if let FileChange::Modified(_) = change {
            return None;
        }

        self.recreate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fileindex_index::{FileIndex, StoreError};
    use std::collections::BTreeMap;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn service(root: &Path) -> IndexService {
        IndexService::new(WatchConfig::new(root)).unwrap()
    }

    fn persisted(service: &IndexService) -> FileIndex {
        service.store().load().unwrap().unwrap()
    }

    #[test]
    fn test_startup_writes_index() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.md"), "").unwrap();
        fs::write(dir.path().join("a.md"), "").unwrap();

        let mut service = service(dir.path());
        let report = service.startup().unwrap();
        assert_eq!(report.outcome, PersistOutcome::Created);

        let expected = FileIndex {
            basenames: BTreeMap::from([
                ("a".to_string(), "a.md".to_string()),
                ("b".to_string(), "b.md".to_string()),
            ]),
            paths: vec!["a.md".to_string(), "b.md".to_string()],
        };
        assert_eq!(persisted(&service), expected);
    }

    #[test]
    fn test_ignore_file_excludes_matches() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("file-index-ignore.json"), r#"["\\.tmp$"]"#).unwrap();
        fs::write(dir.path().join("draft.tmp"), "").unwrap();
        fs::write(dir.path().join("draft.md"), "").unwrap();

        let mut service = service(dir.path());
        service.startup().unwrap();

        let index = persisted(&service);
        assert_eq!(index.paths, vec!["draft.md", "file-index-ignore.json"]);
        assert_eq!(index.basenames.get("draft").map(String::as_str), Some("draft.md"));
        assert!(!index.paths.iter().any(|p| p == "draft.tmp"));
    }

    #[test]
    fn test_malformed_ignore_file_keeps_previous_patterns() {
        let dir = tempdir().unwrap();
        let ignore = dir.path().join("file-index-ignore.json");
        fs::write(&ignore, r#"["\\.tmp$"]"#).unwrap();
        fs::write(dir.path().join("draft.tmp"), "").unwrap();

        let mut service = service(dir.path());
        service.startup().unwrap();
        assert_eq!(service.patterns().len(), 1);

        fs::write(&ignore, "[not json").unwrap();
        let report = service
            .handle(&FileChange::Modified("file-index-ignore.json".to_string()))
            .unwrap();

        assert_eq!(service.patterns().patterns(), vec![r"\.tmp$"]);
        assert_eq!(report.ignored, 1);
        assert!(!persisted(&service).paths.iter().any(|p| p == "draft.tmp"));
    }

    #[test]
    fn test_deleting_ignore_file_stops_filtering() {
        let dir = tempdir().unwrap();
        let ignore = dir.path().join("file-index-ignore.json");
        fs::write(&ignore, r#"["\\.tmp$"]"#).unwrap();
        fs::write(dir.path().join("draft.tmp"), "").unwrap();

        let mut service = service(dir.path());
        service.startup().unwrap();

        fs::remove_file(&ignore).unwrap();
        service.handle(&FileChange::Deleted("file-index-ignore.json".to_string()));

        assert!(service.patterns().is_empty());
        assert!(persisted(&service).paths.iter().any(|p| p == "draft.tmp"));
    }

    #[test]
    fn test_rename_onto_ignore_file_reloads() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("skip.tmp"), "").unwrap();

        let mut service = service(dir.path());
        service.startup().unwrap();
        assert!(service.patterns().is_empty());

        fs::write(dir.path().join("file-index-ignore.json"), r#"["\\.tmp$"]"#).unwrap();
        service.handle(&FileChange::Renamed {
            from: "staged.json".to_string(),
            to: "file-index-ignore.json".to_string(),
        });

        assert_eq!(service.patterns().len(), 1);
        assert!(!persisted(&service).paths.iter().any(|p| p == "skip.tmp"));
    }

    #[test]
    fn test_created_file_is_picked_up() {
        let dir = tempdir().unwrap();
        let mut service = service(dir.path());
        service.startup().unwrap();

        fs::write(dir.path().join("New Note.md"), "").unwrap();
        let report = service
            .handle(&FileChange::Created("New Note.md".to_string()))
            .unwrap();
        assert_eq!(report.outcome, PersistOutcome::Overwritten);

        let index = persisted(&service);
        assert_eq!(index.lookup("new note"), Some("New Note.md"));
        // The index file is part of the tree it describes.
        assert!(index.paths.iter().any(|p| p == "file-index.json"));
    }

    #[test]
    fn test_content_edits_do_not_rebuild() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.md"), "").unwrap();
        let mut service = service(dir.path());
        service.startup().unwrap();

        assert!(service
            .handle(&FileChange::Modified("a.md".to_string()))
            .is_none());
    }

    #[test]
    fn test_rebuild_with_unchanged_tree_is_unchanged() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.md"), "").unwrap();
        let mut service = service(dir.path());
        service.startup().unwrap();

        // The second pass also sees the index file itself.
        service.recreate().unwrap();
        let report = service.recreate().unwrap();
        assert_eq!(report.outcome, PersistOutcome::Unchanged);
    }

    #[test]
    fn test_directory_at_index_path_is_recoverable() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("file-index.json")).unwrap();
        fs::write(dir.path().join("a.md"), "").unwrap();

        let mut service = service(dir.path());
        assert!(service.startup().is_none());
        assert!(matches!(
            service.rebuild(),
            Err(WatchError::Store(StoreError::DirectoryInTheWay(_)))
        ));

        fs::remove_dir(dir.path().join("file-index.json")).unwrap();
        let report = service
            .handle(&FileChange::Deleted("file-index.json".to_string()))
            .unwrap();
        assert_eq!(report.outcome, PersistOutcome::Created);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = tempdir().unwrap();
        let result = IndexService::new(WatchConfig::new(dir.path().join("missing")));
        assert!(matches!(result, Err(WatchError::RootNotFound { .. })));
    }

    #[test]
    fn test_touches_ignore_file() {
        let dir = tempdir().unwrap();
        let service = service(dir.path());

        assert!(service.touches_ignore_file(&FileChange::Created(
            "file-index-ignore.json".to_string()
        )));
        assert!(service.touches_ignore_file(&FileChange::Renamed {
            from: "file-index-ignore.json".to_string(),
            to: "old-ignore.json".to_string(),
        }));
        assert!(!service.touches_ignore_file(&FileChange::Created(
            "notes/file-index-ignore.json".to_string()
        )));
    }
}
