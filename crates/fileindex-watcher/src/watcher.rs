//! File watcher for real-time updates.
//!
//! Uses the notify crate to watch the indexed tree and translates raw
//! notifications into the three changes the indexer reacts to: files
//! created, deleted, or renamed. Content edits are dropped, except for
//! the ignore list itself.

use crate::scanner::{is_hidden, to_relative};
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A change in the indexed tree, with root-relative paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    Created(String),
    Deleted(String),
    Renamed { from: String, to: String },
    /// Contents changed. Only reported for the ignore list.
    Modified(String),
}

impl FileChange {
    /// Every path this change touches.
    pub fn paths(&self) -> Vec<&str> {
        match self {
            Self::Created(path) | Self::Deleted(path) | Self::Modified(path) => {
                vec![path.as_str()]
            }
            Self::Renamed { from, to } => vec![from.as_str(), to.as_str()],
        }
    }
}

impl fmt::Display for FileChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created(path) => write!(f, "created {}", path),
            Self::Deleted(path) => write!(f, "deleted {}", path),
            Self::Renamed { from, to } => write!(f, "renamed {} -> {}", from, to),
            Self::Modified(path) => write!(f, "modified {}", path),
        }
    }
}

/// Decides which notifications become FileChanges.
#[derive(Debug, Clone)]
pub struct EventFilter {
    /// Absolute, canonical root of the tree.
    pub root: PathBuf,
    /// Root-relative path of the ignore list, if it lives inside the root.
    pub ignore_file: Option<String>,
    /// Report changes to hidden paths too.
    pub include_hidden: bool,
}

impl EventFilter {
    fn relative(&self, path: &Path) -> Option<String> {
        let relative = to_relative(&self.root, path)?;
        if !self.include_hidden && is_hidden(&relative) {
            return None;
        }
        Some(relative)
    }

    fn each(&self, event: &Event, make: fn(String) -> FileChange) -> Vec<FileChange> {
        event
            .paths
            .iter()
            .filter_map(|path| self.relative(path))
            .map(make)
            .collect()
    }
}

/// Translates a raw notification into FileChanges.
///
/// Half of a rename (only the old or only the new name is known, or the
/// name moved in or out of the visible tree) is reported as the delete
/// or create it amounts to.
pub fn convert_event(filter: &EventFilter, event: &Event) -> Vec<FileChange> {
    match &event.kind {
        EventKind::Create(_) => filter.each(event, FileChange::Created),
        EventKind::Remove(_) => filter.each(event, FileChange::Deleted),
        EventKind::Modify(ModifyKind::Name(mode)) => match mode {
            RenameMode::Both if event.paths.len() >= 2 => {
                let from = filter.relative(&event.paths[0]);
                let to = filter.relative(&event.paths[1]);
                match (from, to) {
                    (Some(from), Some(to)) => vec![FileChange::Renamed { from, to }],
                    (Some(from), None) => vec![FileChange::Deleted(from)],
                    (None, Some(to)) => vec![FileChange::Created(to)],
                    (None, None) => Vec::new(),
                }
            }
            RenameMode::From => filter.each(event, FileChange::Deleted),
            RenameMode::To => filter.each(event, FileChange::Created),
            _ => event
                .paths
                .iter()
                .filter_map(|path| {
                    let relative = filter.relative(path)?;
                    Some(if path.exists() {
                        FileChange::Created(relative)
                    } else {
                        FileChange::Deleted(relative)
                    })
                })
                .collect(),
        },
        EventKind::Modify(_) => filter
            .each(event, FileChange::Modified)
            .into_iter()
            .filter(|change| {
                filter
                    .ignore_file
                    .as_deref()
                    .is_some_and(|ignore_file| change.paths() == [ignore_file])
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Watches a directory tree and hands each change to a callback.
///
/// Notifications stop when the watcher is dropped.
pub struct FileWatcher {
    watcher: notify::RecommendedWatcher,
    root: PathBuf,
}

impl FileWatcher {
    /// Starts watching `filter.root` recursively.
    ///
    /// `handler` runs on the notification backend's thread, so it should
    /// only queue the change for processing elsewhere.
    pub fn new<F>(filter: EventFilter, handler: F) -> Result<Self, notify::Error>
    where
        F: Fn(FileChange) + Send + 'static,
    {
        let root = filter.root.clone();

        let mut watcher =
            notify::recommended_watcher(move |res: Result<Event, notify::Error>| match res {
                Ok(event) => {
                    for change in convert_event(&filter, &event) {
                        debug!("File {}", change);
                        handler(change);
                    }
                }
                Err(e) => warn!("Watch error: {}", e),
            })?;

        watcher.watch(&root, RecursiveMode::Recursive)?;

        info!("Watching {} for changes", root.display());

        Ok(Self { watcher, root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        if let Err(e) = self.watcher.unwatch(&self.root) {
            debug!("Failed to unwatch {}: {}", self.root.display(), e);
        }
        debug!("Stopped watching {}", self.root.display());
    }
}
