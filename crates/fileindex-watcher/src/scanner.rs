//! Directory scanning.
//!
//! Produces the flat file listing the index is built from: every file
//! under the root, as root-relative slash-delimited paths, in a stable
//! depth-first order.

use crate::error::{Result, WatchError};
use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path};
use tracing::{debug, warn};

/// Options for walking the indexed tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// Include dot-files and files under dot-directories.
    pub include_hidden: bool,

    /// Skip files excluded by `.gitignore` and git's exclude files.
    pub respect_gitignore: bool,

    /// Follow symbolic links when walking directories.
    pub follow_symlinks: bool,
}

/// Lists every file under `root`.
///
/// Entries are sorted by file name within each directory, so the same
/// tree always yields the same order. Unreadable entries and paths that
/// aren't valid UTF-8 are skipped with a warning.
pub fn scan_files(root: &Path, options: &ScanOptions) -> Result<Vec<String>> {
    if !root.is_dir() {
        return Err(WatchError::NotADirectory(root.to_path_buf()));
    }

    let walker = WalkBuilder::new(root)
        .hidden(!options.include_hidden)
        .ignore(false)
        .parents(false)
        .git_ignore(options.respect_gitignore)
        .git_global(options.respect_gitignore)
        .git_exclude(options.respect_gitignore)
        .require_git(false)
        .follow_links(options.follow_symlinks)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        match to_relative(root, entry.path()) {
            Some(path) => files.push(path),
            None => warn!("Skipping path that is not valid UTF-8: {}", entry.path().display()),
        }
    }

    debug!("Scanned {} files under {}", files.len(), root.display());
    Ok(files)
}

/// Converts a path under `root` to its slash-delimited relative form.
///
/// Returns `None` for paths outside the root, the root itself, and
/// paths that aren't valid UTF-8.
pub fn to_relative(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(segment) => segments.push(segment.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }

    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}

/// True if any segment of a relative path starts with a dot.
pub fn is_hidden(relative: &str) -> bool {
    relative.split('/').any(|segment| segment.starts_with('.'))
}
