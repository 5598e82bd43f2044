//! fileindex Watcher - keeping the index current
//!
//! This crate handles the file system side of things:
//! - Walking the tree to list every file
//! - Watching for files being created, deleted, or renamed
//! - Reloading the ignore list when it changes
//! - Rebuilding and rewriting the index after every change
//!
//! All reloads and rebuilds run on one worker, in the order the
//! changes arrived.

mod config;
mod error;
mod scanner;
mod service;
mod watcher;
mod worker;

pub use config::{WatchConfig, DEFAULT_IGNORE_FILE, DEFAULT_INDEX_FILE};
pub use error::{Result, WatchError};
pub use scanner::{scan_files, to_relative, ScanOptions};
pub use service::{IndexService, RebuildReport};
pub use watcher::{convert_event, EventFilter, FileChange, FileWatcher};
pub use worker::ChangeWatcher;
