//! fileindex Core - ignore patterns and file records
//!
//! This crate holds the leaf types of the indexer: the compiled ignore
//! list that decides which paths are left out, and the file record that
//! knows how a path maps to its lookup key.
//!
//! # Example
//!
//! ```
//! use fileindex_core::{FileRecord, PatternSet};
//!
//! let patterns = PatternSet::compile([r"\.tmp$"]).unwrap();
//! assert!(patterns.matches("draft.tmp"));
//!
//! let record = FileRecord::new("notes/Draft.md");
//! assert_eq!(record.lookup_key(), "draft");
//! ```

pub mod error;
pub mod pattern;
pub mod record;

pub use error::{ConfigError, Result};
pub use pattern::PatternSet;
pub use record::{basename_of, normalize_key, FileRecord};
