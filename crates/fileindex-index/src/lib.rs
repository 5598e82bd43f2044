//! fileindex Index - building and persisting the file index
//!
//! This crate turns a flat file listing into a [`FileIndex`]:
//! - ignored paths are dropped
//! - remaining paths are keyed by case-folded basename
//! - the path list is sorted
//!
//! and writes it out as canonical, tab-indented JSON so that an
//! unchanged tree always produces byte-identical output.

pub mod builder;
pub mod index;
pub mod store;

pub use builder::{build_index, BuildReport, Collision, IndexBuilder};
pub use index::FileIndex;
pub use store::{to_canonical_json, IndexStore, PersistOutcome, StoreError};
