//! Snapshot input: record parsing and streaming reads.
//!
//! A snapshot is a line-oriented dump produced by an external scanner, one
//! record per file or directory. This module turns it into [`Entry`] values
//! and does nothing else; indexing happens in [`crate::index`].
//!
//! # Example
//!
//! ```no_run
//! use snapdex::snapshot::{ReaderConfig, SnapshotReader};
//! use std::path::Path;
//!
//! let reader = SnapshotReader::new(ReaderConfig::default().with_strict(true));
//! let (entries, stats) = reader.read_path(Path::new("snapshot.tsv")).unwrap();
//! println!("{} records, {} malformed", stats.records, stats.malformed);
//! # let _ = entries;
//! ```

pub mod reader;
pub mod record;

pub use reader::{ReaderConfig, SnapshotError, SnapshotReader, SnapshotStats};
pub use record::{basename_of, parse_line, Entry, RecordError, DIRECTORY};
