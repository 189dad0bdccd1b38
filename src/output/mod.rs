//! Output formatters for query results.
//!
//! - [`text`] for terminals and line-oriented tools
//! - [`json`] for scripting
//!
//! # Example
//!
//! ```no_run
//! use snapdex::index::{BuildConfig, IndexBuilder};
//! use snapdex::output::{write_results, QueryResults};
//! use snapdex::cli::OutputFormat;
//!
//! let index = IndexBuilder::new(BuildConfig::default()).build(Vec::new());
//! let results = QueryResults::Sizes(index.by_size(10));
//! write_results(&mut std::io::stdout(), "by-size", &results, index.stats(), OutputFormat::Json, false)
//!     .unwrap();
//! ```

use std::io::Write;

use crate::cli::OutputFormat;
use crate::index::{BuildStats, DupeGroup, EntryHit, SizeHit};

pub mod json;
pub mod text;

pub use json::JsonOutput;
pub use text::TextOutput;

/// Results of one query, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResults {
    /// Hits from `find` or `match`.
    Entries(Vec<EntryHit>),
    /// Hits from `by-size`.
    Sizes(Vec<SizeHit>),
    /// Groups from `dupes`.
    Dupes(Vec<DupeGroup>),
}

impl QueryResults {
    /// Number of hits or groups.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Entries(hits) => hits.len(),
            Self::Sizes(hits) => hits.len(),
            Self::Dupes(groups) => groups.len(),
        }
    }

    /// Whether the query matched nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Errors that can occur while writing results.
#[derive(thiserror::Error, Debug)]
pub enum OutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error while writing results: {0}")]
    Io(#[from] std::io::Error),
}

/// Render `results` in the requested format.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_results<W: Write>(
    writer: &mut W,
    command: &str,
    results: &QueryResults,
    stats: &BuildStats,
    format: OutputFormat,
    color: bool,
) -> Result<(), OutputError> {
    match format {
        OutputFormat::Text => TextOutput::new(color).write_results(writer, results),
        OutputFormat::Json => JsonOutput::new(command, results, stats).write_to(writer, true),
    }
}
