//! JSON output for query results.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "command": "dupes",
//!   "results": [
//!     {
//!       "content_hash": 11461144632640190087,
//!       "hash": "9f0e2a51d3e4b687",
//!       "occurrence_count": 2,
//!       "cumulative_size_kib": 600,
//!       "wasted_kib": 600,
//!       "members": [
//!         { "path": "/a", "cumulative_size_kib": 600 },
//!         { "path": "/b", "cumulative_size_kib": 600 }
//!       ]
//!     }
//!   ],
//!   "summary": {
//!     "result_count": 1,
//!     "entries": 8,
//!     "duplicate_paths": 0,
//!     "unresolved_parents": 0,
//!     "hash_algorithm": "fnv",
//!     "build_duration_ms": 3,
//!     "exit_code": 0,
//!     "exit_code_name": "SD000"
//!   }
//! }
//! ```
//!
//! `find`/`match` results are serialized [`EntryHit`]s and `by-size` results
//! are serialized [`SizeHit`]s.

use std::io::Write;

use serde::Serialize;

use super::{OutputError, QueryResults};
use crate::error::ExitCode;
use crate::index::{BuildStats, DupeGroup, DupeMember, EntryHit, SizeHit};

/// A duplicate group with its hash also rendered as hex.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDupeGroup {
    /// Shared content hash
    pub content_hash: u64,
    /// Content hash as a 16-digit hexadecimal string
    pub hash: String,
    /// Number of directories sharing the hash
    pub occurrence_count: usize,
    /// Size of one copy in KiB
    pub cumulative_size_kib: u64,
    /// Space held by the extra copies in KiB
    pub wasted_kib: u64,
    /// Members in post-order
    pub members: Vec<DupeMember>,
}

impl From<&DupeGroup> for JsonDupeGroup {
    fn from(group: &DupeGroup) -> Self {
        Self {
            content_hash: group.content_hash,
            hash: group.hash_hex(),
            occurrence_count: group.occurrence_count,
            cumulative_size_kib: group
                .members
                .first()
                .map_or(0, |m| m.cumulative_size_kib),
            wasted_kib: group.wasted_kib(),
            members: group.members.clone(),
        }
    }
}

/// The `results` array, shaped by the command.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum JsonResults {
    /// `find` and `match`
    Entries(Vec<EntryHit>),
    /// `by-size`
    Sizes(Vec<SizeHit>),
    /// `dupes`
    Dupes(Vec<JsonDupeGroup>),
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Number of results returned
    pub result_count: usize,
    /// Entries in the index
    pub entries: usize,
    /// Records dropped in favor of a later record with the same path
    pub duplicate_paths: usize,
    /// Entries attached to the root for lack of a parent
    pub unresolved_parents: usize,
    /// Hashing strategy used
    pub hash_algorithm: String,
    /// Index build time in milliseconds
    pub build_duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "SD000")
    pub exit_code_name: String,
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Subcommand that produced the results
    pub command: String,
    /// Query results
    pub results: JsonResults,
    /// Index and run summary
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Build the JSON document for one query.
    #[must_use]
    pub fn new(command: &str, results: &QueryResults, stats: &BuildStats) -> Self {
        let exit_code = ExitCode::for_results(results.len());
        let json_results = match results {
            QueryResults::Entries(hits) => JsonResults::Entries(hits.clone()),
            QueryResults::Sizes(hits) => JsonResults::Sizes(hits.clone()),
            QueryResults::Dupes(groups) => {
                JsonResults::Dupes(groups.iter().map(JsonDupeGroup::from).collect())
            }
        };
        Self {
            command: command.to_string(),
            results: json_results,
            summary: JsonSummary {
                result_count: results.len(),
                entries: stats.entries,
                duplicate_paths: stats.duplicate_paths,
                unresolved_parents: stats.unresolved_parents,
                hash_algorithm: stats.hash.to_string(),
                build_duration_ms: stats.total_duration().as_millis() as u64,
                exit_code: exit_code.as_i32(),
                exit_code_name: exit_code.code_prefix().to_string(),
            },
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), OutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}
