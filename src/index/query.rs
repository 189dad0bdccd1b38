//! Read-only queries over a built [`SnapshotIndex`].
//!
//! Nothing here takes `&mut self`; a shared `Arc<SnapshotIndex>` can serve
//! any number of concurrent callers. Exclusion lists are substring filters
//! and empty strings in them are ignored.

use serde::Serialize;

use super::dupes::find_duplicates;
use super::SnapshotIndex;
use crate::snapshot::Entry;

/// Entry returned by `find` and `matching`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryHit {
    /// Type character (`'d'` for directories)
    #[serde(rename = "type")]
    pub entry_type: char,
    /// Full path
    pub path: String,
    /// Modification date token
    pub modified: String,
}

impl From<&Entry> for EntryHit {
    fn from(entry: &Entry) -> Self {
        Self {
            entry_type: entry.entry_type,
            path: entry.path.clone(),
            modified: entry.modified.clone(),
        }
    }
}

/// Entry returned by `by_size`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SizeHit {
    /// Size in KiB
    pub size_kib: u64,
    /// Full path
    pub path: String,
}

/// One member of a duplicate group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DupeMember {
    /// Full path
    pub path: String,
    /// Size of the subtree in KiB
    pub cumulative_size_kib: u64,
}

/// Directories sharing a content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DupeGroup {
    /// Shared content hash
    pub content_hash: u64,
    /// Number of members
    pub occurrence_count: usize,
    /// Members in post-order
    pub members: Vec<DupeMember>,
}

impl DupeGroup {
    /// Content hash as a 16-digit hexadecimal string.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        format!("{:016x}", self.content_hash)
    }

    /// Space held by every copy but the first, in KiB.
    #[must_use]
    pub fn wasted_kib(&self) -> u64 {
        self.members
            .iter()
            .skip(1)
            .map(|m| m.cumulative_size_kib)
            .fold(0, u64::saturating_add)
    }
}

fn excluded(haystack: &str, excludes: &[String]) -> bool {
    excludes
        .iter()
        .any(|ex| !ex.is_empty() && haystack.contains(ex.as_str()))
}

impl SnapshotIndex {
    /// Entries whose basename equals `basename` exactly.
    ///
    /// Entries whose basename contains any exclusion are dropped. Results
    /// are ordered by basename then path and truncated to `max_results`.
    #[must_use]
    pub fn find(&self, basename: &str, max_results: usize, excludes: &[String]) -> Vec<EntryHit> {
        self.tables
            .with_basename(basename)
            .map(|id| self.catalog.get(id))
            .filter(|e| !excluded(&e.basename, excludes))
            .take(max_results)
            .map(EntryHit::from)
            .collect()
    }

    /// Entries whose basename contains `substring`, in catalog order.
    ///
    /// Exclusions are checked against the full path. The scan stops once
    /// `max_results` hits are collected.
    #[must_use]
    pub fn matching(
        &self,
        substring: &str,
        max_results: usize,
        excludes: &[String],
        directories_only: bool,
    ) -> Vec<EntryHit> {
        self.catalog
            .as_slice()
            .iter()
            .filter(|e| e.basename.contains(substring))
            .filter(|e| !directories_only || e.is_dir())
            .filter(|e| !excluded(&e.path, excludes))
            .take(max_results)
            .map(EntryHit::from)
            .collect()
    }

    /// Largest entries first, ties by basename.
    #[must_use]
    pub fn by_size(&self, max_results: usize) -> Vec<SizeHit> {
        self.tables
            .size_order()
            .iter()
            .take(max_results)
            .map(|&id| {
                let entry = self.catalog.get(id);
                SizeHit {
                    size_kib: entry.size_kib,
                    path: entry.path.clone(),
                }
            })
            .collect()
    }

    /// Duplicate directory groups at or above `min_cumulative_kib`.
    #[must_use]
    pub fn dupes(&self, min_cumulative_kib: u64, max_groups: usize) -> Vec<DupeGroup> {
        find_duplicates(&self.catalog, &self.hashes, min_cumulative_kib)
            .into_iter()
            .take(max_groups)
            .map(|group| DupeGroup {
                content_hash: group.content_hash,
                occurrence_count: group.len(),
                members: group
                    .members
                    .iter()
                    .map(|&id| DupeMember {
                        path: self.catalog.get(id).path.clone(),
                        cumulative_size_kib: self.hashes.digest(id).cumulative_size_kib,
                    })
                    .collect(),
            })
            .collect()
    }
}
