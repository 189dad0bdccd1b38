//! Duplicate subtree detection over hash groupings.
//!
//! A group qualifies when it has two or more members, its representative
//! (first member in post-order) is a directory, and the representative's
//! cumulative size reaches the threshold. Matching hashes are candidates
//! only; contents are never byte-compared.

use super::catalog::{Catalog, EntryId};
use super::hash::HashAggregate;

/// Nodes sharing one content hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashGroup<'a> {
    /// Shared content hash
    pub content_hash: u64,
    /// Members in post-order; the first is the representative
    pub members: &'a [EntryId],
}

impl HashGroup<'_> {
    /// First member of the group.
    #[must_use]
    pub fn representative(&self) -> EntryId {
        self.members[0]
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Lazily yield qualifying groups in first-seen hash order.
pub fn duplicate_candidates<'a>(
    catalog: &'a Catalog,
    hashes: &'a HashAggregate,
    min_cumulative_kib: u64,
) -> impl Iterator<Item = HashGroup<'a>> + 'a {
    hashes.known_hashes().iter().filter_map(move |&content_hash| {
        let members = hashes.group(content_hash);
        if members.len() < 2 {
            return None;
        }
        let representative = members[0];
        if !catalog.get(representative).is_dir() {
            return None;
        }
        if hashes.digest(representative).cumulative_size_kib < min_cumulative_kib {
            return None;
        }
        Some(HashGroup {
            content_hash,
            members,
        })
    })
}

/// All qualifying duplicate groups.
#[must_use]
pub fn find_duplicates<'a>(
    catalog: &'a Catalog,
    hashes: &'a HashAggregate,
    min_cumulative_kib: u64,
) -> Vec<HashGroup<'a>> {
    let groups: Vec<_> = duplicate_candidates(catalog, hashes, min_cumulative_kib).collect();
    log::debug!(
        "{} duplicate groups at or above {} KiB",
        groups.len(),
        min_cumulative_kib
    );
    groups
}
