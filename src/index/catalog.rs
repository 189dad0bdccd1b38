//! Entry arena.
//!
//! The catalog owns every [`Entry`] in a single `Vec` and hands out
//! [`EntryId`] values that index into it. Ids stay valid for the life of
//! the catalog because the vector is never resized after [`Catalog::build`].

use std::collections::HashMap;

use rayon::prelude::*;

use crate::snapshot::Entry;

/// Stable reference to an entry in a [`Catalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId(usize);

impl EntryId {
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position of the entry in catalog order.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// All entries of a snapshot, unique by path and sorted by basename.
#[derive(Debug, Default)]
pub struct Catalog {
    entries: Vec<Entry>,
}

impl Catalog {
    /// Build the catalog from parsed entries.
    ///
    /// Records sharing a path are resolved last-wins. The survivors are sorted
    /// by basename, ties broken by path, so the order is total and does not
    /// depend on input order or on `parallel`.
    ///
    /// Returns the catalog and the number of records dropped as duplicates.
    #[must_use]
    pub fn build(entries: Vec<Entry>, parallel: bool) -> (Self, usize) {
        let (mut entries, duplicates) = dedup_last_wins(entries);

        let by_name = |a: &Entry, b: &Entry| {
            a.basename
                .cmp(&b.basename)
                .then_with(|| a.path.cmp(&b.path))
        };
        if parallel {
            entries.par_sort_unstable_by(by_name);
        } else {
            entries.sort_unstable_by(by_name);
        }

        (Self { entries }, duplicates)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for an id.
    ///
    /// # Panics
    ///
    /// Panics if the id did not come from this catalog.
    #[must_use]
    pub fn get(&self, id: EntryId) -> &Entry {
        &self.entries[id.0]
    }

    /// Ids in catalog order.
    pub fn ids(&self) -> impl ExactSizeIterator<Item = EntryId> + DoubleEndedIterator {
        (0..self.entries.len()).map(EntryId)
    }

    /// Entries with their ids, in catalog order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (EntryId, &Entry)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| (EntryId(i), e))
    }

    /// Entries as a slice, in catalog order.
    #[must_use]
    pub fn as_slice(&self) -> &[Entry] {
        &self.entries
    }
}

/// Drop every record whose path reappears later in the input.
fn dedup_last_wins(entries: Vec<Entry>) -> (Vec<Entry>, usize) {
    let mut keep = vec![true; entries.len()];
    let mut duplicates = 0;
    {
        let mut last_seen: HashMap<&str, usize> = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            if let Some(previous) = last_seen.insert(entry.path.as_str(), i) {
                keep[previous] = false;
                duplicates += 1;
                log::warn!(
                    "Duplicate path {} (inode {} replaced by inode {})",
                    entry.path,
                    entries[previous].inode,
                    entry.inode
                );
            }
        }
    }

    if duplicates == 0 {
        return (entries, 0);
    }

    let kept = entries
        .into_iter()
        .zip(keep)
        .filter_map(|(entry, keep)| keep.then_some(entry))
        .collect();
    (kept, duplicates)
}
