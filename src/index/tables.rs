//! Lookup tables over a sorted [`Catalog`].
//!
//! - **by basename**: each basename maps to the contiguous run of catalog
//!   positions holding it. The catalog is sorted by basename, so the run is
//!   the complete equal range and lookups are exhaustive by construction.
//! - **by full path**: path to a single id; only the tree builder reads it.
//! - **size order**: ids by `size_kib` descending, ties by basename then path.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::ops::Range;

use rayon::prelude::*;

use super::catalog::{Catalog, EntryId};

/// Derived indexes built once over a catalog.
#[derive(Debug, Default)]
pub struct LookupTables {
    by_basename: HashMap<String, Range<usize>>,
    by_path: HashMap<String, EntryId>,
    size_order: Vec<EntryId>,
}

impl LookupTables {
    /// Build all three tables.
    #[must_use]
    pub fn build(catalog: &Catalog, parallel: bool) -> Self {
        let entries = catalog.as_slice();

        let mut by_basename: HashMap<String, Range<usize>> = HashMap::new();
        let mut start = 0;
        while start < entries.len() {
            let name = &entries[start].basename;
            let end = start
                + entries[start..]
                    .iter()
                    .take_while(|e| &e.basename == name)
                    .count();
            by_basename.insert(name.clone(), start..end);
            start = end;
        }

        let by_path: HashMap<String, EntryId> = catalog
            .iter()
            .map(|(id, e)| (e.path.clone(), id))
            .collect();

        // Catalog order already encodes (basename, path), so the id is the tie-break.
        let mut size_order: Vec<EntryId> = catalog.ids().collect();
        let key = |id: &EntryId| (Reverse(catalog.get(*id).size_kib), *id);
        if parallel {
            size_order.par_sort_unstable_by_key(key);
        } else {
            size_order.sort_unstable_by_key(key);
        }

        log::debug!(
            "Lookup tables: {} basenames, {} paths",
            by_basename.len(),
            by_path.len()
        );

        Self {
            by_basename,
            by_path,
            size_order,
        }
    }

    /// Every entry with exactly this basename, in catalog order.
    pub fn with_basename(&self, basename: &str) -> impl ExactSizeIterator<Item = EntryId> {
        self.by_basename
            .get(basename)
            .cloned()
            .unwrap_or(0..0)
            .map(EntryId::new)
    }

    /// Entry with exactly this path.
    #[must_use]
    pub fn by_path(&self, path: &str) -> Option<EntryId> {
        self.by_path.get(path).copied()
    }

    /// Ids ordered by size descending.
    #[must_use]
    pub fn size_order(&self) -> &[EntryId] {
        &self.size_order
    }

    /// Number of distinct basenames.
    #[must_use]
    pub fn basename_count(&self) -> usize {
        self.by_basename.len()
    }
}
