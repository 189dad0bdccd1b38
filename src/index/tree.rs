//! Parent/child reconstruction from flat paths.
//!
//! One linear pass over the catalog: each entry's parent path is probed in
//! the by-path table. Hits become child edges; misses attach to the
//! synthetic root. The by-path table is complete before the pass starts, so
//! the result does not depend on catalog order.

use super::catalog::{Catalog, EntryId};
use super::tables::LookupTables;

/// Child lists for every entry plus the synthetic root.
#[derive(Debug, Default)]
pub struct Tree {
    children: Vec<Vec<EntryId>>,
    root: Vec<EntryId>,
    unresolved: usize,
}

impl Tree {
    /// Attach every catalog entry under its parent or the root.
    #[must_use]
    pub fn build(catalog: &Catalog, tables: &LookupTables) -> Self {
        let mut children: Vec<Vec<EntryId>> = vec![Vec::new(); catalog.len()];
        let mut root = Vec::new();
        let mut unresolved = 0;

        for (id, entry) in catalog.iter() {
            match entry.parent_path().and_then(|p| tables.by_path(p)) {
                Some(parent) if parent != id => children[parent.index()].push(id),
                _ => {
                    log::debug!("Unresolved parent for {}, attaching to root", entry.path);
                    unresolved += 1;
                    root.push(id);
                }
            }
        }

        log::debug!(
            "Tree built: {} top-level entries under root",
            root.len()
        );

        Self {
            children,
            root,
            unresolved,
        }
    }

    /// Children of an entry, in catalog order.
    #[must_use]
    pub fn children(&self, id: EntryId) -> &[EntryId] {
        &self.children[id.index()]
    }

    /// Entries attached directly to the synthetic root.
    #[must_use]
    pub fn root_children(&self) -> &[EntryId] {
        &self.root
    }

    /// Number of entries whose parent could not be resolved.
    #[must_use]
    pub fn unresolved_parents(&self) -> usize {
        self.unresolved
    }
}
