//! In-memory snapshot index.
//!
//! # Overview
//!
//! The index is built once, front to back, and never modified afterwards:
//!
//! 1. **Catalog** - dedupe paths (last wins), sort by basename
//! 2. **Lookup tables** - by basename, by full path, size order
//! 3. **Tree** - attach every entry under its parent or the synthetic root
//! 4. **Hashes** - bottom-up content hash and cumulative size per node
//!
//! Each phase needs the previous one complete. The finished
//! [`SnapshotIndex`] has no write path and is meant to be shared as
//! `Arc<SnapshotIndex>` between readers.
//!
//! # Example
//!
//! ```
//! use snapdex::index::{BuildConfig, IndexBuilder};
//! use snapdex::snapshot::parse_line;
//!
//! let entries = [
//!     "100\t1\t2024-01-01\tf\t/a/x.txt",
//!     "0\t2\t2024-01-01\td\t/a",
//!     "0\t3\t2024-01-01\td\t/b",
//!     "100\t4\t2024-01-01\tf\t/b/x.txt",
//! ]
//! .iter()
//! .map(|line| parse_line(line).unwrap())
//! .collect();
//!
//! let index = IndexBuilder::new(BuildConfig::default()).build(entries);
//! let groups = index.dupes(0, 10);
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].occurrence_count, 2);
//! ```

pub mod catalog;
pub mod dupes;
pub mod hash;
pub mod query;
pub mod tables;
pub mod tree;

use std::sync::Arc;
use std::time::{Duration, Instant};

pub use catalog::{Catalog, EntryId};
pub use dupes::{duplicate_candidates, find_duplicates, HashGroup};
pub use hash::{Blake3Truncated, ContentHasher, Fnv64, HashAggregate, HashAlgorithm, NodeDigest};
pub use query::{DupeGroup, DupeMember, EntryHit, SizeHit};
pub use tables::LookupTables;
pub use tree::Tree;

use crate::progress::ProgressCallback;
use crate::snapshot::Entry;

/// Configuration for building an index.
#[derive(Clone)]
pub struct BuildConfig {
    /// Run the catalog and size-order sorts on the rayon pool.
    pub parallel: bool,
    /// Content hashing strategy.
    pub hash: HashAlgorithm,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for BuildConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildConfig")
            .field("parallel", &self.parallel)
            .field("hash", &self.hash)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            hash: HashAlgorithm::Fnv,
            progress_callback: None,
        }
    }
}

impl BuildConfig {
    /// Enable or disable parallel sorting.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the hashing strategy.
    #[must_use]
    pub fn with_hash(mut self, hash: HashAlgorithm) -> Self {
        self.hash = hash;
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Summary of a completed build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Entries in the catalog after path deduplication
    pub entries: usize,
    /// Records dropped because a later record had the same path
    pub duplicate_paths: usize,
    /// Entries attached to the root because their parent was missing
    pub unresolved_parents: usize,
    /// Distinct basenames
    pub basenames: usize,
    /// Distinct content hashes
    pub distinct_hashes: usize,
    /// Sum of all top-level cumulative sizes, in KiB
    pub total_size_kib: u64,
    /// Hashing strategy used
    pub hash: HashAlgorithm,
    /// Time spent in the catalog phase
    pub catalog_duration: Duration,
    /// Time spent building lookup tables
    pub tables_duration: Duration,
    /// Time spent building the tree
    pub tree_duration: Duration,
    /// Time spent hashing
    pub hash_duration: Duration,
}

impl BuildStats {
    /// Total build time.
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.catalog_duration + self.tables_duration + self.tree_duration + self.hash_duration
    }
}

/// Runs the build pipeline.
#[derive(Debug, Clone, Default)]
pub struct IndexBuilder {
    config: BuildConfig,
}

impl IndexBuilder {
    /// Create a builder with the given configuration.
    #[must_use]
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    fn phase<T>(&self, name: &str, total: usize, run: impl FnOnce() -> T) -> (T, Duration) {
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start(name, total);
        }
        let start = Instant::now();
        let out = run();
        let elapsed = start.elapsed();
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(name);
        }
        log::debug!("Phase {} finished in {:?}", name, elapsed);
        (out, elapsed)
    }

    /// Build an index from parsed entries.
    #[must_use]
    pub fn build(&self, entries: Vec<Entry>) -> SnapshotIndex {
        let parallel = self.config.parallel;
        let input = entries.len();
        log::info!("Building index over {} records", input);

        let ((catalog, duplicate_paths), catalog_duration) =
            self.phase("catalog", input, || Catalog::build(entries, parallel));
        let (tables, tables_duration) =
            self.phase("tables", catalog.len(), || LookupTables::build(&catalog, parallel));
        let (tree, tree_duration) =
            self.phase("tree", catalog.len(), || Tree::build(&catalog, &tables));

        let hasher = self.config.hash.hasher();
        let (hashes, hash_duration) = self.phase("hash", catalog.len(), || {
            HashAggregate::compute(&catalog, &tree, hasher.as_ref())
        });

        let stats = BuildStats {
            entries: catalog.len(),
            duplicate_paths,
            unresolved_parents: tree.unresolved_parents(),
            basenames: tables.basename_count(),
            distinct_hashes: hashes.known_hashes().len(),
            total_size_kib: hashes.root().cumulative_size_kib,
            hash: self.config.hash,
            catalog_duration,
            tables_duration,
            tree_duration,
            hash_duration,
        };

        if duplicate_paths > 0 {
            log::warn!("{} records shared a path with a later record and were dropped", duplicate_paths);
        }
        log::info!(
            "Index ready: {} entries, {} top-level, {} distinct hashes in {:?}",
            stats.entries,
            tree.root_children().len(),
            stats.distinct_hashes,
            stats.total_duration()
        );

        SnapshotIndex {
            catalog,
            tables,
            tree,
            hashes,
            stats,
        }
    }

    /// Build and wrap the index for sharing between readers.
    #[must_use]
    pub fn build_shared(&self, entries: Vec<Entry>) -> Arc<SnapshotIndex> {
        Arc::new(self.build(entries))
    }
}

/// Immutable, fully built snapshot index.
#[derive(Debug)]
pub struct SnapshotIndex {
    catalog: Catalog,
    tables: LookupTables,
    tree: Tree,
    hashes: HashAggregate,
    stats: BuildStats,
}

impl SnapshotIndex {
    /// Build statistics.
    #[must_use]
    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    /// Check if the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    /// Entry for an id.
    #[must_use]
    pub fn entry(&self, id: EntryId) -> &Entry {
        self.catalog.get(id)
    }

    /// Id of the entry at `path`.
    #[must_use]
    pub fn lookup_path(&self, path: &str) -> Option<EntryId> {
        self.tables.by_path(path)
    }

    /// Children of an entry.
    #[must_use]
    pub fn children(&self, id: EntryId) -> &[EntryId] {
        self.tree.children(id)
    }

    /// Entries attached to the synthetic root.
    #[must_use]
    pub fn root_children(&self) -> &[EntryId] {
        self.tree.root_children()
    }

    /// Content hash and cumulative size of an entry.
    #[must_use]
    pub fn digest(&self, id: EntryId) -> NodeDigest {
        self.hashes.digest(id)
    }

    /// Underlying catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}
