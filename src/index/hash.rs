//! Bottom-up content hashing of the snapshot tree.
//!
//! # Overview
//!
//! Every node gets a 64-bit content hash and a cumulative size:
//!
//! - a node without children hashes `basename ++ size_kib ++ entry_type`
//! - a node with children hashes `size_kib ++ entry_type ++ children`, where
//!   `children` is the XOR of every child's hash; its own name is left out
//!
//! XOR makes the result independent of child order, and leaving a parent's
//! own name out lets identically populated directories under different names
//! compare equal. The children digest goes through the hash function rather
//! than being XORed onto the parent's fields, so a chain of same-sized
//! directories does not cancel out to its innermost leaf. The hash is a heuristic signal for candidate duplicates,
//! not an integrity check.
//!
//! The walk uses an explicit stack, so tree depth is bounded only by memory.
//!
//! # Example
//!
//! ```
//! use snapdex::index::{ContentHasher, Fnv64};
//!
//! let hasher = Fnv64;
//! assert_eq!(hasher.leaf_hash("x.txt", 100, 'f'), hasher.leaf_hash("x.txt", 100, 'f'));
//! assert_ne!(hasher.leaf_hash("x.txt", 100, 'f'), hasher.leaf_hash("y.txt", 100, 'f'));
//! ```

use std::collections::HashMap;
use std::hash::Hasher as _;

use serde::{Deserialize, Serialize};

use super::catalog::{Catalog, EntryId};
use super::tree::Tree;

/// Strategy for fingerprinting node fields.
///
/// Implementations hash the concatenation of `fields` and must be
/// deterministic for the life of the process.
pub trait ContentHasher: Send + Sync {
    /// Hash the concatenation of the given byte fields.
    fn hash_fields(&self, fields: &[&[u8]]) -> u64;

    /// Hash of a node without children.
    fn leaf_hash(&self, basename: &str, size_kib: u64, entry_type: char) -> u64 {
        let mut size = [0u8; 20];
        let mut kind = [0u8; 4];
        self.hash_fields(&[
            basename.as_bytes(),
            decimal(size_kib, &mut size),
            entry_type.encode_utf8(&mut kind).as_bytes(),
        ])
    }

    /// Hash of a node with children, given the XOR of their hashes.
    fn parent_hash(&self, size_kib: u64, entry_type: char, children: u64) -> u64 {
        let mut size = [0u8; 20];
        let mut kind = [0u8; 4];
        self.hash_fields(&[
            decimal(size_kib, &mut size),
            entry_type.encode_utf8(&mut kind).as_bytes(),
            &children.to_le_bytes(),
        ])
    }
}

/// 64-bit FNV-1a.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fnv64;

impl ContentHasher for Fnv64 {
    fn hash_fields(&self, fields: &[&[u8]]) -> u64 {
        let mut hasher = fnv::FnvHasher::default();
        for field in fields {
            hasher.write(field);
        }
        hasher.finish()
    }
}

/// First eight bytes of a BLAKE3 digest, little-endian.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3Truncated;

impl ContentHasher for Blake3Truncated {
    fn hash_fields(&self, fields: &[&[u8]]) -> u64 {
        let mut hasher = blake3::Hasher::new();
        for field in fields {
            hasher.update(field);
        }
        let digest = hasher.finalize();
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest.as_bytes()[..8]);
        u64::from_le_bytes(head)
    }
}

/// Selectable hashing strategy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// FNV-1a, 64-bit
    #[default]
    Fnv,
    /// BLAKE3 truncated to 64 bits
    Blake3,
}

impl HashAlgorithm {
    /// Hasher implementing this algorithm.
    #[must_use]
    pub fn hasher(self) -> Box<dyn ContentHasher> {
        match self {
            Self::Fnv => Box::new(Fnv64),
            Self::Blake3 => Box::new(Blake3Truncated),
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fnv => write!(f, "fnv"),
            Self::Blake3 => write!(f, "blake3"),
        }
    }
}

/// Hash and cumulative size of one node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeDigest {
    /// Structural content hash
    pub content_hash: u64,
    /// Size of the node plus all descendants, in KiB
    pub cumulative_size_kib: u64,
}

/// Per-node digests and the hash groupings derived from them.
#[derive(Debug, Default)]
pub struct HashAggregate {
    digests: Vec<NodeDigest>,
    groups: HashMap<u64, Vec<EntryId>>,
    known_hashes: Vec<u64>,
    root: NodeDigest,
}

impl HashAggregate {
    /// Walk the tree post-order and compute every node's digest.
    ///
    /// Group members are recorded in post-order, so a group's first member
    /// is deterministic for a given snapshot. The root's digest is kept for
    /// totals but never recorded in a group.
    #[must_use]
    pub fn compute(catalog: &Catalog, tree: &Tree, hasher: &dyn ContentHasher) -> Self {
        let mut digests = vec![NodeDigest::default(); catalog.len()];
        let mut groups: HashMap<u64, Vec<EntryId>> = HashMap::new();
        let mut known_hashes = Vec::new();

        let mut stack: Vec<(EntryId, bool)> = tree
            .root_children()
            .iter()
            .rev()
            .map(|&id| (id, false))
            .collect();

        while let Some((id, expanded)) = stack.pop() {
            let children = tree.children(id);
            if !expanded && !children.is_empty() {
                stack.push((id, true));
                stack.extend(children.iter().rev().map(|&child| (child, false)));
                continue;
            }

            let entry = catalog.get(id);
            let digest = if children.is_empty() {
                NodeDigest {
                    content_hash: hasher.leaf_hash(&entry.basename, entry.size_kib, entry.entry_type),
                    cumulative_size_kib: entry.size_kib,
                }
            } else {
                let combined = combine(&digests, children);
                NodeDigest {
                    content_hash: hasher.parent_hash(
                        entry.size_kib,
                        entry.entry_type,
                        combined.content_hash,
                    ),
                    cumulative_size_kib: entry.size_kib.saturating_add(combined.cumulative_size_kib),
                }
            };
            digests[id.index()] = digest;

            let members = groups.entry(digest.content_hash).or_default();
            if members.is_empty() {
                known_hashes.push(digest.content_hash);
            }
            members.push(id);
        }

        let root = combine(&digests, tree.root_children());
        log::debug!(
            "Hashed {} nodes into {} distinct hashes, {} KiB total",
            catalog.len(),
            known_hashes.len(),
            root.cumulative_size_kib
        );

        Self {
            digests,
            groups,
            known_hashes,
            root,
        }
    }

    /// Digest of an entry.
    #[must_use]
    pub fn digest(&self, id: EntryId) -> NodeDigest {
        self.digests[id.index()]
    }

    /// XOR of top-level hashes and total size of the whole snapshot.
    #[must_use]
    pub fn root(&self) -> NodeDigest {
        self.root
    }

    /// Nodes sharing a content hash, in post-order.
    #[must_use]
    pub fn group(&self, content_hash: u64) -> &[EntryId] {
        self.groups
            .get(&content_hash)
            .map_or(&[][..], Vec::as_slice)
    }

    /// Distinct content hashes in first-seen order.
    #[must_use]
    pub fn known_hashes(&self) -> &[u64] {
        &self.known_hashes
    }
}

/// XOR of hashes and saturating sum of cumulative sizes.
fn combine(digests: &[NodeDigest], ids: &[EntryId]) -> NodeDigest {
    ids.iter().fold(NodeDigest::default(), |acc, id| {
        let d = digests[id.index()];
        NodeDigest {
            content_hash: acc.content_hash ^ d.content_hash,
            cumulative_size_kib: acc.cumulative_size_kib.saturating_add(d.cumulative_size_kib),
        }
    })
}

/// Write `n` in decimal into `buf`, returning the used tail.
fn decimal(mut n: u64, buf: &mut [u8; 20]) -> &[u8] {
    let mut pos = buf.len();
    loop {
        pos -= 1;
        buf[pos] = b'0' + (n % 10) as u8;
        n /= 10;
        if n == 0 {
            break;
        }
    }
    &buf[pos..]
}
