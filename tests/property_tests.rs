use proptest::prelude::*;
use snapdex::index::{BuildConfig, IndexBuilder, SnapshotIndex};
use snapdex::snapshot::{basename_of, parse_line, Entry};
use std::collections::{BTreeMap, BTreeSet};

/// Random directory trees: file paths over a tiny alphabet so names repeat,
/// plus every ancestor directory.
fn tree_entries() -> impl Strategy<Value = Vec<Entry>> {
    let segment = prop::sample::select(vec!["a", "b", "c", "d"]);
    let file = (prop::collection::vec(segment, 1..5), 0u64..50);
    prop::collection::vec(file, 1..40).prop_flat_map(|files| {
        let mut file_sizes: BTreeMap<String, u64> = BTreeMap::new();
        let mut dirs: BTreeSet<String> = BTreeSet::new();
        for (segments, size) in files {
            let path = format!("/{}", segments.join("/"));
            for depth in 1..segments.len() {
                dirs.insert(format!("/{}", segments[..depth].join("/")));
            }
            file_sizes.insert(path, size);
        }
        // A path that is both a file and an ancestor becomes a directory.
        file_sizes.retain(|path, _| !dirs.contains(path));

        let mut entries: Vec<Entry> = dirs
            .iter()
            .enumerate()
            .map(|(i, path)| Entry::new(i as u64 % 3, i as u64, "m", 'd', path.as_str()))
            .collect();
        entries.extend(
            file_sizes
                .into_iter()
                .enumerate()
                .map(|(i, (path, size))| Entry::new(size, 1000 + i as u64, "m", 'f', path)),
        );
        Just(entries).prop_shuffle()
    })
}

fn build(entries: Vec<Entry>) -> SnapshotIndex {
    IndexBuilder::new(BuildConfig::default().with_parallel(false)).build(entries)
}

proptest! {
    #[test]
    fn test_basename_is_text_after_last_slash(path in "[a-z/]{0,20}") {
        let line = format!("1\t2\tm\tf\t{path}");
        let entry = parse_line(&line).unwrap();
        let expected = match path.rfind('/') {
            Some(pos) => &path[pos + 1..],
            None => "",
        };
        prop_assert_eq!(entry.basename.as_str(), expected);
        prop_assert_eq!(basename_of(&path), expected);
        prop_assert!(!entry.basename.contains('/'));
    }

    #[test]
    fn test_every_entry_has_exactly_one_parent(entries in tree_entries()) {
        let index = build(entries);
        let mut seen = vec![0usize; index.len()];

        for &id in index.root_children() {
            seen[id.index()] += 1;
            prop_assert!(index.entry(id).path.matches('/').count() == 1);
        }
        for (id, entry) in index.catalog().iter() {
            for &child in index.children(id) {
                seen[child.index()] += 1;
                prop_assert_eq!(index.entry(child).parent_path(), Some(entry.path.as_str()));
            }
        }
        prop_assert!(seen.iter().all(|&n| n == 1));
    }

    #[test]
    fn test_cumulative_size_identity(entries in tree_entries()) {
        let total: u64 = entries.iter().map(|e| e.size_kib).sum();
        let index = build(entries);

        for (id, entry) in index.catalog().iter() {
            let children: u64 = index
                .children(id)
                .iter()
                .map(|&c| index.digest(c).cumulative_size_kib)
                .sum();
            prop_assert_eq!(index.digest(id).cumulative_size_kib, entry.size_kib + children);
        }
        prop_assert_eq!(index.stats().total_size_kib, total);
    }

    #[test]
    fn test_hashes_ignore_input_order(entries in tree_entries()) {
        let mut reversed = entries.clone();
        reversed.reverse();
        let forward = build(entries);
        let backward = build(reversed);

        for (id, entry) in forward.catalog().iter() {
            let other = backward.lookup_path(&entry.path).unwrap();
            prop_assert_eq!(forward.digest(id), backward.digest(other));
        }
    }

    #[test]
    fn test_find_is_exhaustive(entries in tree_entries()) {
        let mut expected: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for entry in &entries {
            expected.entry(entry.basename.clone()).or_default().push(entry.path.clone());
        }
        let index = build(entries);

        for (basename, mut paths) in expected {
            paths.sort();
            let hits: Vec<String> = index
                .find(&basename, usize::MAX, &[])
                .into_iter()
                .map(|h| h.path)
                .collect();
            prop_assert_eq!(hits, paths);
        }
    }

    #[test]
    fn test_by_size_is_non_increasing(entries in tree_entries(), limit in 0usize..60) {
        let index = build(entries);
        let hits = index.by_size(limit);
        prop_assert_eq!(hits.len(), limit.min(index.len()));

        for pair in hits.windows(2) {
            prop_assert!(pair[0].size_kib >= pair[1].size_kib);
            if pair[0].size_kib == pair[1].size_kib {
                prop_assert!(basename_of(&pair[0].path) <= basename_of(&pair[1].path));
            }
        }
    }

    #[test]
    fn test_dupes_constraints(
        entries in tree_entries(),
        min in 0u64..100,
        max_groups in 0usize..8,
    ) {
        let index = build(entries);
        let groups = index.dupes(min, max_groups);
        prop_assert!(groups.len() <= max_groups);

        for group in &groups {
            prop_assert!(group.occurrence_count >= 2);
            prop_assert_eq!(group.occurrence_count, group.members.len());

            let representative = index.lookup_path(&group.members[0].path).unwrap();
            prop_assert!(index.entry(representative).is_dir());
            prop_assert!(group.members[0].cumulative_size_kib >= min);

            for member in &group.members {
                let id = index.lookup_path(&member.path).unwrap();
                prop_assert_eq!(index.digest(id).content_hash, group.content_hash);
            }
        }
    }

    #[test]
    fn test_match_respects_limit_and_filter(entries in tree_entries(), limit in 1usize..20) {
        let index = build(entries);
        let hits = index.matching("a", limit, &[], true);
        prop_assert!(hits.len() <= limit);
        for hit in &hits {
            prop_assert_eq!(hit.entry_type, 'd');
            prop_assert!(basename_of(&hit.path).contains('a'));
        }
    }
}
