use snapdex::index::{BuildConfig, HashAlgorithm, IndexBuilder, SnapshotIndex};
use snapdex::snapshot::{parse_line, Entry};

const TWIN_DIRS: [&str; 4] = [
    "100\t1\t2024-01-01\tf\t/a/x.txt",
    "0\t2\t2024-01-01\td\t/a",
    "0\t3\t2024-01-01\td\t/b",
    "100\t4\t2024-01-01\tf\t/b/x.txt",
];

fn entries(lines: &[&str]) -> Vec<Entry> {
    lines.iter().map(|line| parse_line(line).unwrap()).collect()
}

fn build(lines: &[&str]) -> SnapshotIndex {
    IndexBuilder::new(BuildConfig::default()).build(entries(lines))
}

#[test]
fn test_identical_directories_are_reported_as_one_group() {
    let index = build(&TWIN_DIRS);

    let a = index.lookup_path("/a").unwrap();
    let b = index.lookup_path("/b").unwrap();
    assert_eq!(index.digest(a).content_hash, index.digest(b).content_hash);

    let groups = index.dupes(0, 10);
    assert_eq!(groups.len(), 1);
    let group = &groups[0];
    assert_eq!(group.occurrence_count, 2);

    let mut paths: Vec<&str> = group.members.iter().map(|m| m.path.as_str()).collect();
    paths.sort_unstable();
    assert_eq!(paths, vec!["/a", "/b"]);
    assert!(group.members.iter().all(|m| m.cumulative_size_kib == 100));
}

#[test]
fn test_identical_directories_with_blake3() {
    let index = IndexBuilder::new(BuildConfig::default().with_hash(HashAlgorithm::Blake3))
        .build(entries(&TWIN_DIRS));
    let groups = index.dupes(0, 10);
    assert_eq!(groups.len(), 1);
    assert_eq!(index.stats().hash, HashAlgorithm::Blake3);
}

#[test]
fn test_match_truncates_at_max_results() {
    let index = build(&TWIN_DIRS);
    assert_eq!(index.matching("x", 1, &[], false).len(), 1);
    assert_eq!(index.matching("x", 10, &[], false).len(), 2);
}

#[test]
fn test_orphan_attaches_to_root() {
    let index = build(&["5\t1\t2024-01-01\tf\t/orphan/file"]);

    assert_eq!(index.stats().unresolved_parents, 1);
    let file = index.lookup_path("/orphan/file").unwrap();
    assert_eq!(index.root_children(), &[file]);
}

#[test]
fn test_find_is_exhaustive_and_sorted() {
    let mut lines: Vec<String> = (0..50)
        .map(|i| format!("1\t{i}\tm\tf\t/dir{i:02}/common.txt"))
        .collect();
    lines.push("1\t99\tm\tf\t/dir00/common.txt.bak".to_string());
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let index = build(&refs);

    let hits = index.find("common.txt", usize::MAX, &[]);
    assert_eq!(hits.len(), 50);
    let paths: Vec<&str> = hits.iter().map(|h| h.path.as_str()).collect();
    let mut sorted = paths.clone();
    sorted.sort_unstable();
    assert_eq!(paths, sorted);

    assert_eq!(index.find("common.txt", 7, &[]).len(), 7);
    assert!(index.find("common", usize::MAX, &[]).is_empty());
}

#[test]
fn test_find_excludes_apply_to_basename() {
    let index = build(&[
        "1\t1\tm\tf\t/keep/notes",
        "1\t2\tm\tf\t/skip/notes",
    ]);
    // "skip" only occurs in the directory part, so nothing is dropped.
    assert_eq!(index.find("notes", 10, &["skip".to_string()]).len(), 2);
    assert!(index.find("notes", 10, &["note".to_string()]).is_empty());
}

#[test]
fn test_match_excludes_apply_to_path() {
    let index = build(&[
        "1\t1\tm\tf\t/proc/cache.db",
        "1\t2\tm\tf\t/var/cache.db",
    ]);
    let hits = index.matching("cache", 10, &["/proc/".to_string()], false);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].path, "/var/cache.db");
}

#[test]
fn test_by_size_orders_largest_first() {
    let index = build(&[
        "10\t1\tm\tf\t/b",
        "30\t2\tm\tf\t/a",
        "10\t3\tm\tf\t/a2",
        "20\t4\tm\tf\t/c",
    ]);
    let hits = index.by_size(10);
    let sizes: Vec<(u64, &str)> = hits.iter().map(|h| (h.size_kib, h.path.as_str())).collect();
    assert_eq!(sizes[0].0, 30);
    assert_eq!(sizes[1].0, 20);
    // Ties in ascending basename order: "a2" before "b".
    assert_eq!(sizes[2].1, "/a2");
    assert_eq!(sizes[3].1, "/b");
}

#[test]
fn test_dupes_threshold_and_cap() {
    let mut lines = Vec::new();
    for copy in 0..3 {
        lines.push(format!("0\t{copy}\tm\td\t/small{copy}"));
        lines.push(format!("4\t{copy}\tm\tf\t/small{copy}/f"));
        lines.push(format!("0\t{copy}\tm\td\t/big{copy}"));
        lines.push(format!("400\t{copy}\tm\tf\t/big{copy}/g"));
    }
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let index = build(&refs);

    assert_eq!(index.dupes(0, 10).len(), 2);
    let big_only = index.dupes(100, 10);
    assert_eq!(big_only.len(), 1);
    assert_eq!(big_only[0].occurrence_count, 3);
    assert_eq!(index.dupes(0, 1).len(), 1);
    assert!(index.dupes(10_000, 10).is_empty());
}

#[test]
fn test_duplicate_path_last_wins() {
    let index = build(&[
        "1\t1\told\tf\t/etc/passwd",
        "2\t2\tnew\tf\t/etc/passwd",
    ]);
    assert_eq!(index.len(), 1);
    assert_eq!(index.stats().duplicate_paths, 1);
    let hits = index.find("passwd", 10, &[]);
    assert_eq!(hits[0].modified, "new");
}

#[test]
fn test_nested_duplicates_are_all_reported() {
    let mut lines = Vec::new();
    for root in ["/x", "/y"] {
        lines.push(format!("0\t1\tm\td\t{root}"));
        lines.push(format!("0\t1\tm\td\t{root}/inner"));
        lines.push(format!("7\t1\tm\tf\t{root}/inner/data"));
    }
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let index = build(&refs);

    let groups = index.dupes(0, 10);
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].members[0].path, "/x/inner");
    assert_eq!(groups[1].members[0].path, "/x");
}
