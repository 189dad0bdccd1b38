use snapdex::config::Config;
use snapdex::index::{BuildConfig, IndexBuilder};
use snapdex::snapshot::{ReaderConfig, RecordError, SnapshotError, SnapshotReader};
use std::fs;
use std::io::Write;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tempfile::{tempdir, NamedTempFile};

fn snapshot_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const MIXED: &str = "\
0\t1\t2024-01-01\td\t/srv
12\t2\t2024-01-01\tf\t/srv/app.log
this line is broken

8\t3\t2024-01-02\tf\t/srv/data.bin
";

#[test]
fn test_lenient_read_skips_malformed_lines() {
    let file = snapshot_file(MIXED);
    let (entries, stats) = SnapshotReader::new(ReaderConfig::default())
        .read_path(file.path())
        .unwrap();

    assert_eq!(entries.len(), 3);
    assert_eq!(stats.records, 3);
    assert_eq!(stats.malformed, 1);
    assert_eq!(stats.blank, 1);
    assert!(!stats.truncated);
}

#[test]
fn test_strict_read_aborts_with_line_number() {
    let file = snapshot_file(MIXED);
    let result =
        SnapshotReader::new(ReaderConfig::default().with_strict(true)).read_path(file.path());

    match result {
        Err(SnapshotError::Malformed(RecordError::Malformed { line_number, fields })) => {
            assert_eq!(line_number, 3);
            assert_eq!(fields, 1);
        }
        other => panic!("Expected malformed error, got {other:?}"),
    }
}

#[test]
fn test_record_limit_truncates() {
    let file = snapshot_file(MIXED);
    let (entries, stats) = SnapshotReader::new(ReaderConfig::default().with_record_limit(Some(2)))
        .read_path(file.path())
        .unwrap();
    assert_eq!(entries.len(), 2);
    assert!(stats.truncated);
}

#[test]
fn test_missing_snapshot() {
    let dir = tempdir().unwrap();
    let result = SnapshotReader::new(ReaderConfig::default()).read_path(&dir.path().join("nope"));
    assert!(matches!(result, Err(SnapshotError::NotFound(_))));
}

#[test]
fn test_raised_shutdown_flag_interrupts() {
    let file = snapshot_file(MIXED);
    let flag = Arc::new(AtomicBool::new(true));
    let result = SnapshotReader::new(ReaderConfig::default().with_shutdown_flag(flag))
        .read_path(file.path());
    assert!(matches!(result, Err(SnapshotError::Interrupted)));
}

#[test]
fn test_crlf_and_non_utf8_lines() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snap.tsv");
    let mut bytes = b"0\t1\tm\td\t/win\r\n".to_vec();
    bytes.extend_from_slice(b"5\t2\tm\tf\t/win/caf\xe9.txt\r\n");
    fs::write(&path, bytes).unwrap();

    let (entries, _) = SnapshotReader::new(ReaderConfig::default())
        .read_path(&path)
        .unwrap();
    assert_eq!(entries[0].path, "/win");
    assert!(entries[1].path.starts_with("/win/caf"));
    assert!(entries[1].basename.ends_with(".txt"));

    let index = IndexBuilder::new(BuildConfig::default()).build(entries);
    assert_eq!(index.stats().unresolved_parents, 1);
}

#[test]
fn test_file_to_index_round_trip() {
    let file = snapshot_file(MIXED);
    let (entries, _) = SnapshotReader::new(ReaderConfig::default())
        .read_path(file.path())
        .unwrap();
    let index = IndexBuilder::new(BuildConfig::default()).build_shared(entries);

    let srv = index.lookup_path("/srv").unwrap();
    assert_eq!(index.children(srv).len(), 2);
    assert_eq!(index.digest(srv).cumulative_size_kib, 20);
    assert_eq!(index.stats().total_size_kib, 20);
}

#[test]
fn test_load_index_applies_config() {
    let file = snapshot_file(MIXED);
    let index = snapdex::load_index(file.path(), &Config::default(), None, None).unwrap();
    assert_eq!(index.stats().entries, 3);
    assert_eq!(index.stats().total_size_kib, 20);

    let strict = Config {
        strict: true,
        ..Config::default()
    };
    let whitespace = snapshot_file("0\t1\tm\td\t/a\n\t\t\t\t\n");
    let err = snapdex::load_index(whitespace.path(), &strict, None, None).unwrap_err();
    assert!(format!("{err:#}").contains("line 2"), "unexpected: {err:#}");
}
