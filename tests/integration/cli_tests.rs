use clap::Parser;
use snapdex::cli::Cli;
use snapdex::error::{exit_code_for, ExitCode};
use snapdex::run_app;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

const SNAPSHOT: &str = "\
100\t1\t2024-01-01\tf\t/a/x.txt
0\t2\t2024-01-01\td\t/a
0\t3\t2024-01-01\td\t/b
100\t4\t2024-01-01\tf\t/b/x.txt
";

fn setup() -> (TempDir, String, String) {
    let dir = tempdir().unwrap();
    let snapshot = dir.path().join("snap.tsv");
    fs::write(&snapshot, SNAPSHOT).unwrap();
    let config = dir.path().join("config.toml");
    fs::write(&config, "progress = false\n").unwrap();
    (
        dir,
        path_str(&snapshot),
        path_str(&config),
    )
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn run(args: &[&str]) -> anyhow::Result<ExitCode> {
    let cli = Cli::try_parse_from(args).unwrap();
    run_app(cli)
}

#[test]
fn test_find_with_results_exits_zero() {
    let (_dir, snapshot, config) = setup();
    let code = run(&["snapdex", "-q", "--config", &config, "find", &snapshot, "x.txt"]).unwrap();
    assert_eq!(code, ExitCode::Success);
}

#[test]
fn test_find_without_results_exits_two() {
    let (_dir, snapshot, config) = setup();
    let code = run(&["snapdex", "-q", "--config", &config, "find", &snapshot, "y.txt"]).unwrap();
    assert_eq!(code, ExitCode::NoResults);
}

#[test]
fn test_match_json_output() {
    let (_dir, snapshot, config) = setup();
    let code = run(&[
        "snapdex", "-q", "--config", &config, "match", &snapshot, "x", "-n", "1", "--output",
        "json",
    ])
    .unwrap();
    assert_eq!(code, ExitCode::Success);
}

#[test]
fn test_dupes_threshold_controls_exit_code() {
    let (_dir, snapshot, config) = setup();
    let found = run(&[
        "snapdex", "-q", "--config", &config, "dupes", &snapshot, "--min-kib", "0", "-n", "5",
    ])
    .unwrap();
    assert_eq!(found, ExitCode::Success);

    let none = run(&[
        "snapdex", "-q", "--config", &config, "dupes", &snapshot, "--min-kib", "1000", "-n", "5",
    ])
    .unwrap();
    assert_eq!(none, ExitCode::NoResults);
}

#[test]
fn test_by_size_with_blake3() {
    let (_dir, snapshot, config) = setup();
    let code = run(&[
        "snapdex", "-q", "--config", &config, "by-size", &snapshot, "--hash", "blake3",
    ])
    .unwrap();
    assert_eq!(code, ExitCode::Success);
}

#[test]
fn test_missing_snapshot_is_general_error() {
    let (dir, _snapshot, config) = setup();
    let missing = path_str(&dir.path().join("missing.tsv"));
    let err = run(&["snapdex", "-q", "--config", &config, "by-size", &missing]).unwrap_err();
    assert_eq!(exit_code_for(&err), ExitCode::GeneralError);
    assert!(format!("{err:#}").contains("missing.tsv"));
}

#[test]
fn test_strict_flag_rejects_malformed_snapshot() {
    let (dir, _snapshot, config) = setup();
    let broken = dir.path().join("broken.tsv");
    fs::write(&broken, "0\t1\tm\td\t/ok\nnot a record\n").unwrap();
    let broken = path_str(&broken);

    let lenient = run(&["snapdex", "-q", "--config", &config, "by-size", &broken]).unwrap();
    assert_eq!(lenient, ExitCode::Success);

    let err = run(&["snapdex", "-q", "--config", &config, "by-size", &broken, "--strict"])
        .unwrap_err();
    assert_eq!(exit_code_for(&err), ExitCode::GeneralError);
    assert!(format!("{err:#}").contains("line 2"));
}

#[test]
fn test_missing_config_file_is_error() {
    let (dir, snapshot, _config) = setup();
    let missing = path_str(&dir.path().join("nope.toml"));
    let result = run(&["snapdex", "-q", "--config", &missing, "by-size", &snapshot]);
    assert!(result.is_err());
}
