use clap::Parser;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use snapdex::cli::Cli;
use snapdex::config::{Config, ConfigError};
use snapdex::index::HashAlgorithm;
use std::fs;
use std::sync::Mutex;
use tempfile::tempdir;

static ENV_MUTEX: Mutex<()> = Mutex::new(());

#[test]
fn test_config_load_defaults() {
    let figment = Figment::from(Serialized::defaults(Config::default()));
    let config: Config = figment.extract().unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.max_results, 100);
    assert_eq!(config.hash, HashAlgorithm::Fnv);
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
max_results = 25
max_groups = 4
min_dupe_kib = 2048
excludes = ["/proc/", ".git"]
strict = true
record_limit = 5000
hash = "blake3"
parallel = false
progress = false
"#,
    )
    .unwrap();

    let figment =
        Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(&config_path));
    let config: Config = figment.extract().unwrap();

    assert_eq!(config.max_results, 25);
    assert_eq!(config.max_groups, 4);
    assert_eq!(config.min_dupe_kib, 2048);
    assert_eq!(config.excludes, vec!["/proc/", ".git"]);
    assert!(config.strict);
    assert_eq!(config.record_limit, Some(5000));
    assert_eq!(config.hash, HashAlgorithm::Blake3);
    assert!(!config.parallel);
    assert!(!config.progress);
}

#[test]
fn test_partial_toml_keeps_defaults() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "max_groups = 7\n").unwrap();

    let _lock = ENV_MUTEX.lock().unwrap();
    let config = Config::load(Some(&config_path)).unwrap();
    assert_eq!(config.max_groups, 7);
    assert_eq!(config.max_results, 100);
    assert!(config.parallel);
}

#[test]
fn test_env_overrides_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "max_groups = 7\nhash = \"fnv\"\n").unwrap();

    let _lock = ENV_MUTEX.lock().unwrap();
    std::env::set_var("SNAPDEX_MAX_GROUPS", "3");
    std::env::set_var("SNAPDEX_HASH", "blake3");
    let result = Config::load(Some(&config_path));
    std::env::remove_var("SNAPDEX_MAX_GROUPS");
    std::env::remove_var("SNAPDEX_HASH");

    let config = result.unwrap();
    assert_eq!(config.max_groups, 3);
    assert_eq!(config.hash, HashAlgorithm::Blake3);
}

#[test]
fn test_env_provider_alone() {
    let _lock = ENV_MUTEX.lock().unwrap();
    std::env::set_var("SNAPDEX_MIN_DUPE_KIB", "512");
    let figment = Figment::from(Serialized::defaults(Config::default()))
        .merge(Env::prefixed("SNAPDEX_").split("__"));
    let result: Result<Config, _> = figment.extract();
    std::env::remove_var("SNAPDEX_MIN_DUPE_KIB");

    assert_eq!(result.unwrap().min_dupe_kib, 512);
}

#[test]
fn test_invalid_toml_is_an_error() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "max_results = \"many\"\n").unwrap();

    let _lock = ENV_MUTEX.lock().unwrap();
    let result = Config::load(Some(&config_path));
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn test_zero_max_results_is_rejected() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "max_results = 0\n").unwrap();

    let _lock = ENV_MUTEX.lock().unwrap();
    let result = Config::load(Some(&config_path));
    assert!(matches!(result, Err(ConfigError::Value { key: "max_results", .. })));
}

#[test]
fn test_cli_flags_override_config() {
    let cli = Cli::try_parse_from([
        "snapdex",
        "dupes",
        "snap.tsv",
        "--strict",
        "--limit",
        "10",
        "--hash",
        "blake3",
        "--no-progress",
        "--sequential",
    ])
    .unwrap();

    let mut config = Config::default();
    config.apply_cli(cli.command.snapshot_args());
    assert!(config.strict);
    assert_eq!(config.record_limit, Some(10));
    assert_eq!(config.hash, HashAlgorithm::Blake3);
    assert!(!config.progress);
    assert!(!config.parallel);

    let reader = config.reader_config();
    assert!(reader.strict);
    assert_eq!(reader.record_limit, Some(10));
}

#[test]
fn test_absent_cli_flags_keep_config() {
    let cli = Cli::try_parse_from(["snapdex", "by-size", "snap.tsv"]).unwrap();
    let mut config = Config {
        strict: true,
        record_limit: Some(3),
        hash: HashAlgorithm::Blake3,
        ..Config::default()
    };
    config.apply_cli(cli.command.snapshot_args());
    assert!(config.strict);
    assert_eq!(config.record_limit, Some(3));
    assert_eq!(config.hash, HashAlgorithm::Blake3);
}
