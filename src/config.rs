//! Layered application configuration.
//!
//! Settings are merged from, lowest to highest priority:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. A TOML file: the `--config` path, or `snapdex/config.toml` in the
//!    platform config directory when it exists
//! 3. `SNAPDEX_*` environment variables (`__` separates nested keys)
//! 4. Command-line flags, applied by [`Config::apply_cli`]
//!
//! # Example
//!
//! ```toml
//! max_results = 50
//! excludes = ["/proc/", ".git"]
//! hash = "blake3"
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::SnapshotArgs;
use crate::index::{BuildConfig, HashAlgorithm};
use crate::snapshot::ReaderConfig;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "SNAPDEX_";

/// Errors while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// A provider produced a value of the wrong shape.
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),

    /// A value parsed but is out of range.
    #[error("Invalid value for '{key}': {message}")]
    Value {
        /// Config key
        key: &'static str,
        /// What is wrong with it
        message: String,
    },
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Result cap for `find` and `match`.
    pub max_results: usize,
    /// Group cap for `dupes`.
    pub max_groups: usize,
    /// Minimum cumulative size (KiB) of a reported duplicate group.
    pub min_dupe_kib: u64,
    /// Substrings excluded from `find` and `match` results.
    pub excludes: Vec<String>,
    /// Abort on the first malformed record instead of skipping it.
    pub strict: bool,
    /// Read at most this many records from the snapshot.
    pub record_limit: Option<usize>,
    /// Subtree hashing algorithm.
    pub hash: HashAlgorithm,
    /// Sort the catalog with rayon.
    pub parallel: bool,
    /// Show progress spinners on stderr.
    pub progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_results: 100,
            max_groups: 10,
            min_dupe_kib: 0,
            excludes: Vec::new(),
            strict: false,
            record_limit: None,
            hash: HashAlgorithm::default(),
            parallel: true,
            progress: true,
        }
    }
}

impl Config {
    /// Load configuration from defaults, a TOML file and the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if `path` is given but missing, and
    /// [`ConfigError::Invalid`] if any provider yields malformed values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                log::debug!("Loading config from {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
            None => {
                if let Some(default_path) = Self::default_path().filter(|p| p.exists()) {
                    log::debug!("Loading config from {}", default_path.display());
                    figment = figment.merge(Toml::file(default_path));
                }
            }
        }

        let config: Self = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// Platform config file location, e.g. `~/.config/snapdex/config.toml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "snapdex", "snapdex")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Reject values that would make every query empty.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Value`] for a zero `max_results` or `max_groups`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_results == 0 {
            return Err(ConfigError::Value {
                key: "max_results",
                message: "must be at least 1".to_string(),
            });
        }
        if self.max_groups == 0 {
            return Err(ConfigError::Value {
                key: "max_groups",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Apply the snapshot flags shared by every subcommand.
    pub fn apply_cli(&mut self, args: &SnapshotArgs) {
        if args.strict {
            self.strict = true;
        }
        if args.limit.is_some() {
            self.record_limit = args.limit;
        }
        if let Some(hash) = args.hash {
            self.hash = hash;
        }
        if args.no_progress {
            self.progress = false;
        }
        if args.sequential {
            self.parallel = false;
        }
    }

    /// Reader settings derived from this config.
    #[must_use]
    pub fn reader_config(&self) -> ReaderConfig {
        ReaderConfig::default()
            .with_strict(self.strict)
            .with_record_limit(self.record_limit)
    }

    /// Index build settings derived from this config.
    #[must_use]
    pub fn build_config(&self) -> BuildConfig {
        BuildConfig::default()
            .with_parallel(self.parallel)
            .with_hash(self.hash)
    }

    /// Render as TOML, the same format [`Config::load`] reads.
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be represented in TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Effective excludes: configured ones plus any given on the command line.
    #[must_use]
    pub fn merged_excludes(&self, extra: &[String]) -> Vec<String> {
        self.excludes
            .iter()
            .chain(extra)
            .filter(|s| !s.is_empty())
            .cloned()
            .collect()
    }
}
