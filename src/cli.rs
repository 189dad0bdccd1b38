//! Command-line interface definitions for snapdex.
//!
//! Every subcommand takes the snapshot file as its first positional argument.
//! Limits not given on the command line fall back to the configuration file
//! and then to the built-in defaults.
//!
//! # Example
//!
//! ```bash
//! # Exact basename lookup
//! snapdex find snapshot.tsv libc.so.6
//!
//! # Substring search, directories only, skipping /proc
//! snapdex match snapshot.tsv cache --dirs-only -x /proc/
//!
//! # Twenty largest entries as JSON
//! snapdex by-size snapshot.tsv -n 20 --output json
//!
//! # Duplicate subtrees of at least 1 MiB
//! snapdex dupes snapshot.tsv --min-kib 1024
//!
//! # Interactive prompt
//! snapdex shell snapshot.tsv
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::index::HashAlgorithm;

/// Search and analyze filesystem snapshots.
///
/// snapdex loads a tab-separated snapshot of a filesystem walk into memory and
/// answers basename lookups, substring searches, largest-entry listings and
/// duplicate-subtree reports.
#[derive(Debug, Parser)]
#[command(name = "snapdex")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Report errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List entries whose basename is exactly NAME
    Find(FindArgs),
    /// List entries whose basename contains SUBSTR
    Match(MatchArgs),
    /// List the largest entries
    BySize(BySizeArgs),
    /// Report duplicate directory subtrees
    Dupes(DupesArgs),
    /// Answer queries interactively from stdin
    Shell(ShellArgs),
}

impl Commands {
    /// Snapshot arguments shared by every subcommand.
    #[must_use]
    pub fn snapshot_args(&self) -> &SnapshotArgs {
        match self {
            Self::Find(args) => &args.snapshot,
            Self::Match(args) => &args.snapshot,
            Self::BySize(args) => &args.snapshot,
            Self::Dupes(args) => &args.snapshot,
            Self::Shell(args) => &args.snapshot,
        }
    }
}

/// Output format for query results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// A single JSON document
    Json,
}

/// Arguments shared by every subcommand.
#[derive(Debug, Args)]
pub struct SnapshotArgs {
    /// Snapshot file to load
    #[arg(value_name = "SNAPSHOT")]
    pub snapshot: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Abort on the first malformed record instead of skipping it
    #[arg(long)]
    pub strict: bool,

    /// Read at most N records
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,

    /// Subtree hashing algorithm
    #[arg(long, value_enum)]
    pub hash: Option<HashAlgorithm>,

    /// Do not show progress spinners
    #[arg(long)]
    pub no_progress: bool,

    /// Sort the catalog on a single thread
    #[arg(long)]
    pub sequential: bool,
}

/// Arguments for the find subcommand.
#[derive(Debug, Args)]
pub struct FindArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArgs,

    /// Exact basename to look up
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Maximum number of results
    #[arg(short = 'n', long, value_name = "N")]
    pub max_results: Option<usize>,

    /// Skip entries whose basename contains this substring (repeatable)
    #[arg(short = 'x', long = "exclude", value_name = "SUBSTR")]
    pub excludes: Vec<String>,
}

/// Arguments for the match subcommand.
#[derive(Debug, Args)]
pub struct MatchArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArgs,

    /// Substring to search for in basenames (case-sensitive)
    #[arg(value_name = "SUBSTR")]
    pub substring: String,

    /// Maximum number of results
    #[arg(short = 'n', long, value_name = "N")]
    pub max_results: Option<usize>,

    /// Skip entries whose path contains this substring (repeatable)
    #[arg(short = 'x', long = "exclude", value_name = "SUBSTR")]
    pub excludes: Vec<String>,

    /// Only report directories
    #[arg(long)]
    pub dirs_only: bool,
}

/// Arguments for the by-size subcommand.
#[derive(Debug, Args)]
pub struct BySizeArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArgs,

    /// Number of entries to list
    #[arg(short = 'n', long, value_name = "N")]
    pub max_results: Option<usize>,
}

/// Arguments for the dupes subcommand.
#[derive(Debug, Args)]
pub struct DupesArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArgs,

    /// Minimum cumulative size of a reported group, in KiB
    #[arg(long, value_name = "KIB")]
    pub min_kib: Option<u64>,

    /// Maximum number of groups
    #[arg(short = 'n', long, value_name = "N")]
    pub max_groups: Option<usize>,
}

/// Arguments for the shell subcommand.
#[derive(Debug, Args)]
pub struct ShellArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArgs,
}
