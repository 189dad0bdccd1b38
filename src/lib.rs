//! snapdex - in-memory index over filesystem snapshots
//!
//! A snapshot is a tab-separated text file produced by walking a filesystem,
//! one record per file or directory. snapdex loads it, builds an immutable
//! index and answers four kinds of query:
//!
//! - exact basename lookup ([`index::SnapshotIndex::find`])
//! - basename substring search ([`index::SnapshotIndex::matching`])
//! - largest entries ([`index::SnapshotIndex::by_size`])
//! - duplicate directory subtrees ([`index::SnapshotIndex::dupes`])
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use snapdex::config::Config;
//!
//! let index = snapdex::load_index(Path::new("snapshot.tsv"), &Config::default(), None, None)
//!     .unwrap();
//! for hit in index.find("libc.so.6", 10, &[]) {
//!     println!("{}", hit.path);
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod index;
pub mod logging;
pub mod output;
pub mod progress;
pub mod shell;
pub mod signal;
pub mod snapshot;

use std::io::{IsTerminal, Write};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::Context;

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::error::ExitCode;
use crate::index::{IndexBuilder, SnapshotIndex};
use crate::output::{write_results, QueryResults};
use crate::progress::{Progress, ProgressCallback};
use crate::shell::Shell;
use crate::snapshot::SnapshotReader;

/// Read a snapshot and build a shared index from it.
///
/// # Errors
///
/// Fails if the snapshot cannot be read, if `config.strict` is set and a
/// record is malformed, or if `shutdown_flag` is raised while reading.
pub fn load_index(
    path: &Path,
    config: &Config,
    progress: Option<Arc<dyn ProgressCallback>>,
    shutdown_flag: Option<Arc<AtomicBool>>,
) -> anyhow::Result<Arc<SnapshotIndex>> {
    let mut reader_config = config.reader_config();
    let mut build_config = config.build_config();
    if let Some(progress) = progress {
        reader_config = reader_config.with_progress_callback(Arc::clone(&progress));
        build_config = build_config.with_progress_callback(progress);
    }
    if let Some(flag) = shutdown_flag {
        reader_config = reader_config.with_shutdown_flag(flag);
    }

    let (entries, _) = SnapshotReader::new(reader_config)
        .read_path(path)
        .with_context(|| format!("Failed to load snapshot {}", path.display()))?;

    Ok(IndexBuilder::new(build_config).build_shared(entries))
}

/// Run the CLI application.
///
/// # Errors
///
/// Returns an error for configuration, snapshot or output failures. An
/// interrupted load surfaces as [`snapshot::SnapshotError::Interrupted`].
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    if cli.no_color {
        yansi::disable();
    }
    let stdout = std::io::stdout();
    let color = !cli.no_color && stdout.is_terminal();

    let mut config =
        Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let snapshot_args = cli.command.snapshot_args();
    config.apply_cli(snapshot_args);
    match config.to_toml() {
        Ok(rendered) => log::debug!("Effective configuration:\n{}", rendered),
        Err(e) => log::debug!("Effective configuration: {:?} ({})", config, e),
    }

    let handler = signal::install_handler()?;
    let progress: Option<Arc<dyn ProgressCallback>> = if config.progress && !cli.quiet {
        Some(Arc::new(Progress::new(false)))
    } else {
        None
    };

    let index = load_index(
        &snapshot_args.snapshot,
        &config,
        progress,
        Some(handler.get_flag()),
    )?;

    let (command, results) = match &cli.command {
        Commands::Find(args) => {
            let excludes = config.merged_excludes(&args.excludes);
            let limit = args.max_results.unwrap_or(config.max_results);
            ("find", QueryResults::Entries(index.find(&args.name, limit, &excludes)))
        }
        Commands::Match(args) => {
            let excludes = config.merged_excludes(&args.excludes);
            let limit = args.max_results.unwrap_or(config.max_results);
            let hits = index.matching(&args.substring, limit, &excludes, args.dirs_only);
            ("match", QueryResults::Entries(hits))
        }
        Commands::BySize(args) => {
            let limit = args.max_results.unwrap_or(config.max_results);
            ("by-size", QueryResults::Sizes(index.by_size(limit)))
        }
        Commands::Dupes(args) => {
            let min_kib = args.min_kib.unwrap_or(config.min_dupe_kib);
            let max_groups = args.max_groups.unwrap_or(config.max_groups);
            ("dupes", QueryResults::Dupes(index.dupes(min_kib, max_groups)))
        }
        Commands::Shell(_) => {
            let shell = Shell::new(&index, &config, color).with_shutdown_flag(handler.get_flag());
            let stdin = std::io::stdin();
            let executed = shell
                .run(stdin.lock(), &mut stdout.lock())
                .context("Shell I/O failed")?;
            log::debug!("Shell executed {} commands", executed);
            return Ok(ExitCode::Success);
        }
    };

    let mut out = stdout.lock();
    write_results(
        &mut out,
        command,
        &results,
        index.stats(),
        snapshot_args.output,
        color,
    )
    .context("Failed to write results")?;
    out.flush().context("Failed to write results")?;

    log::debug!("{} returned {} results", command, results.len());
    Ok(ExitCode::for_results(results.len()))
}
