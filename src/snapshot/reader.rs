//! Streaming snapshot reader.
//!
//! Reads a snapshot one line at a time, hands each line to
//! [`parse_line`](super::parse_line) and applies the malformed-record
//! policy. Lenient mode (the default) skips bad lines with a warning;
//! strict mode aborts on the first one.
//!
//! Lines are read as raw bytes so that non-UTF-8 paths survive as lossy
//! strings instead of failing the whole load.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::record::{parse_line, Entry, RecordError};
use crate::progress::ProgressCallback;

/// How often (in lines) progress callbacks fire.
const PROGRESS_INTERVAL: usize = 10_000;

/// Configuration for reading a snapshot.
#[derive(Clone, Default)]
pub struct ReaderConfig {
    /// Abort on the first malformed record instead of skipping it.
    pub strict: bool,
    /// Stop after this many parsed records.
    pub record_limit: Option<usize>,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for ReaderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReaderConfig")
            .field("strict", &self.strict)
            .field("record_limit", &self.record_limit)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl ReaderConfig {
    /// Set strict malformed-record handling.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Limit the number of records read.
    #[must_use]
    pub fn with_record_limit(mut self, limit: Option<usize>) -> Self {
        self.record_limit = limit;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Counters collected while reading a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotStats {
    /// Lines consumed, including skipped ones
    pub lines: usize,
    /// Records parsed successfully
    pub records: usize,
    /// Malformed lines skipped (lenient mode only)
    pub malformed: usize,
    /// Empty lines ignored
    pub blank: usize,
    /// Whether reading stopped at the record limit
    pub truncated: bool,
}

/// Errors that can occur while reading a snapshot.
#[derive(thiserror::Error, Debug)]
pub enum SnapshotError {
    /// Loading was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Snapshot loading interrupted by user")]
    Interrupted,

    /// The snapshot file does not exist.
    #[error("Snapshot not found: {0}")]
    NotFound(PathBuf),

    /// A malformed record was found in strict mode.
    #[error(transparent)]
    Malformed(#[from] RecordError),

    /// An I/O error occurred while reading.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An I/O error occurred while opening or reading a specific file.
    #[error("I/O error for {path}: {source}")]
    IoWithPath {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Reads snapshot records according to a [`ReaderConfig`].
#[derive(Debug, Clone, Default)]
pub struct SnapshotReader {
    config: ReaderConfig,
}

impl SnapshotReader {
    /// Create a reader with the given configuration.
    #[must_use]
    pub fn new(config: ReaderConfig) -> Self {
        Self { config }
    }

    /// Open and read a snapshot file.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::NotFound`] for a missing file, and otherwise
    /// the same errors as [`SnapshotReader::read`].
    pub fn read_path(&self, path: &Path) -> Result<(Vec<Entry>, SnapshotStats), SnapshotError> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SnapshotError::NotFound(path.to_path_buf())
            } else {
                SnapshotError::IoWithPath {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;
        log::info!("Reading snapshot {}", path.display());
        self.read(BufReader::new(file))
    }

    /// Read records from any buffered source.
    ///
    /// # Errors
    ///
    /// - [`SnapshotError::Malformed`] in strict mode on the first bad line
    /// - [`SnapshotError::Interrupted`] when the shutdown flag is raised
    /// - [`SnapshotError::Io`] on read failures
    pub fn read<R: BufRead>(&self, mut input: R) -> Result<(Vec<Entry>, SnapshotStats), SnapshotError> {
        let mut stats = SnapshotStats::default();
        let mut entries = Vec::new();
        let mut buf = Vec::with_capacity(256);

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("read", 0);
        }

        loop {
            if self.config.record_limit.is_some_and(|limit| stats.records >= limit) {
                stats.truncated = true;
                log::info!("Record limit of {} reached, stopping", stats.records);
                break;
            }

            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            stats.lines += 1;

            if stats.lines % PROGRESS_INTERVAL == 0 {
                if self.config.is_shutdown_requested() {
                    log::info!("Snapshot read interrupted after {} lines", stats.lines);
                    return Err(SnapshotError::Interrupted);
                }
                if let Some(ref callback) = self.config.progress_callback {
                    callback.on_progress(stats.lines, "");
                }
            }

            if buf.last() == Some(&b'\n') {
                buf.pop();
            }
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
            // Only a truly empty line is skipped; whitespace goes to the parser.
            if buf.is_empty() {
                stats.blank += 1;
                continue;
            }
            let line = String::from_utf8_lossy(&buf);

            match parse_line(&line) {
                Ok(entry) => {
                    stats.records += 1;
                    entries.push(entry);
                }
                Err(e) => {
                    let e = e.at_line(stats.lines);
                    if self.config.strict {
                        return Err(SnapshotError::Malformed(e));
                    }
                    log::warn!("Skipping record: {}", e);
                    stats.malformed += 1;
                }
            }
        }

        if self.config.is_shutdown_requested() {
            return Err(SnapshotError::Interrupted);
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("read");
        }

        log::info!(
            "Read {} records from {} lines ({} malformed skipped)",
            stats.records,
            stats.lines,
            stats.malformed
        );
        Ok((entries, stats))
    }
}
