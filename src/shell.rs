//! Line-oriented interactive prompt over a built index.
//!
//! Each input line is `<command> <param>`:
//!
//! | Command            | Action                                        |
//! |--------------------|-----------------------------------------------|
//! | `find NAME`        | entries whose basename is exactly NAME        |
//! | `match SUBSTR`     | entries whose basename contains SUBSTR        |
//! | `matchdir SUBSTR`  | like `match`, directories only                |
//! | `bysize [N]`       | the N largest entries                         |
//! | `dupes [MIN [N]]`  | duplicate subtrees of at least MIN KiB        |
//! | `help`             | print usage                                   |
//! | `quit`             | leave the prompt                              |
//!
//! The parameter is everything after the first space, so names containing
//! spaces work unquoted. The loop is generic over its input and output so it
//! can be driven from tests.

use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::Config;
use crate::index::SnapshotIndex;
use crate::output::{OutputError, TextOutput};

const PROMPT: &str = "Type a command (help for usage):";

const USAGE: &str = "\
Usage: <command> <param>
  i.e. find foo (find basename exactly matching foo)
  i.e. match foo (find basename containing foo)
  i.e. matchdir foo (find folders containing foo)
  i.e. bysize 20 (list the 20 largest entries)
  i.e. dupes 1024 5 (5 duplicate groups of at least 1024 KiB)
  quit (leave)";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Exact basename lookup
    Find(String),
    /// Substring search
    Match {
        /// Substring to look for
        pattern: String,
        /// Only report directories
        directories_only: bool,
    },
    /// Largest entries, with an optional count
    BySize(Option<usize>),
    /// Duplicate groups, with optional minimum size and group count
    Dupes {
        /// Minimum cumulative size in KiB
        min_kib: Option<u64>,
        /// Maximum number of groups
        max_groups: Option<usize>,
    },
    /// Print usage
    Help,
    /// Leave the prompt
    Quit,
    /// Anything that does not parse; carries a message for the user
    Invalid(String),
}

/// Parse one input line.
#[must_use]
pub fn parse_command(line: &str) -> ShellCommand {
    let line = line.trim_end_matches(['\r', '\n']);
    let (command, param) = match line.split_once(' ') {
        Some((command, param)) => (command, Some(param)),
        None => (line.trim(), None),
    };

    match (command, param) {
        ("find", Some(name)) => ShellCommand::Find(name.to_string()),
        ("match", Some(pattern)) => ShellCommand::Match {
            pattern: pattern.to_string(),
            directories_only: false,
        },
        ("matchdir", Some(pattern)) => ShellCommand::Match {
            pattern: pattern.to_string(),
            directories_only: true,
        },
        ("bysize", param) => {
            let mut args = param.unwrap_or("").split_whitespace();
            match parse_optional(args.next()) {
                Ok(count) => ShellCommand::BySize(count),
                Err(message) => ShellCommand::Invalid(message),
            }
        }
        ("dupes", param) => {
            let mut args = param.unwrap_or("").split_whitespace();
            let min_kib = parse_optional(args.next());
            let max_groups = parse_optional(args.next());
            match (min_kib, max_groups) {
                (Ok(min_kib), Ok(max_groups)) => ShellCommand::Dupes {
                    min_kib,
                    max_groups,
                },
                (Err(message), _) | (_, Err(message)) => ShellCommand::Invalid(message),
            }
        }
        ("help", _) => ShellCommand::Help,
        ("quit" | "exit", _) => ShellCommand::Quit,
        (_, None) => ShellCommand::Invalid(USAGE.to_string()),
        (other, Some(_)) => ShellCommand::Invalid(format!("Unknown command '{other}'\n{USAGE}")),
    }
}

fn parse_optional<T: std::str::FromStr>(arg: Option<&str>) -> Result<Option<T>, String> {
    arg.map(|s| s.parse().map_err(|_| format!("Not a number: '{s}'")))
        .transpose()
}

/// Interactive query loop.
pub struct Shell<'a> {
    index: &'a SnapshotIndex,
    config: &'a Config,
    text: TextOutput,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl<'a> Shell<'a> {
    /// Create a shell over `index`, taking limits and excludes from `config`.
    #[must_use]
    pub fn new(index: &'a SnapshotIndex, config: &'a Config, color: bool) -> Self {
        Self {
            index,
            config,
            text: TextOutput::new(color),
            shutdown_flag: None,
        }
    }

    /// Stop the loop once this flag is raised.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Read commands from `input` until `quit`, end of input or shutdown.
    ///
    /// Returns the number of commands executed.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input or writing output fails.
    pub fn run<R: BufRead, W: Write>(&self, input: R, output: &mut W) -> Result<usize, OutputError> {
        let mut executed = 0;
        writeln!(output, "{PROMPT}")?;
        output.flush()?;

        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                writeln!(output, "{PROMPT}")?;
                output.flush()?;
                continue;
            }

            let command = parse_command(&line);
            log::trace!("Shell command: {:?}", command);
            if command == ShellCommand::Quit {
                break;
            }
            self.execute(&command, output)?;
            executed += 1;

            if self.is_shutdown_requested() {
                log::info!("Shutdown requested, leaving shell");
                break;
            }
            writeln!(output, "{PROMPT}")?;
            output.flush()?;
        }
        Ok(executed)
    }

    /// Execute one command, writing its results to `output`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn execute<W: Write>(&self, command: &ShellCommand, output: &mut W) -> Result<(), OutputError> {
        let excludes = self.config.merged_excludes(&[]);
        match command {
            ShellCommand::Find(name) => {
                let hits = self.index.find(name, self.config.max_results, &excludes);
                if hits.is_empty() {
                    writeln!(output, "Nothing found. Try using 'match'...")?;
                } else {
                    self.text.write_entries(output, &hits, "")?;
                }
            }
            ShellCommand::Match {
                pattern,
                directories_only,
            } => {
                writeln!(output, "matching {pattern}")?;
                let limit = self.config.max_results;
                let mut hits = self.index.matching(
                    pattern,
                    limit.saturating_add(1),
                    &excludes,
                    *directories_only,
                );
                let truncated = hits.len() > limit;
                hits.truncate(limit);
                self.text.write_entries(output, &hits, "match: ")?;
                if truncated {
                    writeln!(output, "Enough matches, cancelling..")?;
                }
            }
            ShellCommand::BySize(count) => {
                let hits = self
                    .index
                    .by_size(count.unwrap_or(self.config.max_results));
                self.text.write_sizes(output, &hits)?;
            }
            ShellCommand::Dupes {
                min_kib,
                max_groups,
            } => {
                let groups = self.index.dupes(
                    min_kib.unwrap_or(self.config.min_dupe_kib),
                    max_groups.unwrap_or(self.config.max_groups),
                );
                if groups.is_empty() {
                    writeln!(output, "No duplicate directories found.")?;
                } else {
                    self.text.write_dupes(output, &groups)?;
                }
            }
            ShellCommand::Help => writeln!(output, "{USAGE}")?,
            ShellCommand::Invalid(message) => writeln!(output, "{message}")?,
            ShellCommand::Quit => {}
        }
        Ok(())
    }
}
