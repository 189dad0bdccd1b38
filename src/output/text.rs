//! Plain-text output for terminals.
//!
//! One line per hit so results compose with `grep`, `sort` and friends.
//! Sizes are rendered with IEC units via `bytesize`. Colors come from `yansi`
//! and are only emitted when enabled.

use std::fmt::Display;
use std::io::Write;

use bytesize::ByteSize;
use yansi::{Color, Condition, Paint, Painted, Style};

use super::{OutputError, QueryResults};
use crate::index::{DupeGroup, EntryHit, SizeHit};
use crate::snapshot::DIRECTORY;

const HEADER: Style = Style::new().bold();
const DIR: Style = Color::Blue.foreground();
const DIM: Style = Style::new().dim();

/// Text renderer.
#[derive(Debug, Clone, Copy)]
pub struct TextOutput {
    color: bool,
}

/// Human-readable size for a KiB count, saturating at `u64::MAX` bytes.
#[must_use]
pub fn format_kib(kib: u64) -> String {
    ByteSize::b(kib.saturating_mul(1024)).to_string()
}

impl TextOutput {
    /// Create a renderer; `color` enables ANSI styling.
    #[must_use]
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint<'a, T: Display + ?Sized>(&self, value: &'a T, style: Style) -> Painted<&'a T> {
        let condition = if self.color {
            Condition::ALWAYS
        } else {
            Condition::NEVER
        };
        value.paint(style).whenever(condition)
    }

    /// Write any result set.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_results<W: Write>(
        &self,
        writer: &mut W,
        results: &QueryResults,
    ) -> Result<(), OutputError> {
        match results {
            QueryResults::Entries(hits) => self.write_entries(writer, hits, ""),
            QueryResults::Sizes(hits) => self.write_sizes(writer, hits),
            QueryResults::Dupes(groups) => self.write_dupes(writer, groups),
        }
    }

    /// Write `find`/`match` hits, each line starting with `prefix`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_entries<W: Write>(
        &self,
        writer: &mut W,
        hits: &[EntryHit],
        prefix: &str,
    ) -> Result<(), OutputError> {
        for hit in hits {
            let style = if hit.entry_type == DIRECTORY {
                DIR
            } else {
                Style::new()
            };
            writeln!(
                writer,
                "{}{} {}  {}",
                prefix,
                hit.entry_type,
                self.paint(hit.modified.as_str(), DIM),
                self.paint(hit.path.as_str(), style)
            )?;
        }
        Ok(())
    }

    /// Write `by-size` hits, largest first.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_sizes<W: Write>(&self, writer: &mut W, hits: &[SizeHit]) -> Result<(), OutputError> {
        for hit in hits {
            writeln!(writer, "{:>11}  {}", format_kib(hit.size_kib), hit.path)?;
        }
        Ok(())
    }

    /// Write duplicate groups: a header line then one indented line per member.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_dupes<W: Write>(
        &self,
        writer: &mut W,
        groups: &[DupeGroup],
    ) -> Result<(), OutputError> {
        for (i, group) in groups.iter().enumerate() {
            if i > 0 {
                writeln!(writer)?;
            }
            let each = group
                .members
                .first()
                .map_or(0, |m| m.cumulative_size_kib);
            let header = format!(
                "{} copies of {} ({} wasted) [{}]",
                group.occurrence_count,
                format_kib(each),
                format_kib(group.wasted_kib()),
                group.hash_hex()
            );
            writeln!(writer, "{}", self.paint(header.as_str(), HEADER))?;
            for member in &group.members {
                writeln!(writer, "  {}", self.paint(member.path.as_str(), DIR))?;
            }
        }
        Ok(())
    }
}
