//! Snapshot record parsing.
//!
//! # Overview
//!
//! A snapshot line has five tab-separated fields:
//!
//! ```text
//! <size_kib>\t<inode>\t<modified>\t<entry_type>\t<path>
//! ```
//!
//! The path is everything after the fourth tab, taken verbatim. Numeric
//! fields are parsed permissively: leading decimal digits are used and
//! anything else yields 0, so a garbled size never drops a whole record.
//!
//! # Example
//!
//! ```
//! use snapdex::snapshot::parse_line;
//!
//! let entry = parse_line("100\t42\t2024-01-01\tf\t/a/x.txt").unwrap();
//! assert_eq!(entry.size_kib, 100);
//! assert_eq!(entry.basename, "x.txt");
//! assert!(!entry.is_dir());
//! ```

/// Entry type character used for directories.
pub const DIRECTORY: char = 'd';

/// Number of tab-separated fields in a snapshot record.
pub const FIELD_COUNT: usize = 5;

/// One parsed snapshot record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Size in KiB as reported by the scanner
    pub size_kib: u64,
    /// Inode number
    pub inode: u64,
    /// Modification date token, kept opaque
    pub modified: String,
    /// Type character (`'d'` for directories)
    pub entry_type: char,
    /// Absolute slash-separated path
    pub path: String,
    /// Substring of `path` after the last `/`
    pub basename: String,
}

impl Entry {
    /// Create an entry, deriving the basename from the path.
    #[must_use]
    pub fn new(
        size_kib: u64,
        inode: u64,
        modified: impl Into<String>,
        entry_type: char,
        path: impl Into<String>,
    ) -> Self {
        let path = path.into();
        let basename = basename_of(&path).to_string();
        Self {
            size_kib,
            inode,
            modified: modified.into(),
            entry_type,
            path,
            basename,
        }
    }

    /// Whether this entry is a directory.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.entry_type == DIRECTORY
    }

    /// Path of the containing directory, or `None` when the path has no `/`.
    ///
    /// `/a` yields `Some("")`, which never resolves to a real entry.
    #[must_use]
    pub fn parent_path(&self) -> Option<&str> {
        self.path.rfind('/').map(|pos| &self.path[..pos])
    }
}

/// Errors produced while parsing a single snapshot line.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The line did not contain all five tab-separated fields.
    #[error("Malformed record on line {line_number}: expected 5 tab-separated fields, found {fields}")]
    Malformed {
        /// 1-based line number in the snapshot (0 when unknown)
        line_number: usize,
        /// Number of fields actually present
        fields: usize,
    },

    /// The entry type field was empty.
    #[error("Malformed record on line {line_number}: empty entry type")]
    EmptyEntryType {
        /// 1-based line number in the snapshot (0 when unknown)
        line_number: usize,
    },
}

impl RecordError {
    /// Attach a line number to an error produced by [`parse_line`].
    #[must_use]
    pub fn at_line(self, line: usize) -> Self {
        match self {
            Self::Malformed { fields, .. } => Self::Malformed {
                line_number: line,
                fields,
            },
            Self::EmptyEntryType { .. } => Self::EmptyEntryType { line_number: line },
        }
    }
}

/// Parse one snapshot line into an [`Entry`].
///
/// A trailing `\r` is ignored. Line numbers in the returned error are 0;
/// callers that track position use [`RecordError::at_line`].
///
/// # Errors
///
/// Returns [`RecordError::Malformed`] when fewer than five fields are present
/// and [`RecordError::EmptyEntryType`] when the type field is empty.
pub fn parse_line(line: &str) -> Result<Entry, RecordError> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let mut fields = line.splitn(FIELD_COUNT, '\t');

    let (Some(size), Some(inode), Some(modified), Some(kind), Some(path)) = (
        fields.next(),
        fields.next(),
        fields.next(),
        fields.next(),
        fields.next(),
    ) else {
        return Err(RecordError::Malformed {
            line_number: 0,
            fields: line.split('\t').count(),
        });
    };

    let entry_type = kind
        .chars()
        .next()
        .ok_or(RecordError::EmptyEntryType { line_number: 0 })?;

    Ok(Entry::new(
        parse_leading_u64(size),
        parse_leading_u64(inode),
        modified,
        entry_type,
        path,
    ))
}

/// Substring after the last `/`; empty when there is none.
#[must_use]
pub fn basename_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(pos) => &path[pos + 1..],
        None => "",
    }
}

/// Parse leading ASCII digits after optional whitespace, saturating on overflow.
fn parse_leading_u64(field: &str) -> u64 {
    let trimmed = field.trim_start();
    let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);
    trimmed
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0u64, |acc, digit| {
            acc.saturating_mul(10).saturating_add(u64::from(digit - b'0'))
        })
}
