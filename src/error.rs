//! Exit codes and structured error reporting.

use serde::Serialize;

/// Exit codes for the snapdex binary.
///
/// - 0: Success (query returned results)
/// - 1: General error (bad snapshot, I/O failure, invalid config)
/// - 2: No results (query completed normally with an empty result)
/// - 130: Interrupted by user (Ctrl+C while loading)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: the query returned at least one result.
    Success = 0,
    /// General error: an unexpected failure or a failed build.
    GeneralError = 1,
    /// No results: the query completed but matched nothing.
    NoResults = 2,
    /// Interrupted: loading was interrupted by user (Ctrl+C).
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "SD000",
            Self::GeneralError => "SD001",
            Self::NoResults => "SD002",
            Self::Interrupted => "SD130",
        }
    }

    /// Exit code for a query that produced `count` results.
    #[must_use]
    pub fn for_results(count: usize) -> Self {
        if count == 0 {
            Self::NoResults
        } else {
            Self::Success
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "SD001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message, including its cause chain
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{:#}", err),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}

/// Pick the exit code for an error returned by [`crate::run_app`].
#[must_use]
pub fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    let interrupted = err
        .downcast_ref::<crate::snapshot::SnapshotError>()
        .is_some_and(|e| matches!(e, crate::snapshot::SnapshotError::Interrupted));
    if interrupted {
        ExitCode::Interrupted
    } else {
        ExitCode::GeneralError
    }
}
