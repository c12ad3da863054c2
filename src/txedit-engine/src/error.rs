//! Error types for the edit engine.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while preparing, committing, or rolling back a
/// transaction.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A transaction is already active; nesting and concurrency are rejected.
    #[error("A transaction is already active")]
    TransactionActive,

    /// No transaction to commit or roll back.
    #[error("No active transaction")]
    NoActiveTransaction,

    /// An edit violates its structural invariants.
    #[error("Invalid edit for {path}: {reason}")]
    InvalidEdit { path: PathBuf, reason: String },

    /// Failed to read a file.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file.
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create a directory.
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to delete a file.
    #[error("Failed to delete {path}: {source}")]
    Delete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to rename a file.
    #[error("Failed to rename {from} to {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Rename refused because the destination already exists.
    #[error("Rename destination already exists: {path}")]
    DestinationExists { path: PathBuf },

    /// A line change's expected text does not match the file.
    #[error("Line range {start_line}..={end_line} in {path} does not match the expected text")]
    LineMismatch {
        path: PathBuf,
        start_line: usize,
        end_line: usize,
    },

    /// A line change's range falls outside the file.
    #[error("Line range {start_line}..={end_line} is out of bounds for {path} ({line_count} lines)")]
    LineOutOfBounds {
        path: PathBuf,
        start_line: usize,
        end_line: usize,
        line_count: usize,
    },

    /// The verification command reported failure.
    #[error("Verification failed:\n{}", diagnostics.join("\n"))]
    VerificationFailed { diagnostics: Vec<String> },

    /// The verification command exceeded its time budget.
    #[error("Verification timed out after {timeout_secs}s")]
    VerificationTimeout { timeout_secs: u64 },

    /// A backup could not be restored during rollback.
    #[error("Rollback failed for {path}: {message}")]
    RollbackFailed { path: PathBuf, message: String },

    /// Reference scanning failed.
    #[error(transparent)]
    Scan(#[from] txedit_refs::ScanError),
}

impl EngineError {
    /// Create an invalid-edit error.
    pub fn invalid_edit(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidEdit {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error is the controlled verification-failure path,
    /// as opposed to an unexpected failure mid-commit. Both trigger the same
    /// rollback routine.
    pub fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            Self::VerificationFailed { .. } | Self::VerificationTimeout { .. }
        )
    }
}
