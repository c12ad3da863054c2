//! Error types for reference scanning.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors that can occur while scanning a source tree for references.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The configured project root does not exist.
    #[error("Project root not found: {0}")]
    RootNotFound(PathBuf),

    /// The configured project root is not a directory.
    #[error("Project root is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Failed to read a source file during scanning.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A generated reference pattern failed to compile.
    #[error("Invalid reference pattern for specifier '{specifier}': {source}")]
    Pattern {
        specifier: String,
        #[source]
        source: regex::Error,
    },
}
