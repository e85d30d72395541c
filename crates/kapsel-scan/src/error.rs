//! Error types for credential scanning.

use thiserror::Error;

/// Errors that can occur while scanning a source file.
#[derive(Debug, Error)]
pub enum ScanError {
    /// A source file could not be parsed.
    ///
    /// Per-file and non-fatal: the scanner logs it, yields zero
    /// candidates for the file, and keeps going.
    #[error("failed to parse {file}: {reason}")]
    Parse {
        /// The file that failed to parse.
        file: String,
        /// Why parsing failed.
        reason: String,
    },
}

/// Result type alias for scan operations.
pub type Result<T> = std::result::Result<T, ScanError>;
