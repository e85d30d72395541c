//! Error types for the sync pipeline.
//!
//! Per-item failures (a file that fails to fetch, a secret that fails to
//! persist) are caught inside the orchestrator and recorded in the sync
//! log; they never surface through this enum. What does surface is
//! fatal: configuration errors, cryptographic errors, storage queries
//! the run cannot proceed without, and abort.

use thiserror::Error;

/// Errors that can occur in the sync pipeline.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The sync request is invalid.
    #[error("invalid sync configuration: {reason}")]
    InvalidConfiguration {
        /// Why the configuration was rejected.
        reason: String,
    },

    /// A repository file fetch failed (network or collaborator error,
    /// as opposed to the file simply not existing).
    #[error("fetch failed for {path}: {reason}")]
    FetchFailed {
        /// The path that failed to fetch.
        path: String,
        /// The underlying reason.
        reason: String,
    },

    /// The storage collaborator rejected a write.
    #[error("persist failed for {key_name}: {reason}")]
    PersistFailed {
        /// The key that failed to persist.
        key_name: String,
        /// The underlying reason.
        reason: String,
    },

    /// The existing-key-names snapshot could not be read.
    #[error("failed to list existing secrets: {reason}")]
    ListFailed {
        /// The underlying reason.
        reason: String,
    },

    /// The sync log could not be appended.
    #[error("failed to append sync log: {reason}")]
    LogAppendFailed {
        /// The underlying reason.
        reason: String,
    },

    /// The run was aborted before persisting began.
    #[error("sync run aborted before persisting")]
    Aborted,

    /// A cryptographic operation failed.
    #[error(transparent)]
    Vault(#[from] kapsel_vault::Error),
}

/// Result type alias for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formats_correctly() {
        let err = SyncError::InvalidConfiguration {
            reason: "sources must not be empty".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid sync configuration: sources must not be empty"
        );

        let err = SyncError::FetchFailed {
            path: ".env".to_string(),
            reason: "connection reset".to_string(),
        };
        assert_eq!(err.to_string(), "fetch failed for .env: connection reset");
    }

    #[test]
    fn vault_errors_pass_through_undifferentiated() {
        let err = SyncError::from(kapsel_vault::Error::DecryptionFailed);
        assert_eq!(err.to_string(), "decryption failed");
    }
}
