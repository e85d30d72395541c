//! Error types for the envelope encryption engine.

use thiserror::Error;

/// Errors that can occur in the envelope encryption engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Decryption failed.
    ///
    /// Deliberately carries no detail: a wrong passphrase, a wrong salt,
    /// a tampered ciphertext or tag at either encryption layer, and a
    /// malformed stored bundle are all indistinguishable to the caller.
    /// Distinguishing them would hand an oracle to an attacker probing
    /// stored bundles.
    #[error("decryption failed")]
    DecryptionFailed,

    /// Encryption failed.
    #[error("encryption error: {reason}")]
    EncryptionFailed {
        /// The reason encryption failed.
        reason: String,
    },

    /// The supplied salt does not have the required length.
    #[error("invalid salt length: expected {expected} bytes, got {actual}")]
    InvalidSalt {
        /// The required salt length in bytes.
        expected: usize,
        /// The length of the salt actually supplied.
        actual: usize,
    },

    /// A key of the wrong length was handed to the cipher.
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength {
        /// The required key length in bytes.
        expected: usize,
        /// The length of the key actually supplied.
        actual: usize,
    },
}

/// Result type alias for envelope encryption operations.
pub type Result<T> = std::result::Result<T, Error>;
