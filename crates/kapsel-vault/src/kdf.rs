//! Passphrase-based key derivation.
//!
//! Derives the key-encryption key (KEK) from a user passphrase and a
//! per-user salt using PBKDF2-HMAC-SHA256 with a deliberately high work
//! factor. Derivation is deterministic: the same (passphrase, salt) pair
//! always yields the same key, which is what makes repeatable decryption
//! possible without ever persisting the key itself.

use std::num::NonZeroU32;

use rand::RngCore;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Error, Result};

/// Size of a derived key in bytes (256 bits).
pub const KEY_LEN: usize = 32;

/// Required salt length in bytes.
pub const SALT_LEN: usize = 32;

/// Default PBKDF2 iteration count, per the OWASP recommendation for
/// HMAC-SHA256.
pub const DEFAULT_ITERATIONS: u32 = 600_000;

/// A 256-bit symmetric key held in memory.
///
/// The bytes are zeroized when the value is dropped. The type has no
/// `Serialize` implementation on purpose: once derived or generated, a
/// key cannot be exported back out through a serialization boundary.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial {
    bytes: [u8; KEY_LEN],
}

impl KeyMaterial {
    /// Generates a new random key from the system CSPRNG.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Creates a `KeyMaterial` from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the byte slice is not exactly 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != KEY_LEN {
            return Err(Error::InvalidKeyLength {
                expected: KEY_LEN,
                actual: bytes.len(),
            });
        }

        let mut key_bytes = [0u8; KEY_LEN];
        key_bytes.copy_from_slice(bytes);
        Ok(Self { bytes: key_bytes })
    }

    /// Returns the key bytes as a slice.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

impl PartialEq for KeyMaterial {
    fn eq(&self, other: &Self) -> bool {
        use subtle::ConstantTimeEq;
        self.bytes.ct_eq(&other.bytes).into()
    }
}

impl Eq for KeyMaterial {}

/// PBKDF2-HMAC-SHA256 key derivation with a configured work factor.
#[derive(Debug, Clone, Copy)]
pub struct KeyDerivation {
    iterations: NonZeroU32,
}

impl KeyDerivation {
    /// Creates a derivation with the production iteration count.
    #[must_use]
    pub fn new() -> Self {
        // DEFAULT_ITERATIONS is a non-zero constant; the fallback never fires.
        Self {
            iterations: NonZeroU32::new(DEFAULT_ITERATIONS).unwrap_or(NonZeroU32::MIN),
        }
    }

    /// Creates a derivation with an explicit iteration count.
    ///
    /// Intended for tests and migration tooling; production paths use
    /// [`KeyDerivation::new`].
    #[must_use]
    pub const fn with_iterations(iterations: NonZeroU32) -> Self {
        Self { iterations }
    }

    /// Returns the configured iteration count.
    #[must_use]
    pub const fn iterations(&self) -> u32 {
        self.iterations.get()
    }

    /// Derives a 256-bit key-encryption key from a passphrase and salt.
    ///
    /// The salt must be exactly [`SALT_LEN`] bytes; anything else is a
    /// caller bug and fails before any derivation work is done.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSalt`] if the salt length is wrong.
    pub fn derive(&self, passphrase: &str, salt: &[u8]) -> Result<KeyMaterial> {
        if salt.len() != SALT_LEN {
            return Err(Error::InvalidSalt {
                expected: SALT_LEN,
                actual: salt.len(),
            });
        }

        let mut out = [0u8; KEY_LEN];
        pbkdf2::pbkdf2_hmac::<Sha256>(
            passphrase.as_bytes(),
            salt,
            self.iterations.get(),
            &mut out,
        );

        tracing::trace!(iterations = self.iterations.get(), "derived key-encryption key");

        let key = KeyMaterial { bytes: out };
        out.zeroize();
        Ok(key)
    }
}

impl Default for KeyDerivation {
    fn default() -> Self {
        Self::new()
    }
}

/// Generates a random salt suitable for [`KeyDerivation::derive`].
///
/// The salt is not secret, but it must remain stable for the lifetime of
/// the keys derived from it: changing a user's salt invalidates every
/// bundle wrapped under the old derivation.
#[must_use]
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}
