//! Two-layer envelope encryption of opaque tokens.
//!
//! [`TokenVault::wrap`] encrypts a secret under a fresh random
//! data-encryption key (DEK), then wraps that DEK under the
//! key-encryption key (KEK) derived from the caller's passphrase and
//! salt. The backing store only ever sees the resulting
//! [`EncryptedBundle`]; without the passphrase neither layer opens.
//!
//! [`TokenVault::unwrap`] reverses the operation exactly. Every failure
//! mode on the unwrap path — wrong passphrase, wrong salt value,
//! tampered ciphertext or tag at either layer, a wrapped key too short
//! to contain its tag, plaintext that is not UTF-8 — collapses into
//! [`Error::DecryptionFailed`].

use zeroize::Zeroizing;

use crate::bundle::EncryptedBundle;
use crate::cipher::{self, TAG_LEN};
use crate::error::{Error, Result};
use crate::kdf::{KeyDerivation, KeyMaterial};

/// Envelope encryption of tokens under a passphrase-derived key.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenVault {
    kdf: KeyDerivation,
}

impl TokenVault {
    /// Creates a vault with the production key-derivation work factor.
    #[must_use]
    pub fn new() -> Self {
        Self {
            kdf: KeyDerivation::new(),
        }
    }

    /// Creates a vault with an explicit key derivation, for tests and
    /// migration tooling.
    #[must_use]
    pub const fn with_kdf(kdf: KeyDerivation) -> Self {
        Self { kdf }
    }

    /// Encrypts `token` into a storable bundle.
    ///
    /// A fresh 256-bit DEK is generated per call, independent of the
    /// passphrase, so two wraps of the same token share nothing but
    /// plaintext.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSalt`] for a salt that is not 32 bytes
    /// and [`Error::EncryptionFailed`] if either encryption layer fails.
    pub fn wrap(&self, token: &str, passphrase: &str, salt: &[u8]) -> Result<EncryptedBundle> {
        // Fail on a bad salt before doing any cipher work.
        let kek = self.kdf.derive(passphrase, salt)?;

        let dek = KeyMaterial::generate();

        let content = cipher::encrypt(token.as_bytes(), &dek)?;
        let key_layer = cipher::encrypt(dek.as_bytes(), &kek)?;

        // Storage represents the wrapped key as ciphertext ‖ tag in one
        // field; the key nonce stays separate.
        let mut wrapped_key = key_layer.ciphertext;
        wrapped_key.extend_from_slice(&key_layer.tag);

        tracing::debug!(ciphertext_len = content.ciphertext.len(), "wrapped token");

        Ok(EncryptedBundle {
            ciphertext: content.ciphertext,
            content_nonce: content.nonce,
            wrapped_key,
            key_nonce: key_layer.nonce,
            auth_tag: content.tag,
        })
    }

    /// Decrypts a bundle back to the original token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSalt`] for a salt that is not 32 bytes;
    /// every other failure is [`Error::DecryptionFailed`].
    pub fn unwrap(
        &self,
        bundle: &EncryptedBundle,
        passphrase: &str,
        salt: &[u8],
    ) -> Result<String> {
        let kek = self.kdf.derive(passphrase, salt)?;

        // Split the folded wrapped key back into ciphertext and tag.
        if bundle.wrapped_key.len() < TAG_LEN {
            return Err(Error::DecryptionFailed);
        }
        let split = bundle.wrapped_key.len() - TAG_LEN;
        let (dek_ciphertext, dek_tag) = bundle.wrapped_key.split_at(split);
        let dek_tag: [u8; TAG_LEN] = dek_tag.try_into().map_err(|_| Error::DecryptionFailed)?;

        let dek_bytes = Zeroizing::new(
            cipher::decrypt(dek_ciphertext, &bundle.key_nonce, &dek_tag, &kek)
                .map_err(|_| Error::DecryptionFailed)?,
        );
        let dek = KeyMaterial::from_bytes(&dek_bytes).map_err(|_| Error::DecryptionFailed)?;

        let plaintext = cipher::decrypt(
            &bundle.ciphertext,
            &bundle.content_nonce,
            &bundle.auth_tag,
            &dek,
        )
        .map_err(|_| Error::DecryptionFailed)?;

        String::from_utf8(plaintext).map_err(|_| Error::DecryptionFailed)
    }
}
