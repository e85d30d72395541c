//! Authenticated encryption primitive.
//!
//! AES-256-GCM with a 96-bit random nonce and a 128-bit authentication
//! tag. The underlying cipher appends the tag to the ciphertext; storage
//! keeps the tag as a separate field, so [`encrypt`] splits it off and
//! [`decrypt`] folds it back on before opening.
//!
//! Nonces are drawn from the CSPRNG on every call. They are never
//! counters: a counter survives only as long as the process does, and a
//! restart without persisted counter state would reuse values.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::RngCore;

use crate::error::{Error, Result};
use crate::kdf::KeyMaterial;

/// Size of the nonce in bytes (96 bits).
pub const NONCE_LEN: usize = 12;

/// Size of the authentication tag in bytes (128 bits).
pub const TAG_LEN: usize = 16;

/// Output of one [`encrypt`] call: ciphertext with the nonce and tag
/// broken out into their own fields.
#[derive(Clone)]
pub struct SealedBox {
    /// The encrypted payload, tag stripped.
    pub ciphertext: Vec<u8>,
    /// The random nonce used for this encryption.
    pub nonce: [u8; NONCE_LEN],
    /// The authentication tag.
    pub tag: [u8; TAG_LEN],
}

impl std::fmt::Debug for SealedBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SealedBox")
            .field("ciphertext_len", &self.ciphertext.len())
            .finish()
    }
}

/// Encrypts `plaintext` under `key` with a fresh random nonce.
///
/// # Errors
///
/// Returns [`Error::EncryptionFailed`] if the cipher reports a failure.
pub fn encrypt(plaintext: &[u8], key: &KeyMaterial) -> Result<SealedBox> {
    let cipher =
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|e| Error::EncryptionFailed {
            reason: format!("failed to create cipher: {e}"),
        })?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    // The AEAD appends the 16-byte tag to its output.
    let mut sealed = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| Error::EncryptionFailed {
            reason: format!("encryption failed: {e}"),
        })?;

    if sealed.len() < TAG_LEN {
        return Err(Error::EncryptionFailed {
            reason: "cipher output shorter than tag".to_string(),
        });
    }

    let tag_start = sealed.len() - TAG_LEN;
    let mut tag = [0u8; TAG_LEN];
    tag.copy_from_slice(&sealed[tag_start..]);
    sealed.truncate(tag_start);

    tracing::trace!(
        plaintext_len = plaintext.len(),
        ciphertext_len = sealed.len(),
        "sealed payload"
    );

    Ok(SealedBox {
        ciphertext: sealed,
        nonce: nonce_bytes,
        tag,
    })
}

/// Decrypts `ciphertext` under `key`, verifying `tag` before any
/// plaintext is returned.
///
/// # Errors
///
/// Returns [`Error::DecryptionFailed`] if authentication fails for any
/// reason: wrong key, wrong nonce, tampered ciphertext, tampered tag.
pub fn decrypt(
    ciphertext: &[u8],
    nonce: &[u8; NONCE_LEN],
    tag: &[u8; TAG_LEN],
    key: &KeyMaterial,
) -> Result<Vec<u8>> {
    let cipher =
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| Error::DecryptionFailed)?;

    // Re-fold the tag onto the ciphertext, the framing the AEAD expects.
    let mut sealed = Vec::with_capacity(ciphertext.len() + TAG_LEN);
    sealed.extend_from_slice(ciphertext);
    sealed.extend_from_slice(tag);

    cipher
        .decrypt(Nonce::from_slice(nonce), sealed.as_slice())
        .map_err(|_| Error::DecryptionFailed)
}
