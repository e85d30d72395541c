//! The storable ciphertext bundle.
//!
//! An [`EncryptedBundle`] is the self-describing unit produced by one
//! wrap operation: content ciphertext, the wrapped data-encryption key,
//! both nonces, and the content authentication tag. It is safe to hand
//! to an untrusted datastore — nothing in it is usable without the
//! passphrase-derived key.
//!
//! Bundles cross serialization boundaries as [`EncodedBundle`], with
//! every field base64-encoded. Decoding is strict: malformed base64 or a
//! wrong-length nonce/tag field yields the same undifferentiated
//! decryption error as a tampered ciphertext would.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::cipher::{NONCE_LEN, TAG_LEN};
use crate::error::{Error, Result};

/// One wrapped secret, ready for storage.
///
/// Created once per encryption event and immutable thereafter. Rotation
/// replaces the whole bundle with a new one under fresh nonces; it never
/// mutates an existing bundle in place.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptedBundle {
    /// The encrypted payload, authentication tag stripped.
    pub ciphertext: Vec<u8>,
    /// Nonce for the content encryption layer.
    pub content_nonce: [u8; NONCE_LEN],
    /// The data-encryption key encrypted under the key-encryption key,
    /// with its own tag folded onto the end (ciphertext ‖ tag).
    pub wrapped_key: Vec<u8>,
    /// Nonce for the key-wrap layer.
    pub key_nonce: [u8; NONCE_LEN],
    /// Authentication tag for the content encryption layer.
    pub auth_tag: [u8; TAG_LEN],
}

impl EncryptedBundle {
    /// Encodes the bundle for a serialization boundary, base64 per field.
    #[must_use]
    pub fn encode(&self) -> EncodedBundle {
        EncodedBundle {
            ciphertext: BASE64.encode(&self.ciphertext),
            content_nonce: BASE64.encode(self.content_nonce),
            wrapped_key: BASE64.encode(&self.wrapped_key),
            key_nonce: BASE64.encode(self.key_nonce),
            auth_tag: BASE64.encode(self.auth_tag),
        }
    }

    /// Decodes a bundle read back from storage.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DecryptionFailed`] if any field is not valid
    /// base64 or a fixed-size field has the wrong decoded length.
    pub fn decode(encoded: &EncodedBundle) -> Result<Self> {
        let ciphertext = decode_field(&encoded.ciphertext)?;
        let wrapped_key = decode_field(&encoded.wrapped_key)?;
        let content_nonce = decode_array::<NONCE_LEN>(&encoded.content_nonce)?;
        let key_nonce = decode_array::<NONCE_LEN>(&encoded.key_nonce)?;
        let auth_tag = decode_array::<TAG_LEN>(&encoded.auth_tag)?;

        Ok(Self {
            ciphertext,
            content_nonce,
            wrapped_key,
            key_nonce,
            auth_tag,
        })
    }
}

impl std::fmt::Debug for EncryptedBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedBundle")
            .field("ciphertext_len", &self.ciphertext.len())
            .field("wrapped_key_len", &self.wrapped_key.len())
            .finish()
    }
}

/// An [`EncryptedBundle`] with every field base64-encoded, the form that
/// crosses storage and wire boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedBundle {
    /// Base64 content ciphertext.
    pub ciphertext: String,
    /// Base64 content nonce (12 bytes decoded).
    pub content_nonce: String,
    /// Base64 wrapped data-encryption key.
    pub wrapped_key: String,
    /// Base64 key-wrap nonce (12 bytes decoded).
    pub key_nonce: String,
    /// Base64 content authentication tag (16 bytes decoded).
    pub auth_tag: String,
}

fn decode_field(value: &str) -> Result<Vec<u8>> {
    BASE64.decode(value).map_err(|_| Error::DecryptionFailed)
}

fn decode_array<const N: usize>(value: &str) -> Result<[u8; N]> {
    let bytes = decode_field(value)?;
    bytes.try_into().map_err(|_| Error::DecryptionFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bundle() -> EncryptedBundle {
        EncryptedBundle {
            ciphertext: vec![1, 2, 3, 4, 5],
            content_nonce: [7u8; NONCE_LEN],
            wrapped_key: vec![9u8; 48],
            key_nonce: [11u8; NONCE_LEN],
            auth_tag: [13u8; TAG_LEN],
        }
    }

    #[test]
    fn encode_decode_roundtrip() {
        let bundle = sample_bundle();
        let decoded = EncryptedBundle::decode(&bundle.encode()).expect("decode");
        assert_eq!(decoded, bundle);
    }

    #[test]
    fn encoded_bundle_survives_json() {
        let encoded = sample_bundle().encode();

        let json = serde_json::to_string(&encoded).expect("serialize");
        let restored: EncodedBundle = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(encoded, restored);
        let decoded = EncryptedBundle::decode(&restored).expect("decode");
        assert_eq!(decoded, sample_bundle());
    }

    #[test]
    fn malformed_base64_is_a_decryption_failure() {
        let mut encoded = sample_bundle().encode();
        encoded.ciphertext = "not!!valid@@base64".to_string();

        let result = EncryptedBundle::decode(&encoded);
        assert!(matches!(result, Err(Error::DecryptionFailed)));
    }

    #[test]
    fn wrong_length_nonce_is_a_decryption_failure() {
        let mut encoded = sample_bundle().encode();
        // Valid base64, but decodes to 4 bytes rather than 12.
        encoded.content_nonce = BASE64.encode([0u8; 4]);

        let result = EncryptedBundle::decode(&encoded);
        assert!(matches!(result, Err(Error::DecryptionFailed)));
    }

    #[test]
    fn wrong_length_tag_is_a_decryption_failure() {
        let mut encoded = sample_bundle().encode();
        encoded.auth_tag = BASE64.encode([0u8; 8]);

        let result = EncryptedBundle::decode(&encoded);
        assert!(matches!(result, Err(Error::DecryptionFailed)));
    }

    #[test]
    fn every_field_is_checked() {
        for field in 0..5 {
            let mut encoded = sample_bundle().encode();
            let target = match field {
                0 => &mut encoded.ciphertext,
                1 => &mut encoded.content_nonce,
                2 => &mut encoded.wrapped_key,
                3 => &mut encoded.key_nonce,
                _ => &mut encoded.auth_tag,
            };
            *target = "%%%".to_string();

            assert!(
                matches!(EncryptedBundle::decode(&encoded), Err(Error::DecryptionFailed)),
                "field {field} accepted malformed base64"
            );
        }
    }

    #[test]
    fn bundle_debug_prints_lengths_only() {
        let bundle = sample_bundle();
        let debug = format!("{bundle:?}");

        assert!(debug.contains("ciphertext_len"));
        assert!(debug.contains("wrapped_key_len"));
        assert!(!debug.contains("[1, 2, 3"));
    }
}
