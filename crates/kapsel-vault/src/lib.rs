//! # Kapsel Vault
//!
//! Zero-knowledge envelope encryption for Kapsel:
//!
//! - **Two-layer encryption**: every secret is encrypted under a fresh
//!   random data-encryption key (DEK); the DEK is wrapped under a
//!   key-encryption key (KEK) derived from the user's passphrase.
//! - **Passphrase-derived keys**: PBKDF2-HMAC-SHA256 with a 600,000
//!   iteration work factor; the server never holds the KEK.
//! - **AES-256-GCM**: authenticated encryption with random 96-bit nonces
//!   and explicit 128-bit tags.
//! - **Oracle-resistant errors**: all decryption failures are a single
//!   undifferentiated [`Error::DecryptionFailed`].
//!
//! ## Example
//!
//! ```rust
//! use kapsel_vault::{generate_salt, TokenVault};
//!
//! # fn example() -> kapsel_vault::Result<()> {
//! let vault = TokenVault::new();
//! let salt = generate_salt();
//!
//! let bundle = vault.wrap("gho_oauth_token", "user passphrase", &salt)?;
//!
//! // The encoded form is what storage sees: base64 fields, no key.
//! let stored = bundle.encode();
//!
//! let token = vault.unwrap(&kapsel_vault::EncryptedBundle::decode(&stored)?,
//!                          "user passphrase", &salt)?;
//! assert_eq!(token, "gho_oauth_token");
//! # Ok(())
//! # }
//! ```
//!
//! ## Security Considerations
//!
//! - Key material and recovered DEK bytes are zeroized on drop.
//! - `Debug` output for keys and bundles is redacted.
//! - Nonces come from the CSPRNG per call; they are never counters.

pub mod bundle;
pub mod cipher;
pub mod error;
pub mod kdf;
pub mod vault;

// Re-export commonly used types
pub use bundle::{EncodedBundle, EncryptedBundle};
pub use cipher::{SealedBox, NONCE_LEN, TAG_LEN};
pub use error::{Error, Result};
pub use kdf::{generate_salt, KeyDerivation, KeyMaterial, DEFAULT_ITERATIONS, KEY_LEN, SALT_LEN};
pub use vault::TokenVault;
