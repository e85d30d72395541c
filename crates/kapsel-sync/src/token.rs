//! Bearer token access for the repository fetcher.
//!
//! The linked repository is read with an OAuth token that is itself
//! stored as an [`EncryptedBundle`] — the fetch pipeline cannot run
//! without the encryption core. [`VaultTokenSource`] unwraps the stored
//! bundle on demand with the caller's session passphrase; nothing is
//! cached, and the passphrase lives only as long as the source does.

use kapsel_scan::SecretString;
use kapsel_vault::{EncryptedBundle, TokenVault};

use crate::error::Result;

/// Supplies the decrypted access token the file fetcher authenticates
/// with.
pub trait BearerTokenSource: Send + Sync {
    /// Returns the plaintext bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SyncError::Vault`] if the stored token cannot be
    /// decrypted (wrong passphrase, tampered bundle).
    fn bearer_token(&self) -> Result<String>;
}

/// Token source backed by an encrypted bundle in the vault.
pub struct VaultTokenSource {
    vault: TokenVault,
    bundle: EncryptedBundle,
    passphrase: SecretString,
    salt: Vec<u8>,
}

impl VaultTokenSource {
    /// Creates a token source for one session.
    #[must_use]
    pub fn new(
        vault: TokenVault,
        bundle: EncryptedBundle,
        passphrase: impl Into<String>,
        salt: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            vault,
            bundle,
            passphrase: SecretString::new(passphrase),
            salt: salt.into(),
        }
    }
}

impl BearerTokenSource for VaultTokenSource {
    fn bearer_token(&self) -> Result<String> {
        let token = self
            .vault
            .unwrap(&self.bundle, self.passphrase.expose(), &self.salt)?;
        Ok(token)
    }
}

impl std::fmt::Debug for VaultTokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultTokenSource")
            .field("passphrase", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use kapsel_vault::{generate_salt, KeyDerivation};
    use std::num::NonZeroU32;

    fn fast_vault() -> TokenVault {
        TokenVault::with_kdf(KeyDerivation::with_iterations(
            NonZeroU32::new(1_000).expect("non-zero"),
        ))
    }

    #[test]
    fn unwraps_stored_token() {
        let vault = fast_vault();
        let salt = generate_salt();
        let bundle = vault
            .wrap("gho_repo_access", "session passphrase", &salt)
            .expect("wrap");

        let source = VaultTokenSource::new(vault, bundle, "session passphrase", salt.to_vec());

        assert_eq!(source.bearer_token().expect("token"), "gho_repo_access");
    }

    #[test]
    fn wrong_passphrase_surfaces_as_vault_error() {
        let vault = fast_vault();
        let salt = generate_salt();
        let bundle = vault
            .wrap("gho_repo_access", "right passphrase", &salt)
            .expect("wrap");

        let source = VaultTokenSource::new(vault, bundle, "wrong passphrase", salt.to_vec());

        assert!(matches!(
            source.bearer_token(),
            Err(SyncError::Vault(kapsel_vault::Error::DecryptionFailed))
        ));
    }

    #[test]
    fn debug_redacts_passphrase() {
        let vault = fast_vault();
        let salt = generate_salt();
        let bundle = vault.wrap("token", "passphrase", &salt).expect("wrap");

        let source = VaultTokenSource::new(vault, bundle, "passphrase", salt.to_vec());
        let debug = format!("{source:?}");

        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("passphrase\": \"passphrase"));
    }
}
