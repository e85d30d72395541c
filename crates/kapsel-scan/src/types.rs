//! Core types for credential discovery.
//!
//! - [`SourceKind`]: which kind of document a candidate came from
//! - [`ScannedFile`]: one fetched file handed to the scanner
//! - [`CandidateSecret`]: a discovered credential-shaped key
//! - [`SecretString`]: a plaintext secret value that zeroizes on drop

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Pattern every candidate key name must match: upper-case letters,
/// digits and underscores, not starting with a digit.
static KEY_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z_][A-Z0-9_]*$").unwrap_or_else(|_| unreachable!()));

/// Returns true if `name` is a valid candidate key name.
#[must_use]
pub fn is_valid_key_name(name: &str) -> bool {
    KEY_NAME_REGEX.is_match(name)
}

/// The kind of source document a candidate was discovered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// A dotenv-style `KEY=value` file.
    EnvFile,
    /// A CI pipeline definition referencing managed secrets.
    PipelineDefinition,
    /// A dependency manifest whose packages imply credential names.
    DependencyManifest,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnvFile => write!(f, "environment-file"),
            Self::PipelineDefinition => write!(f, "pipeline-definition"),
            Self::DependencyManifest => write!(f, "dependency-manifest"),
        }
    }
}

/// One fetched file, ready to be scanned.
#[derive(Debug, Clone)]
pub struct ScannedFile {
    /// Path of the file within the repository.
    pub path: String,
    /// Raw file contents.
    pub content: String,
    /// How the file should be parsed.
    pub kind: SourceKind,
}

impl ScannedFile {
    /// Creates a scanned-file record.
    #[must_use]
    pub fn new(path: impl Into<String>, content: impl Into<String>, kind: SourceKind) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            kind,
        }
    }
}

/// A plaintext secret value that securely zeroizes memory on drop.
///
/// Debug output never shows the value, and equality is constant-time.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretString(String);

impl SecretString {
    /// Wraps a plaintext secret value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Exposes the plaintext value.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns true if the value is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SecretString").field(&"[REDACTED]").finish()
    }
}

impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        use subtle::ConstantTimeEq;
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl Eq for SecretString {}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A credential-shaped key discovered in a source file.
///
/// Env-file candidates carry the parsed value; pipeline and manifest
/// candidates surface only the key name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSecret {
    /// The credential key name (`[A-Z_][A-Z0-9_]*`).
    pub key_name: String,
    /// Path of the document the candidate came from.
    pub source_file: String,
    /// Which kind of document that was.
    pub source_kind: SourceKind,
    /// The plaintext value, when the source carries one.
    pub value: Option<SecretString>,
}

impl CandidateSecret {
    /// Creates a candidate with a plaintext value.
    #[must_use]
    pub fn with_value(
        key_name: impl Into<String>,
        source_file: impl Into<String>,
        source_kind: SourceKind,
        value: impl Into<String>,
    ) -> Self {
        Self {
            key_name: key_name.into(),
            source_file: source_file.into(),
            source_kind,
            value: Some(SecretString::new(value)),
        }
    }

    /// Creates a name-only candidate.
    #[must_use]
    pub fn name_only(
        key_name: impl Into<String>,
        source_file: impl Into<String>,
        source_kind: SourceKind,
    ) -> Self {
        Self {
            key_name: key_name.into(),
            source_file: source_file.into(),
            source_kind,
            value: None,
        }
    }
}
