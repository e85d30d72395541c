//! # Kapsel Scan
//!
//! Credential discovery for Kapsel. Given a set of fetched repository
//! files, the scanner surfaces credential-shaped keys from three kinds
//! of source:
//!
//! - **Environment files**: `KEY=value` pairs, values included.
//! - **Pipeline definitions**: `${{ secrets.NAME }}` references — names
//!   only, the values live with the CI platform.
//! - **Dependency manifests**: known packages imply the credential names
//!   their SDKs require (a payments SDK implies its secret and
//!   publishable keys) — names only.
//!
//! ## Example
//!
//! ```rust
//! use kapsel_scan::{CredentialScanner, ScannedFile, SourceKind};
//!
//! let scanner = CredentialScanner::new();
//! let candidates = scanner.scan(&[
//!     ScannedFile::new(".env", "DATABASE_URL=postgres://localhost/app\n", SourceKind::EnvFile),
//! ]);
//!
//! assert_eq!(candidates.len(), 1);
//! assert_eq!(candidates[0].key_name, "DATABASE_URL");
//! ```
//!
//! Parsing is tolerant by design: a malformed file yields zero
//! candidates and the scan continues — discovery is best-effort, never
//! a gate.

pub mod env_file;
pub mod error;
pub mod manifest;
pub mod pipeline;
pub mod scanner;
pub mod types;

// Re-export commonly used types
pub use error::{Result, ScanError};
pub use scanner::CredentialScanner;
pub use types::{is_valid_key_name, CandidateSecret, ScannedFile, SecretString, SourceKind};
