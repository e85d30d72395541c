//! # Kapsel Sync
//!
//! The secret import pipeline for Kapsel. One sync run scans a linked
//! repository for credential-shaped keys, classifies each against the
//! secrets already stored in the target scope, re-encrypts every
//! accepted value through the envelope vault, and persists the result —
//! leaving an immutable audit log either way.
//!
//! ```text
//! Idle → Scanning → Resolving → Persisting → Finalized(status)
//! ```
//!
//! The pipeline touches the outside world only through three traits —
//! [`FileFetcher`], [`SecretStore`], [`SyncLogStore`] — so the
//! surrounding application supplies transport and storage while this
//! crate owns the semantics: snapshot-isolated collision resolution,
//! per-item failure containment, and the guarantee that plaintext never
//! crosses the persistence boundary.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use kapsel_scan::SourceKind;
//! use kapsel_sync::{
//!     CollisionStrategy, InMemoryFileFetcher, InMemorySecretStore, InMemorySyncLogStore,
//!     SyncOrchestrator, SyncRequest, SyncScope,
//! };
//! use kapsel_vault::{generate_salt, TokenVault};
//!
//! # async fn example() -> kapsel_sync::Result<()> {
//! let fetcher = Arc::new(InMemoryFileFetcher::new());
//! fetcher.insert(".env", "API_KEY=abc123\n");
//!
//! let orchestrator = SyncOrchestrator::new(
//!     fetcher,
//!     Arc::new(InMemorySecretStore::new()),
//!     Arc::new(InMemorySyncLogStore::new()),
//!     TokenVault::new(),
//!     "acme",
//!     "web-app",
//! );
//!
//! let request = SyncRequest::new(
//!     vec![SourceKind::EnvFile],
//!     CollisionStrategy::Skip,
//!     SyncScope::new("project-1", "development"),
//! );
//!
//! let salt = generate_salt();
//! let outcome = orchestrator.run(&request, "session passphrase", &salt).await?;
//! assert!(outcome.log.is_some());
//! # Ok(())
//! # }
//! ```

pub mod collaborators;
pub mod error;
pub mod orchestrator;
pub mod resolver;
pub mod token;
pub mod types;

// Re-export commonly used types
pub use collaborators::{
    FileFetcher, InMemoryFileFetcher, InMemorySecretStore, InMemorySyncLogStore, SecretStore,
    StoredSecret, SyncLogStore,
};
pub use error::{Result, SyncError};
pub use orchestrator::{
    candidate_paths, AbortHandle, SyncOrchestrator, SyncOutcome, ENV_FILE_PATHS, MANIFEST_PATHS,
    PIPELINE_PATHS,
};
pub use resolver::{dedup_candidates, resolve, RENAME_SUFFIX};
pub use token::{BearerTokenSource, VaultTokenSource};
pub use types::{
    CollisionStrategy, LogId, SecretId, SourceMetadata, SyncAction, SyncDecision, SyncLog,
    SyncRequest, SyncScope, SyncStatus,
};
