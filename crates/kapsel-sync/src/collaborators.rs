//! Collaborator interfaces consumed by the sync pipeline.
//!
//! The orchestrator talks to the outside world — the linked repository,
//! the secret store, the audit log — exclusively through these traits.
//! Concrete implementations live with the surrounding application; the
//! in-memory implementations here back tests and doc examples.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;

use kapsel_vault::EncodedBundle;
use parking_lot::RwLock;

use crate::error::{Result, SyncError};
use crate::types::{LogId, SecretId, SourceMetadata, SyncLog, SyncScope};

/// Fetches file contents from the linked repository.
pub trait FileFetcher: Send + Sync {
    /// Fetches one file by path.
    ///
    /// `Ok(None)` means the file does not exist — an ordinary outcome,
    /// not an error. `Err` means the fetch itself failed (network,
    /// authorization) and is worth distinguishing in logs: repeated
    /// failures can indicate a revoked token.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::FetchFailed`] on a transport-level failure.
    fn fetch<'a>(
        &'a self,
        owner: &'a str,
        repo: &'a str,
        path: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<String>>> + Send + 'a>>;
}

/// The secret storage the pipeline imports into.
pub trait SecretStore: Send + Sync {
    /// Lists the key names currently stored in `scope`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ListFailed`] if the query fails.
    fn list_key_names<'a>(
        &'a self,
        scope: &'a SyncScope,
    ) -> Pin<Box<dyn Future<Output = Result<HashSet<String>>> + Send + 'a>>;

    /// Persists one encrypted secret, inserting or updating by key name.
    ///
    /// Only ever receives an [`EncodedBundle`] — plaintext never crosses
    /// this boundary.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::PersistFailed`] if the write is rejected.
    fn persist<'a>(
        &'a self,
        scope: &'a SyncScope,
        key_name: &'a str,
        bundle: &'a EncodedBundle,
        metadata: &'a SourceMetadata,
    ) -> Pin<Box<dyn Future<Output = Result<SecretId>> + Send + 'a>>;
}

/// Append-only storage for sync run audit records.
pub trait SyncLogStore: Send + Sync {
    /// Appends a finalized log.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::LogAppendFailed`] if the append fails.
    fn append<'a>(
        &'a self,
        log: &'a SyncLog,
    ) -> Pin<Box<dyn Future<Output = Result<LogId>> + Send + 'a>>;
}

// ---------------------------------------------------------------------------
// In-memory implementations
// ---------------------------------------------------------------------------

/// In-memory file fetcher for tests, keyed by path.
///
/// Paths registered with [`InMemoryFileFetcher::fail_path`] return a
/// fetch error instead of content, simulating transport failures.
#[derive(Debug, Default)]
pub struct InMemoryFileFetcher {
    files: RwLock<HashMap<String, String>>,
    failing: RwLock<HashSet<String>>,
}

impl InMemoryFileFetcher {
    /// Creates an empty fetcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a file.
    pub fn insert(&self, path: impl Into<String>, content: impl Into<String>) {
        self.files.write().insert(path.into(), content.into());
    }

    /// Makes fetches of `path` fail with a transport error.
    pub fn fail_path(&self, path: impl Into<String>) {
        self.failing.write().insert(path.into());
    }
}

impl FileFetcher for InMemoryFileFetcher {
    fn fetch<'a>(
        &'a self,
        _owner: &'a str,
        _repo: &'a str,
        path: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<String>>> + Send + 'a>> {
        Box::pin(async move {
            if self.failing.read().contains(path) {
                return Err(SyncError::FetchFailed {
                    path: path.to_string(),
                    reason: "simulated transport failure".to_string(),
                });
            }
            Ok(self.files.read().get(path).cloned())
        })
    }
}

/// One stored secret row.
#[derive(Debug, Clone)]
pub struct StoredSecret {
    /// The row id.
    pub id: SecretId,
    /// The encrypted bundle as persisted.
    pub bundle: EncodedBundle,
    /// Discovery provenance.
    pub metadata: SourceMetadata,
}

/// In-memory secret store for tests.
#[derive(Debug, Default)]
pub struct InMemorySecretStore {
    rows: RwLock<HashMap<SyncScope, HashMap<String, StoredSecret>>>,
    failing_keys: RwLock<HashSet<String>>,
}

impl InMemorySecretStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeds a key name so it shows up in the collision snapshot.
    pub fn seed_key(&self, scope: &SyncScope, key_name: impl Into<String>) {
        let bundle = EncodedBundle {
            ciphertext: String::new(),
            content_nonce: String::new(),
            wrapped_key: String::new(),
            key_nonce: String::new(),
            auth_tag: String::new(),
        };
        self.rows.write().entry(scope.clone()).or_default().insert(
            key_name.into(),
            StoredSecret {
                id: SecretId::new(),
                bundle,
                metadata: SourceMetadata {
                    source_file: "seed".to_string(),
                    source_kind: kapsel_scan::SourceKind::EnvFile,
                },
            },
        );
    }

    /// Makes persists of `key_name` fail.
    pub fn fail_key(&self, key_name: impl Into<String>) {
        self.failing_keys.write().insert(key_name.into());
    }

    /// Returns a stored row for inspection.
    #[must_use]
    pub fn get(&self, scope: &SyncScope, key_name: &str) -> Option<StoredSecret> {
        self.rows
            .read()
            .get(scope)
            .and_then(|keys| keys.get(key_name))
            .cloned()
    }

    /// Number of secrets stored in `scope`.
    #[must_use]
    pub fn len(&self, scope: &SyncScope) -> usize {
        self.rows.read().get(scope).map_or(0, HashMap::len)
    }

    /// Returns true if nothing is stored in `scope`.
    #[must_use]
    pub fn is_empty(&self, scope: &SyncScope) -> bool {
        self.len(scope) == 0
    }
}

impl SecretStore for InMemorySecretStore {
    fn list_key_names<'a>(
        &'a self,
        scope: &'a SyncScope,
    ) -> Pin<Box<dyn Future<Output = Result<HashSet<String>>> + Send + 'a>> {
        Box::pin(async move {
            Ok(self
                .rows
                .read()
                .get(scope)
                .map(|keys| keys.keys().cloned().collect())
                .unwrap_or_default())
        })
    }

    fn persist<'a>(
        &'a self,
        scope: &'a SyncScope,
        key_name: &'a str,
        bundle: &'a EncodedBundle,
        metadata: &'a SourceMetadata,
    ) -> Pin<Box<dyn Future<Output = Result<SecretId>> + Send + 'a>> {
        Box::pin(async move {
            if self.failing_keys.read().contains(key_name) {
                return Err(SyncError::PersistFailed {
                    key_name: key_name.to_string(),
                    reason: "simulated storage rejection".to_string(),
                });
            }

            let id = SecretId::new();
            self.rows.write().entry(scope.clone()).or_default().insert(
                key_name.to_string(),
                StoredSecret {
                    id,
                    bundle: bundle.clone(),
                    metadata: metadata.clone(),
                },
            );
            Ok(id)
        })
    }
}

/// In-memory sync log store for tests.
#[derive(Debug, Default)]
pub struct InMemorySyncLogStore {
    logs: RwLock<Vec<SyncLog>>,
}

impl InMemorySyncLogStore {
    /// Creates an empty log store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all appended logs, oldest first.
    #[must_use]
    pub fn logs(&self) -> Vec<SyncLog> {
        self.logs.read().clone()
    }

    /// Number of appended logs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.logs.read().len()
    }

    /// Returns true if no logs have been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SyncLogStore for InMemorySyncLogStore {
    fn append<'a>(
        &'a self,
        log: &'a SyncLog,
    ) -> Pin<Box<dyn Future<Output = Result<LogId>> + Send + 'a>> {
        Box::pin(async move {
            self.logs.write().push(log.clone());
            Ok(log.id)
        })
    }
}
