//! The sync orchestrator.
//!
//! Drives one import run through its states:
//!
//! ```text
//! Idle → Scanning → Resolving → Persisting → Finalized(status)
//! ```
//!
//! Scanning fetches candidate files from the linked repository and hands
//! them to the credential scanner. Resolving takes one snapshot of the
//! existing key names and classifies every unique candidate against it —
//! the snapshot is never refreshed mid-run, so an import happening
//! during Persisting cannot reclassify a later decision in the same run.
//! Persisting re-encrypts each accepted value through the vault before
//! handing it to storage; plaintext never reaches the persistence
//! boundary. Every persist attempt is independent: one failure is
//! counted and the run moves on.
//!
//! A preview run stops after Resolving and returns the decisions with
//! nothing written — same inputs, identical classification.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use kapsel_scan::{CredentialScanner, ScannedFile, SecretString, SourceKind};
use kapsel_vault::TokenVault;

use crate::collaborators::{FileFetcher, SecretStore, SyncLogStore};
use crate::error::{Result, SyncError};
use crate::resolver;
use crate::types::{SourceMetadata, SyncAction, SyncDecision, SyncLog, SyncRequest, SyncStatus};

/// File names probed for env-file sources.
pub const ENV_FILE_PATHS: &[&str] = &[".env", ".env.local", ".env.development", ".env.production"];

/// File names probed for pipeline-definition sources.
pub const PIPELINE_PATHS: &[&str] = &[
    ".github/workflows/ci.yml",
    ".github/workflows/deploy.yml",
    ".github/workflows/main.yml",
    ".gitlab-ci.yml",
];

/// File names probed for dependency-manifest sources.
pub const MANIFEST_PATHS: &[&str] = &["package.json"];

/// Scan order is fixed regardless of request ordering: env files first
/// so their values win first-occurrence deduplication over name-only
/// pipeline references and manifest inference.
const SCAN_ORDER: &[SourceKind] = &[
    SourceKind::EnvFile,
    SourceKind::PipelineDefinition,
    SourceKind::DependencyManifest,
];

/// Returns the candidate file names for a source kind.
#[must_use]
pub fn candidate_paths(kind: SourceKind) -> &'static [&'static str] {
    match kind {
        SourceKind::EnvFile => ENV_FILE_PATHS,
        SourceKind::PipelineDefinition => PIPELINE_PATHS,
        SourceKind::DependencyManifest => MANIFEST_PATHS,
    }
}

/// Cancels a sync run.
///
/// Abort is observed once, just before Persisting begins: a run aborted
/// earlier finishes with nothing written. Once Persisting has started
/// the run completes; secrets already persisted stay persisted.
#[derive(Debug, Clone, Default)]
pub struct AbortHandle {
    aborted: Arc<AtomicBool>,
}

impl AbortHandle {
    /// Creates a fresh handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    /// Returns true if cancellation was requested.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }
}

/// The result of one sync run.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    /// Per-key decisions, in resolution order.
    pub decisions: Vec<SyncDecision>,
    /// The finalized audit log. `None` for preview runs, which write
    /// nothing and therefore have nothing to audit.
    pub log: Option<SyncLog>,
}

/// Drives the end-to-end import flow.
pub struct SyncOrchestrator {
    fetcher: Arc<dyn FileFetcher>,
    store: Arc<dyn SecretStore>,
    log_store: Arc<dyn SyncLogStore>,
    vault: TokenVault,
    scanner: CredentialScanner,
    owner: String,
    repo: String,
    abort: AbortHandle,
}

impl SyncOrchestrator {
    /// Creates an orchestrator for one linked repository.
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn FileFetcher>,
        store: Arc<dyn SecretStore>,
        log_store: Arc<dyn SyncLogStore>,
        vault: TokenVault,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            store,
            log_store,
            vault,
            scanner: CredentialScanner::new(),
            owner: owner.into(),
            repo: repo.into(),
            abort: AbortHandle::new(),
        }
    }

    /// Returns a handle that can cancel this orchestrator's next run
    /// before it starts persisting.
    #[must_use]
    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    /// Executes one sync run.
    ///
    /// The session passphrase and the user's stored salt are passed
    /// explicitly for the duration of the call; nothing is cached here.
    ///
    /// # Errors
    ///
    /// Fatal errors only: invalid configuration, a failed existing-key
    /// query, a failed log append, abort, or a salt of the wrong length.
    /// Per-file and per-secret failures are recorded in the returned
    /// decisions and log instead.
    pub async fn run(
        &self,
        request: &SyncRequest,
        passphrase: &str,
        salt: &[u8],
    ) -> Result<SyncOutcome> {
        request.validate()?;
        if salt.len() != kapsel_vault::SALT_LEN {
            return Err(SyncError::InvalidConfiguration {
                reason: format!(
                    "salt must be {} bytes, got {}",
                    kapsel_vault::SALT_LEN,
                    salt.len()
                ),
            });
        }

        let log = SyncLog::begin();
        tracing::info!(
            run = %log.id,
            scope = %request.scope,
            strategy = %request.strategy,
            preview = request.preview_only,
            "starting sync run"
        );

        // Scanning
        let (files, fetched_paths, all_fetches_failed) = self.fetch_sources(request).await;

        if all_fetches_failed {
            tracing::warn!(run = %log.id, "every file fetch failed; repository token may be revoked");
            let log = log.finalize(
                0,
                0,
                0,
                Vec::new(),
                Some("every file fetch failed; the repository token may be revoked".to_string()),
            );
            self.log_store.append(&log).await?;
            return Ok(SyncOutcome {
                decisions: Vec::new(),
                log: Some(log),
            });
        }

        let candidates = self.scanner.scan(&files);
        tracing::debug!(run = %log.id, candidates = candidates.len(), "scan complete");

        // Resolving — the snapshot is taken exactly once.
        let existing = self.store.list_key_names(&request.scope).await?;
        let mut decisions = resolver::resolve(&candidates, &existing, request.strategy);
        let values: Vec<Option<SecretString>> = resolver::dedup_candidates(&candidates)
            .into_iter()
            .map(|c| c.value.clone())
            .collect();

        if request.preview_only {
            tracing::info!(run = %log.id, decisions = decisions.len(), "preview complete");
            return Ok(SyncOutcome {
                decisions,
                log: None,
            });
        }

        if self.abort.is_aborted() {
            tracing::info!(run = %log.id, "aborted before persisting; nothing written");
            return Err(SyncError::Aborted);
        }

        // Persisting
        let (imported, skipped, failed) = self
            .persist_decisions(request, &mut decisions, values, passphrase, salt)
            .await?;

        // Finalized
        let status = SyncStatus::from_counts(imported, failed);
        let error_message = match status {
            SyncStatus::Success => None,
            SyncStatus::Partial => Some(format!(
                "{failed} of {} import attempts failed",
                imported + failed
            )),
            SyncStatus::Failed => Some(if candidates.is_empty() {
                "no credentials discovered".to_string()
            } else if failed > 0 {
                "all import attempts failed".to_string()
            } else {
                "nothing to import".to_string()
            }),
        };

        let log = log.finalize(imported, skipped, failed, fetched_paths, error_message);
        self.log_store.append(&log).await?;

        tracing::info!(
            run = %log.id,
            status = %log.status,
            imported,
            skipped,
            failed,
            "sync run finalized"
        );

        Ok(SyncOutcome {
            decisions,
            log: Some(log),
        })
    }

    /// Fetches every candidate file for the selected source kinds.
    ///
    /// Returns the fetched files, the paths actually read, and whether
    /// every attempted fetch failed at the transport level.
    async fn fetch_sources(&self, request: &SyncRequest) -> (Vec<ScannedFile>, Vec<String>, bool) {
        let mut files = Vec::new();
        let mut fetched_paths = Vec::new();
        let mut attempted = 0usize;
        let mut fetch_errors = 0usize;

        for &kind in SCAN_ORDER {
            if !request.sources.contains(&kind) {
                continue;
            }

            for &path in candidate_paths(kind) {
                attempted += 1;
                match self.fetcher.fetch(&self.owner, &self.repo, path).await {
                    Ok(Some(content)) => {
                        fetched_paths.push(path.to_string());
                        files.push(ScannedFile::new(path, content, kind));
                    }
                    Ok(None) => {
                        tracing::trace!(path, "file not present in repository");
                    }
                    Err(e) => {
                        // A transport failure is not a missing file; it
                        // only degrades this path, not the run.
                        tracing::warn!(path, error = %e, "file fetch failed");
                        fetch_errors += 1;
                    }
                }
            }
        }

        let all_failed = attempted > 0 && fetch_errors == attempted;
        (files, fetched_paths, all_failed)
    }

    /// Persists every accepted decision, independently.
    async fn persist_decisions(
        &self,
        request: &SyncRequest,
        decisions: &mut [SyncDecision],
        values: Vec<Option<SecretString>>,
        passphrase: &str,
        salt: &[u8],
    ) -> Result<(u32, u32, u32)> {
        let mut imported = 0u32;
        let mut skipped = 0u32;
        let mut failed = 0u32;

        for (decision, value) in decisions.iter_mut().zip(values) {
            match decision.action {
                SyncAction::Skip => {
                    skipped += 1;
                }
                SyncAction::Import | SyncAction::RenameAndImport => {
                    let Some(value) = value else {
                        // Pipeline references and manifest inference have
                        // no value to store; they are informational.
                        decision.action = SyncAction::Skip;
                        decision.failure_reason =
                            Some("no value discovered; configure this key manually".to_string());
                        skipped += 1;
                        continue;
                    };

                    let bundle = match self.vault.wrap(value.expose(), passphrase, salt) {
                        Ok(bundle) => bundle,
                        Err(e @ kapsel_vault::Error::InvalidSalt { .. }) => {
                            return Err(e.into());
                        }
                        Err(e) => {
                            tracing::warn!(key = decision.key_name, error = %e, "encryption failed");
                            decision.failure_reason = Some(e.to_string());
                            failed += 1;
                            continue;
                        }
                    };

                    let metadata = SourceMetadata {
                        source_file: decision.source_file.clone(),
                        source_kind: decision.source_kind,
                    };

                    match self
                        .store
                        .persist(&request.scope, &decision.key_name, &bundle.encode(), &metadata)
                        .await
                    {
                        Ok(id) => {
                            tracing::debug!(key = decision.key_name, secret_id = %id, "persisted secret");
                            decision.resulting_secret_id = Some(id);
                            imported += 1;
                        }
                        Err(e) => {
                            tracing::warn!(key = decision.key_name, error = %e, "persist failed");
                            decision.failure_reason = Some(e.to_string());
                            failed += 1;
                        }
                    }
                }
            }
        }

        Ok((imported, skipped, failed))
    }
}

impl std::fmt::Debug for SyncOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncOrchestrator")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .finish()
    }
}
