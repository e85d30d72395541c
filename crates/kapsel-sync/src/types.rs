//! Core types for the sync pipeline.
//!
//! - [`CollisionStrategy`]: what to do when a discovered key already exists
//! - [`SyncDecision`]: the per-key outcome of collision resolution
//! - [`SyncLog`]: the immutable audit record of one sync run
//! - [`SyncRequest`]: the caller-supplied configuration for a run

use std::fmt;

use chrono::{DateTime, Utc};
use kapsel_scan::SourceKind;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, SyncError};

/// Identifier of a persisted secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecretId(Uuid);

impl SecretId {
    /// Creates a new random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SecretId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SecretId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an appended sync log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogId(Uuid);

impl LogId {
    /// Creates a new random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LogId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The storage scope a sync run targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SyncScope {
    /// The project the secrets belong to.
    pub project_id: String,
    /// The environment within the project.
    pub environment_id: String,
}

impl SyncScope {
    /// Creates a scope.
    #[must_use]
    pub fn new(project_id: impl Into<String>, environment_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            environment_id: environment_id.into(),
        }
    }
}

impl fmt::Display for SyncScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.project_id, self.environment_id)
    }
}

/// Where a persisted secret was discovered, recorded alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// Path of the document the secret came from.
    pub source_file: String,
    /// The kind of document that was.
    pub source_kind: SourceKind,
}

/// How to resolve a discovered key that already exists in the target
/// scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionStrategy {
    /// Leave the existing secret untouched; skip the candidate.
    Skip,
    /// Import anyway; the caller treats the persist as an update.
    Overwrite,
    /// Import under a renamed key, leaving the existing secret intact.
    Rename,
}

impl fmt::Display for CollisionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => write!(f, "skip"),
            Self::Overwrite => write!(f, "overwrite"),
            Self::Rename => write!(f, "rename"),
        }
    }
}

/// The action chosen for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncAction {
    /// Persist the candidate.
    Import,
    /// Do not persist the candidate.
    Skip,
    /// Persist the candidate under a renamed key.
    RenameAndImport,
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Import => write!(f, "import"),
            Self::Skip => write!(f, "skip"),
            Self::RenameAndImport => write!(f, "rename-and-import"),
        }
    }
}

/// The outcome of collision resolution (and, after a persisting run,
/// persistence) for one unique candidate key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncDecision {
    /// The key the decision applies to. For `RenameAndImport` this is
    /// the renamed key.
    pub key_name: String,
    /// The document the candidate was discovered in.
    pub source_file: String,
    /// The kind of document that was.
    pub source_kind: SourceKind,
    /// Whether the originally discovered key already existed in the
    /// target scope at snapshot time.
    pub exists_already: bool,
    /// The resolved action.
    pub action: SyncAction,
    /// The persisted secret's id; populated only after a successful
    /// persist.
    pub resulting_secret_id: Option<SecretId>,
    /// Why the candidate was skipped or failed, when it was.
    pub failure_reason: Option<String>,
}

/// Overall status of a finalized sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncStatus {
    /// Every attempted import succeeded and at least one happened.
    Success,
    /// Some imports succeeded, some failed.
    Partial,
    /// Nothing was imported.
    Failed,
}

impl SyncStatus {
    /// Computes the run status from its counts.
    #[must_use]
    pub fn from_counts(imported: u32, failed: u32) -> Self {
        match (imported, failed) {
            (0, _) => Self::Failed,
            (_, 0) => Self::Success,
            _ => Self::Partial,
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Partial => write!(f, "partial"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// The immutable audit record of one sync run.
///
/// Created provisionally when a run starts and finalized exactly once
/// when the run completes; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncLog {
    /// Unique id of this run.
    pub id: LogId,
    /// Overall outcome.
    pub status: SyncStatus,
    /// Number of secrets successfully persisted.
    pub imported: u32,
    /// Number of candidates skipped.
    pub skipped: u32,
    /// Number of persist attempts that failed.
    pub failed: u32,
    /// Source files actually read, in fetch order.
    pub imported_files: Vec<String>,
    /// Present only when `status` is not [`SyncStatus::Success`].
    pub error_message: Option<String>,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finalized.
    pub finished_at: Option<DateTime<Utc>>,
}

impl SyncLog {
    /// Opens a provisional log at the start of a run.
    #[must_use]
    pub fn begin() -> Self {
        Self {
            id: LogId::new(),
            status: SyncStatus::Failed,
            imported: 0,
            skipped: 0,
            failed: 0,
            imported_files: Vec::new(),
            error_message: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Finalizes the log with the run's counts and read files.
    ///
    /// Status is derived from the counts; `error_message` is dropped if
    /// the derived status is success.
    #[must_use]
    pub fn finalize(
        mut self,
        imported: u32,
        skipped: u32,
        failed: u32,
        imported_files: Vec<String>,
        error_message: Option<String>,
    ) -> Self {
        let status = SyncStatus::from_counts(imported, failed);

        self.status = status;
        self.imported = imported;
        self.skipped = skipped;
        self.failed = failed;
        self.imported_files = imported_files;
        self.error_message = if status == SyncStatus::Success {
            None
        } else {
            error_message
        };
        self.finished_at = Some(Utc::now());
        self
    }
}

/// Caller-supplied configuration for one sync run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRequest {
    /// Which source kinds to scan. Must be non-empty and free of
    /// duplicates.
    pub sources: Vec<SourceKind>,
    /// How to handle discovered keys that already exist.
    pub strategy: CollisionStrategy,
    /// The storage scope to import into.
    pub scope: SyncScope,
    /// When set, the run stops after resolution and persists nothing.
    pub preview_only: bool,
}

impl SyncRequest {
    /// Creates a persisting request.
    #[must_use]
    pub fn new(sources: Vec<SourceKind>, strategy: CollisionStrategy, scope: SyncScope) -> Self {
        Self {
            sources,
            strategy,
            scope,
            preview_only: false,
        }
    }

    /// Switches the request to preview mode.
    #[must_use]
    pub fn preview(mut self) -> Self {
        self.preview_only = true;
        self
    }

    /// Validates the request.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidConfiguration`] if `sources` is empty
    /// or contains duplicates.
    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(SyncError::InvalidConfiguration {
                reason: "sources must not be empty".to_string(),
            });
        }

        let mut seen = std::collections::HashSet::new();
        for source in &self.sources {
            if !seen.insert(source) {
                return Err(SyncError::InvalidConfiguration {
                    reason: format!("duplicate source kind: {source}"),
                });
            }
        }

        Ok(())
    }
}
