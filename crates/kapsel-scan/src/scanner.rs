//! The credential scanner.
//!
//! Dispatches each fetched file to the parser for its source kind and
//! concatenates the results in input order. A file that fails to parse
//! contributes zero candidates and does not stop the scan.

use crate::types::{CandidateSecret, ScannedFile, SourceKind};
use crate::{env_file, manifest, pipeline};

/// Scans fetched files for credential-shaped keys.
///
/// Stateless: scanning the same inputs always yields the same candidate
/// list, in the same order. Downstream deduplication is
/// first-occurrence-wins, so callers control priority by file order
/// (environment files before manifest inference, for example).
#[derive(Debug, Clone, Copy, Default)]
pub struct CredentialScanner;

impl CredentialScanner {
    /// Creates a scanner.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Scans `files` and returns all discovered candidates.
    #[must_use]
    pub fn scan(&self, files: &[ScannedFile]) -> Vec<CandidateSecret> {
        let mut candidates = Vec::new();

        for file in files {
            let found = match file.kind {
                SourceKind::EnvFile => env_file::parse(&file.path, &file.content),
                SourceKind::PipelineDefinition => pipeline::parse(&file.path, &file.content),
                SourceKind::DependencyManifest => {
                    match manifest::parse(&file.path, &file.content) {
                        Ok(found) => found,
                        Err(e) => {
                            tracing::warn!(file = file.path, error = %e, "skipping unparseable file");
                            Vec::new()
                        }
                    }
                }
            };

            tracing::debug!(file = file.path, kind = %file.kind, count = found.len(), "scanned file");
            candidates.extend(found);
        }

        candidates
    }
}
