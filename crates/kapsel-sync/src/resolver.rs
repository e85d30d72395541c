//! Collision resolution.
//!
//! A pure function over the candidate list, a snapshot of existing key
//! names, and the caller-chosen strategy. No I/O and no side effects, so
//! a preview run and a persisting run with the same inputs classify
//! identically.

use std::collections::HashSet;

use kapsel_scan::CandidateSecret;

use crate::types::{CollisionStrategy, SyncAction, SyncDecision};

/// Suffix appended to a colliding key under the rename strategy.
pub const RENAME_SUFFIX: &str = "_IMPORTED";

/// Deduplicates candidates by key name, first occurrence wins.
///
/// Order is stable: the surviving candidate for each key keeps its
/// position from the input list. Callers that want environment files to
/// shadow manifest inference simply scan them first.
#[must_use]
pub fn dedup_candidates(candidates: &[CandidateSecret]) -> Vec<&CandidateSecret> {
    let mut seen = HashSet::new();
    candidates
        .iter()
        .filter(|c| seen.insert(c.key_name.as_str()))
        .collect()
}

/// Classifies each unique candidate against the existing-key snapshot.
///
/// The returned decisions align one-to-one, in order, with
/// [`dedup_candidates`] of the same input — the orchestrator relies on
/// that alignment to find each decision's plaintext value.
#[must_use]
pub fn resolve(
    candidates: &[CandidateSecret],
    existing: &HashSet<String>,
    strategy: CollisionStrategy,
) -> Vec<SyncDecision> {
    dedup_candidates(candidates)
        .into_iter()
        .map(|candidate| decide(candidate, existing, strategy))
        .collect()
}

fn decide(
    candidate: &CandidateSecret,
    existing: &HashSet<String>,
    strategy: CollisionStrategy,
) -> SyncDecision {
    let exists_already = existing.contains(&candidate.key_name);

    let mut decision = SyncDecision {
        key_name: candidate.key_name.clone(),
        source_file: candidate.source_file.clone(),
        source_kind: candidate.source_kind,
        exists_already,
        action: SyncAction::Import,
        resulting_secret_id: None,
        failure_reason: None,
    };

    if !exists_already {
        return decision;
    }

    match strategy {
        CollisionStrategy::Skip => {
            decision.action = SyncAction::Skip;
        }
        // Classification only; the caller is responsible for treating
        // the persist as an update rather than an insert.
        CollisionStrategy::Overwrite => {
            decision.action = SyncAction::Import;
        }
        CollisionStrategy::Rename => {
            let renamed = format!("{}{RENAME_SUFFIX}", candidate.key_name);
            if existing.contains(&renamed) {
                decision.action = SyncAction::Skip;
                decision.failure_reason =
                    Some(format!("rename target {renamed} also collides"));
            } else {
                decision.key_name = renamed;
                decision.action = SyncAction::RenameAndImport;
            }
        }
    }

    decision
}
