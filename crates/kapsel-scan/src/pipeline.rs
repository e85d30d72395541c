//! CI pipeline definition scanning.
//!
//! Pipeline secrets are managed by the CI platform, so only the *names*
//! referenced by the workflow are surfaced — never a value. References
//! use the `${{ secrets.NAME }}` syntax with arbitrary inner whitespace.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{CandidateSecret, SourceKind};

/// Matches `${{ secrets.NAME }}` references.
static SECRET_REF_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{\{\s*secrets\.([A-Z_][A-Z0-9_]*)\s*\}\}")
        .unwrap_or_else(|_| unreachable!())
});

/// Extracts referenced secret names from pipeline `content`.
///
/// Names are deduplicated within the file, first occurrence first.
#[must_use]
pub fn parse(path: &str, content: &str) -> Vec<CandidateSecret> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for capture in SECRET_REF_REGEX.captures_iter(content) {
        let Some(name) = capture.get(1) else {
            continue;
        };
        let name = name.as_str();

        if seen.insert(name.to_string()) {
            candidates.push(CandidateSecret::name_only(
                name,
                path,
                SourceKind::PipelineDefinition,
            ));
        }
    }

    candidates
}
