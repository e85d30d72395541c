//! Dependency manifest inference.
//!
//! A manifest declares packages, not secrets. A fixed table maps known
//! packages to the credential names their SDKs conventionally require,
//! and those names are surfaced as value-less candidates so the user
//! knows what the project will want configured. Unknown packages are
//! silently ignored — this is best-effort inference, not an inventory.

use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;

use crate::error::{Result, ScanError};
use crate::types::{CandidateSecret, SourceKind};

/// Known package → required credential names.
///
/// Extend by adding rows; lookups are exact package-name matches.
const PACKAGE_CREDENTIALS: &[(&str, &[&str])] = &[
    ("@anthropic-ai/sdk", &["ANTHROPIC_API_KEY"]),
    ("@aws-sdk/client-s3", &["AWS_ACCESS_KEY_ID", "AWS_SECRET_ACCESS_KEY"]),
    ("@sendgrid/mail", &["SENDGRID_API_KEY"]),
    ("@sentry/node", &["SENTRY_DSN"]),
    ("@supabase/supabase-js", &["SUPABASE_URL", "SUPABASE_ANON_KEY"]),
    ("aws-sdk", &["AWS_ACCESS_KEY_ID", "AWS_SECRET_ACCESS_KEY"]),
    ("firebase-admin", &["FIREBASE_PROJECT_ID", "FIREBASE_PRIVATE_KEY"]),
    ("ioredis", &["REDIS_URL"]),
    ("mongodb", &["MONGODB_URI"]),
    ("mongoose", &["MONGODB_URI"]),
    ("mysql2", &["DATABASE_URL"]),
    ("nodemailer", &["SMTP_HOST", "SMTP_USER", "SMTP_PASSWORD"]),
    ("openai", &["OPENAI_API_KEY"]),
    ("pg", &["DATABASE_URL"]),
    ("redis", &["REDIS_URL"]),
    ("resend", &["RESEND_API_KEY"]),
    ("stripe", &["STRIPE_SECRET_KEY", "STRIPE_PUBLISHABLE_KEY"]),
    ("twilio", &["TWILIO_ACCOUNT_SID", "TWILIO_AUTH_TOKEN"]),
];

/// The subset of a package manifest the scanner cares about.
///
/// `BTreeMap` keeps package iteration deterministic regardless of the
/// order keys appear in the JSON document.
#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    dependencies: BTreeMap<String, String>,
    #[serde(default, rename = "devDependencies")]
    dev_dependencies: BTreeMap<String, String>,
}

/// Infers credential-name candidates from manifest `content`.
///
/// # Errors
///
/// Returns [`ScanError::Parse`] if the manifest is not valid JSON. The
/// caller treats this as a per-file failure, not a scan abort.
pub fn parse(path: &str, content: &str) -> Result<Vec<CandidateSecret>> {
    let manifest: Manifest = serde_json::from_str(content).map_err(|e| ScanError::Parse {
        file: path.to_string(),
        reason: e.to_string(),
    })?;

    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    let packages = manifest
        .dependencies
        .keys()
        .chain(manifest.dev_dependencies.keys());

    for package in packages {
        let Some(&(_, credentials)) = PACKAGE_CREDENTIALS
            .iter()
            .find(|(name, _)| name == package)
        else {
            continue;
        };

        for &credential in credentials {
            if seen.insert(credential) {
                candidates.push(CandidateSecret::name_only(
                    credential,
                    path,
                    SourceKind::DependencyManifest,
                ));
            }
        }
    }

    tracing::debug!(
        file = path,
        inferred = candidates.len(),
        "inferred credentials from manifest"
    );

    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(content: &str) -> Vec<String> {
        parse("package.json", content)
            .expect("parse")
            .into_iter()
            .map(|c| c.key_name)
            .collect()
    }

    #[test]
    fn known_packages_map_to_credentials() {
        let content = r#"{
            "name": "web-app",
            "dependencies": {
                "stripe": "^14.0.0",
                "next": "15.0.0"
            }
        }"#;

        assert_eq!(names(content), vec!["STRIPE_SECRET_KEY", "STRIPE_PUBLISHABLE_KEY"]);
    }

    #[test]
    fn dev_dependencies_are_scanned_too() {
        let content = r#"{
            "dependencies": {},
            "devDependencies": { "@sentry/node": "^8.0.0" }
        }"#;

        assert_eq!(names(content), vec!["SENTRY_DSN"]);
    }

    #[test]
    fn unknown_packages_silently_ignored() {
        let content = r#"{
            "dependencies": {
                "react": "^19.0.0",
                "left-pad": "1.3.0"
            }
        }"#;

        assert!(names(content).is_empty());
    }

    #[test]
    fn shared_credentials_deduplicated() {
        // pg and mysql2 both imply DATABASE_URL.
        let content = r#"{
            "dependencies": { "mysql2": "^3.0.0", "pg": "^8.0.0" }
        }"#;

        assert_eq!(names(content), vec!["DATABASE_URL"]);
    }

    #[test]
    fn package_order_in_json_does_not_matter() {
        let a = r#"{"dependencies": {"twilio": "1", "stripe": "1"}}"#;
        let b = r#"{"dependencies": {"stripe": "1", "twilio": "1"}}"#;

        assert_eq!(names(a), names(b));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let result = parse("package.json", "{ not json");
        assert!(matches!(result, Err(ScanError::Parse { .. })));
    }

    #[test]
    fn missing_dependency_sections_are_fine() {
        assert!(names(r#"{"name": "bare"}"#).is_empty());
    }

    #[test]
    fn candidates_are_name_only() {
        let candidates =
            parse("package.json", r#"{"dependencies": {"openai": "^4.0.0"}}"#).expect("parse");

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].key_name, "OPENAI_API_KEY");
        assert!(candidates[0].value.is_none());
        assert_eq!(candidates[0].source_kind, SourceKind::DependencyManifest);
    }

    #[test]
    fn inference_table_names_are_valid_key_names() {
        use crate::types::is_valid_key_name;

        for (package, credentials) in PACKAGE_CREDENTIALS {
            for credential in *credentials {
                assert!(
                    is_valid_key_name(credential),
                    "{package} maps to invalid key name {credential}"
                );
            }
        }
    }
}
