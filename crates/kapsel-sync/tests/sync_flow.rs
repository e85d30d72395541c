//! End-to-end sync flow: stored OAuth token → fetch → scan → resolve →
//! re-encrypt → persist → audit log.

use std::num::NonZeroU32;
use std::sync::Arc;

use kapsel_scan::SourceKind;
use kapsel_sync::{
    BearerTokenSource, CollisionStrategy, InMemoryFileFetcher, InMemorySecretStore,
    InMemorySyncLogStore, SyncAction, SyncOrchestrator, SyncRequest, SyncScope, SyncStatus,
    VaultTokenSource,
};
use kapsel_vault::{generate_salt, EncryptedBundle, KeyDerivation, TokenVault};

const PASSPHRASE: &str = "correct horse battery staple";

fn fast_vault() -> TokenVault {
    TokenVault::with_kdf(KeyDerivation::with_iterations(
        NonZeroU32::new(1_000).expect("non-zero"),
    ))
}

#[tokio::test]
async fn full_import_flow_round_trips_through_the_vault() {
    let vault = fast_vault();
    let salt = generate_salt();

    // The linked repository's access token is itself stored as an
    // encrypted bundle; unwrapping it is the precondition for fetching.
    let token_bundle = vault
        .wrap("gho_linked_repo_token", PASSPHRASE, &salt)
        .expect("wrap token");
    let token_source =
        VaultTokenSource::new(vault, token_bundle, PASSPHRASE, salt.to_vec());
    assert_eq!(
        token_source.bearer_token().expect("token"),
        "gho_linked_repo_token"
    );

    let fetcher = Arc::new(InMemoryFileFetcher::new());
    fetcher.insert(
        ".env",
        "DATABASE_URL=postgres://user:pw@db/app\nSTRIPE_SECRET_KEY=sk_live_123\n",
    );
    fetcher.insert(
        ".github/workflows/ci.yml",
        "jobs:\n  test:\n    env:\n      TOKEN: ${{ secrets.DEPLOY_TOKEN }}\n",
    );
    fetcher.insert(
        "package.json",
        r#"{"dependencies": {"stripe": "^14.0.0", "pg": "^8.11.0"}}"#,
    );

    let store = Arc::new(InMemorySecretStore::new());
    let logs = Arc::new(InMemorySyncLogStore::new());
    let scope = SyncScope::new("project-1", "development");

    let orchestrator = SyncOrchestrator::new(
        Arc::clone(&fetcher) as Arc<dyn kapsel_sync::FileFetcher>,
        Arc::clone(&store) as Arc<dyn kapsel_sync::SecretStore>,
        Arc::clone(&logs) as Arc<dyn kapsel_sync::SyncLogStore>,
        vault,
        "acme",
        "web-app",
    );

    let request = SyncRequest::new(
        vec![
            SourceKind::EnvFile,
            SourceKind::PipelineDefinition,
            SourceKind::DependencyManifest,
        ],
        CollisionStrategy::Skip,
        scope.clone(),
    );

    let outcome = orchestrator
        .run(&request, PASSPHRASE, &salt)
        .await
        .expect("run");

    // The env-file values imported; STRIPE_SECRET_KEY from .env shadows
    // the manifest inference of the same key, and the name-only
    // candidates (DEPLOY_TOKEN, STRIPE_PUBLISHABLE_KEY, DATABASE_URL
    // from pg was shadowed by .env too) were skipped.
    let log = outcome.log.expect("log");
    assert_eq!(log.status, SyncStatus::Success);
    assert_eq!(log.imported, 2);
    assert_eq!(
        log.imported_files,
        vec![".env", ".github/workflows/ci.yml", "package.json"]
    );

    for (key, expected) in [
        ("DATABASE_URL", "postgres://user:pw@db/app"),
        ("STRIPE_SECRET_KEY", "sk_live_123"),
    ] {
        let row = store.get(&scope, key).expect("stored row");
        let bundle = EncryptedBundle::decode(&row.bundle).expect("decode");
        let plaintext = fast_vault()
            .unwrap(&bundle, PASSPHRASE, &salt)
            .expect("unwrap");
        assert_eq!(plaintext, expected, "stored value for {key}");
    }

    // Nothing stored decrypts under the wrong passphrase.
    let row = store.get(&scope, "STRIPE_SECRET_KEY").expect("stored row");
    let bundle = EncryptedBundle::decode(&row.bundle).expect("decode");
    assert!(fast_vault().unwrap(&bundle, "wrong passphrase", &salt).is_err());
}

#[tokio::test]
async fn second_run_sees_first_runs_imports_as_collisions() {
    let vault = fast_vault();
    let salt = generate_salt();

    let fetcher = Arc::new(InMemoryFileFetcher::new());
    fetcher.insert(".env", "API_KEY=first-value\n");

    let store = Arc::new(InMemorySecretStore::new());
    let logs = Arc::new(InMemorySyncLogStore::new());
    let scope = SyncScope::new("project-1", "development");

    let orchestrator = SyncOrchestrator::new(
        Arc::clone(&fetcher) as Arc<dyn kapsel_sync::FileFetcher>,
        Arc::clone(&store) as Arc<dyn kapsel_sync::SecretStore>,
        Arc::clone(&logs) as Arc<dyn kapsel_sync::SyncLogStore>,
        vault,
        "acme",
        "web-app",
    );

    let request = SyncRequest::new(
        vec![SourceKind::EnvFile],
        CollisionStrategy::Skip,
        scope.clone(),
    );

    let first = orchestrator
        .run(&request, PASSPHRASE, &salt)
        .await
        .expect("first run");
    assert_eq!(first.log.expect("log").imported, 1);

    // Within the first run API_KEY was fresh; a new run takes a new
    // snapshot and now classifies it as a collision.
    let second = orchestrator
        .run(&request, PASSPHRASE, &salt)
        .await
        .expect("second run");

    let log = second.log.expect("log");
    assert_eq!(log.imported, 0);
    assert_eq!(log.skipped, 1);
    assert_eq!(log.status, SyncStatus::Failed);

    assert_eq!(second.decisions[0].action, SyncAction::Skip);
    assert!(second.decisions[0].exists_already);

    // Both runs left audit records.
    assert_eq!(logs.len(), 2);
}
