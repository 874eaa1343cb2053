//! Prompt lookup and session persistence against a real database.

use scribe_core::artifact::{ArtifactKey, ArtifactType, ReferenceType};
use scribe_core::content::{ContentChange, InvalidationOutcome};
use scribe_core::prompt::Provider;
use scribe_core::repository::{
    AccountRepository, ArtifactRepository, ClientRepository, PromptRepository, SessionPatch,
    SessionRepository,
};
use scribe_db::PgStore;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Fixture {
    account_id: i64,
    client_id: i64,
    session_id: i64,
}

async fn seed(pool: &PgPool) -> Fixture {
    let (approach_id,): (i64,) = sqlx::query_as(
        "INSERT INTO therapeutic_approaches (title) VALUES ('Cognitive Behavioral Therapy') \
         RETURNING id",
    )
    .fetch_one(pool)
    .await
    .unwrap();
    let (account_id,): (i64,) = sqlx::query_as(
        "INSERT INTO accounts (email, language, primary_therapeutic_approach_id) \
         VALUES ('therapist@example.com', 'de', $1) RETURNING id",
    )
    .bind(approach_id)
    .fetch_one(pool)
    .await
    .unwrap();
    let (client_id,): (i64,) = sqlx::query_as(
        "INSERT INTO clients (account_id, name, description) \
         VALUES ($1, 'C1', 'Anxious in social settings') RETURNING id",
    )
    .bind(account_id)
    .fetch_one(pool)
    .await
    .unwrap();
    let (session_id,): (i64,) = sqlx::query_as(
        "INSERT INTO sessions (account_id, client_id, title, note) \
         VALUES ($1, $2, 'First session', 'Intake') RETURNING id",
    )
    .bind(account_id)
    .bind(client_id)
    .fetch_one(pool)
    .await
    .unwrap();

    Fixture {
        account_id,
        client_id,
        session_id,
    }
}

// ---------------------------------------------------------------------------
// Prompts
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_seeded_prompts_resolve_for_every_artifact_type(pool: PgPool) {
    let store = PgStore::new(pool);
    for artifact_type in ArtifactType::ALL {
        let template = store
            .find_active_by_artifact_type(artifact_type)
            .await
            .unwrap()
            .unwrap_or_else(|| panic!("no active prompt for {artifact_type}"));
        assert_eq!(template.artifact_type, Some(artifact_type));
        assert!(template.active);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_inactive_prompt_is_not_returned(pool: PgPool) {
    sqlx::query("UPDATE prompts SET active = false WHERE name = 'session_title'")
        .execute(&pool)
        .await
        .unwrap();
    let store = PgStore::new(pool);

    assert!(store.find_active_by_name("session_title").await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_new_active_version_replaces_old(pool: PgPool) {
    sqlx::query("UPDATE prompts SET active = false WHERE artifact_type = 'client_bio'")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query(
        "INSERT INTO prompts (artifact_type, version, template, provider, model) \
         VALUES ('client_bio', 2, 'v2 {{client_info}}', 'google', 'gemini-2.5-flash')",
    )
    .execute(&pool)
    .await
    .unwrap();
    let store = PgStore::new(pool);

    let template = store
        .find_active_by_artifact_type(ArtifactType::ClientBio)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(template.version, 2);
    assert_eq!(template.provider, Provider::Google);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_second_active_prompt_for_same_type_is_rejected(pool: PgPool) {
    let result = sqlx::query(
        "INSERT INTO prompts (artifact_type, template, provider, model) \
         VALUES ('client_bio', 'dup', 'openai', 'gpt-4o')",
    )
    .execute(&pool)
    .await;

    let err = result.unwrap_err();
    let db_err = err.as_database_error().expect("database error");
    assert_eq!(db_err.constraint(), Some("uq_prompts_active_artifact_type"));
}

// ---------------------------------------------------------------------------
// Sessions, clients, accounts
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_account_profile_includes_approach_title(pool: PgPool) {
    let fx = seed(&pool).await;
    let store = PgStore::new(pool);

    let profile = store.find_profile(fx.account_id).await.unwrap().unwrap();
    assert_eq!(profile.language.as_deref(), Some("de"));
    assert_eq!(
        profile.primary_therapeutic_approach.as_deref(),
        Some("Cognitive Behavioral Therapy")
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_lookups_are_tenant_scoped(pool: PgPool) {
    let fx = seed(&pool).await;
    let store = PgStore::new(pool);
    let other_account = fx.account_id + 1000;

    assert!(ClientRepository::find(&store, other_account, fx.client_id)
        .await
        .unwrap()
        .is_none());
    assert!(SessionRepository::find(&store, other_account, fx.session_id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_writes_transcript_and_keeps_untouched_fields(pool: PgPool) {
    let fx = seed(&pool).await;
    let store = PgStore::new(pool);

    let patch = SessionPatch {
        transcript: Some(Some("Client talked about work.".to_string())),
        ..Default::default()
    };
    let updated = SessionRepository::update(&store, fx.account_id, fx.session_id, &patch)
        .await
        .unwrap()
        .unwrap()
        .session;

    assert_eq!(updated.transcript.as_deref(), Some("Client talked about work."));
    assert_eq!(updated.title.as_deref(), Some("First session"));
    assert_eq!(updated.note.as_deref(), Some("Intake"));

    let clear_note = SessionPatch {
        note: Some(None),
        ..Default::default()
    };
    let cleared = SessionRepository::update(&store, fx.account_id, fx.session_id, &clear_note)
        .await
        .unwrap()
        .unwrap()
        .session;
    assert_eq!(cleared.note, None);
    assert_eq!(cleared.transcript.as_deref(), Some("Client talked about work."));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_of_foreign_session_returns_none(pool: PgPool) {
    let fx = seed(&pool).await;
    let store = PgStore::new(pool.clone());

    let patch = SessionPatch {
        transcript: Some(Some("injected".to_string())),
        ..Default::default()
    };
    let result = SessionRepository::update(&store, fx.account_id + 1000, fx.session_id, &patch)
        .await
        .unwrap();
    assert!(result.is_none());

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM transcripts")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

fn transcript_patch(value: &str) -> SessionPatch {
    SessionPatch {
        transcript: Some(Some(value.to_string())),
        ..Default::default()
    }
}

async fn seed_artifacts(store: &PgStore, fx: &Fixture) -> (ArtifactKey, ArtifactKey) {
    let note = ArtifactKey::new(
        fx.session_id,
        ReferenceType::Session,
        ArtifactType::SessionProgressNote,
        "de",
    )
    .unwrap();
    let bio =
        ArtifactKey::new(fx.client_id, ReferenceType::Client, ArtifactType::ClientBio, "de")
            .unwrap();
    ArtifactRepository::upsert(store, &note, "note").await.unwrap();
    ArtifactRepository::upsert(store, &bio, "bio").await.unwrap();
    (note, bio)
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_content_change_deletes_artifacts_in_same_update(pool: PgPool) {
    let fx = seed(&pool).await;
    let store = PgStore::new(pool);
    let (note, bio) = seed_artifacts(&store, &fx).await;

    let update =
        SessionRepository::update(&store, fx.account_id, fx.session_id, &transcript_patch("new"))
            .await
            .unwrap()
            .unwrap();

    assert_eq!(update.invalidation.change, ContentChange::ContentChanged);
    assert_eq!(update.invalidation.session_artifacts_deleted, 1);
    assert_eq!(update.invalidation.client_artifacts_deleted, 1);
    assert!(ArtifactRepository::find(&store, &note).await.unwrap().is_none());
    assert!(ArtifactRepository::find(&store, &bio).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_title_edit_keeps_artifacts(pool: PgPool) {
    let fx = seed(&pool).await;
    let store = PgStore::new(pool);
    let (note, _bio) = seed_artifacts(&store, &fx).await;
    let patch = SessionPatch {
        title: Some(Some("Renamed".to_string())),
        note: Some(Some("  Intake ".to_string())),
        ..Default::default()
    };

    let update = SessionRepository::update(&store, fx.account_id, fx.session_id, &patch)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(update.invalidation, InvalidationOutcome::unchanged());
    assert_eq!(update.session.title.as_deref(), Some("Renamed"));
    assert!(ArtifactRepository::find(&store, &note).await.unwrap().is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_failed_artifact_delete_rolls_back_session_write(pool: PgPool) {
    let fx = seed(&pool).await;
    let store = PgStore::new(pool.clone());
    let (note, _bio) = seed_artifacts(&store, &fx).await;
    sqlx::raw_sql(
        "CREATE FUNCTION reject_artifact_delete() RETURNS trigger AS $$ \
         BEGIN RAISE EXCEPTION 'artifact delete rejected'; END; $$ LANGUAGE plpgsql; \
         CREATE TRIGGER trg_reject_artifact_delete BEFORE DELETE ON artifacts \
         FOR EACH ROW EXECUTE FUNCTION reject_artifact_delete();",
    )
    .execute(&pool)
    .await
    .unwrap();

    let result =
        SessionRepository::update(&store, fx.account_id, fx.session_id, &transcript_patch("new"))
            .await;
    assert!(result.is_err());

    let session = SessionRepository::find(&store, fx.account_id, fx.session_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.transcript, None);
    assert!(ArtifactRepository::find(&store, &note).await.unwrap().is_some());

    sqlx::query("DROP TRIGGER trg_reject_artifact_delete ON artifacts")
        .execute(&pool)
        .await
        .unwrap();
    let retry =
        SessionRepository::update(&store, fx.account_id, fx.session_id, &transcript_patch("new"))
            .await
            .unwrap()
            .unwrap();
    assert_eq!(retry.invalidation.change, ContentChange::ContentChanged);
    assert!(ArtifactRepository::find(&store, &note).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_updates_see_each_others_writes(pool: PgPool) {
    let fx = seed(&pool).await;
    let store = PgStore::new(pool);
    SessionRepository::update(&store, fx.account_id, fx.session_id, &transcript_patch("X"))
        .await
        .unwrap()
        .unwrap();

    let handles = ["X", "Y"].map(|value| {
        let store = store.clone();
        let (account_id, session_id) = (fx.account_id, fx.session_id);
        tokio::spawn(async move {
            SessionRepository::update(&store, account_id, session_id, &transcript_patch(value))
                .await
                .unwrap()
                .unwrap()
        })
    });
    let mut changes = 0;
    for handle in handles {
        if handle.await.unwrap().invalidation.change.is_changed() {
            changes += 1;
        }
    }

    let last = SessionRepository::find(&store, fx.account_id, fx.session_id)
        .await
        .unwrap()
        .unwrap()
        .transcript;
    let expected = if last.as_deref() == Some("X") { 2 } else { 1 };
    assert_eq!(changes, expected, "final transcript {last:?}");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_for_client_returns_oldest_first(pool: PgPool) {
    let fx = seed(&pool).await;
    sqlx::query(
        "UPDATE sessions SET session_date = NOW() - INTERVAL '7 days' WHERE id = $1",
    )
    .bind(fx.session_id)
    .execute(&pool)
    .await
    .unwrap();
    let (later_id,): (i64,) = sqlx::query_as(
        "INSERT INTO sessions (account_id, client_id, title, session_date) \
         VALUES ($1, $2, 'Second session', NOW()) RETURNING id",
    )
    .bind(fx.account_id)
    .bind(fx.client_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    let store = PgStore::new(pool);

    let sessions = store
        .list_for_client(fx.account_id, fx.client_id)
        .await
        .unwrap();
    let ids: Vec<i64> = sessions.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![fx.session_id, later_id]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_health_check(pool: PgPool) {
    scribe_db::health_check(&pool).await.unwrap();
}
