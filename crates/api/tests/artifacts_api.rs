//! HTTP tests for `/api/v1/artifacts`.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, delete, get, post_json, send, ACCOUNT_ID, CLIENT_ID};
use scribe_core::artifact::{ArtifactKey, ArtifactType, ReferenceType};

const BIO_URI: &str = "/api/v1/artifacts/client/1/client_bio";

fn bio_key(language: &str) -> ArtifactKey {
    ArtifactKey::new(CLIENT_ID, ReferenceType::Client, ArtifactType::ClientBio, language).unwrap()
}

// ---------------------------------------------------------------------------
// Get or generate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn first_read_generates_second_read_is_cached() {
    let app = build_test_app();
    let token = app.token(ACCOUNT_ID);

    let response = get(app.app(), BIO_URI, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["content"], "Bio text");
    assert_eq!(json["data"]["language"], "en");
    assert_eq!(json["data"]["generated"], true);
    assert_eq!(json["data"]["stale"], false);

    let response = get(app.app(), BIO_URI, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["content"], "Bio text");
    assert_eq!(json["data"]["generated"], false);

    assert_eq!(app.mock.call_count(), 1);
    assert_eq!(app.store.artifact(&bio_key("en")).unwrap().content, "Bio text");
}

#[tokio::test]
async fn prompt_contains_client_info_and_language() {
    let app = build_test_app();
    let token = app.token(ACCOUNT_ID);

    let response = get(app.app(), &format!("{BIO_URI}?language=de"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["language"], "de");

    let prompt = app.mock.last_prompt().unwrap();
    assert!(prompt.contains("Write a bio in German."));
    assert!(prompt.contains("Name: C1"));
    assert!(prompt.contains("Works night shifts"));
    assert!(app.store.artifact(&bio_key("de")).is_some());
    assert!(app.store.artifact(&bio_key("en")).is_none());
}

#[tokio::test]
async fn languages_are_cached_separately() {
    let app = build_test_app();
    let token = app.token(ACCOUNT_ID);

    get(app.app(), BIO_URI, &token).await;
    get(app.app(), &format!("{BIO_URI}?language=fr"), &token).await;

    assert_eq!(app.mock.call_count(), 2);
    assert_eq!(app.store.artifact_count(), 2);
}

#[tokio::test]
async fn session_artifact_uses_transcript_and_note() {
    let app = build_test_app();
    let token = app.token(ACCOUNT_ID);

    let response = get(
        app.app(),
        "/api/v1/artifacts/session/5/session_progress_note",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let prompt = app.mock.last_prompt().unwrap();
    assert!(prompt.contains("I can't sleep."));
    assert!(prompt.contains("Insomnia"));
}

// ---------------------------------------------------------------------------
// Validation and lookup failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_artifact_type_is_400() {
    let app = build_test_app();
    let token = app.token(ACCOUNT_ID);

    let response = get(app.app(), "/api/v1/artifacts/client/1/client_poem", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    assert_eq!(app.mock.call_count(), 0);
}

#[tokio::test]
async fn artifact_type_for_wrong_reference_is_400() {
    let app = build_test_app();
    let token = app.token(ACCOUNT_ID);

    let response = get(app.app(), "/api/v1/artifacts/session/5/client_bio", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.mock.call_count(), 0);
}

#[tokio::test]
async fn malformed_language_is_400() {
    let app = build_test_app();
    let token = app.token(ACCOUNT_ID);

    let response = get(app.app(), &format!("{BIO_URI}?language=english!"), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_client_is_404() {
    let app = build_test_app();
    let token = app.token(ACCOUNT_ID);

    let response = get(app.app(), "/api/v1/artifacts/client/999/client_bio", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Client with id 999 not found");
    assert_eq!(app.mock.call_count(), 0);
}

#[tokio::test]
async fn other_accounts_client_is_404() {
    let app = build_test_app();
    let token = app.token(common::OTHER_ACCOUNT_ID);

    let response = get(app.app(), BIO_URI, &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.store.artifact_count(), 0);
}

#[tokio::test]
async fn missing_prompt_is_404_without_provider_call() {
    let app = build_test_app();
    let token = app.token(ACCOUNT_ID);

    let response = get(
        app.app(),
        "/api/v1/artifacts/client/1/client_prep_note",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "PROMPT_NOT_FOUND");
    assert_eq!(app.mock.call_count(), 0);
}

#[tokio::test]
async fn provider_failure_is_sanitized_500_and_not_persisted() {
    let app = build_test_app();
    app.mock.fail_for("artifact_type:client_bio");
    let token = app.token(ACCOUNT_ID);

    let response = get(app.app(), BIO_URI, &token).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["code"], "GENERATION_FAILED");
    assert_eq!(json["error"], "Failed to generate artifact");
    assert_eq!(app.store.artifact_count(), 0);
}

#[tokio::test]
async fn persistence_failure_still_returns_content() {
    let app = build_test_app();
    app.store.fail_artifact_writes(true);
    let token = app.token(ACCOUNT_ID);

    let response = get(app.app(), BIO_URI, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["content"], "Bio text");
    assert_eq!(app.store.artifact_count(), 0);
}

#[tokio::test]
async fn missing_token_is_401() {
    let app = build_test_app();

    let response = send(app.app(), axum::http::Method::GET, BIO_URI, None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn invalid_token_is_401() {
    let app = build_test_app();

    let response = get(app.app(), BIO_URI, "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Cached-only reads, regeneration, invalidation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cached_only_miss_is_404_and_never_generates() {
    let app = build_test_app();
    let token = app.token(ACCOUNT_ID);

    let response = get(app.app(), &format!("{BIO_URI}?cached_only=true"), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.mock.call_count(), 0);
}

#[tokio::test]
async fn cached_only_hit_returns_stored_content() {
    let app = build_test_app();
    app.store.seed_artifact(&bio_key("en"), "Stored bio");
    let token = app.token(ACCOUNT_ID);

    let response = get(app.app(), &format!("{BIO_URI}?cached_only=true"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["content"], "Stored bio");
    assert_eq!(json["data"]["generated"], false);
}

#[tokio::test]
async fn regenerate_replaces_cached_content() {
    let app = build_test_app();
    app.store.seed_artifact(&bio_key("en"), "Old bio");
    let token = app.token(ACCOUNT_ID);

    let response = post_json(
        app.app(),
        &format!("{BIO_URI}/regenerate"),
        &token,
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["content"], "Bio text");
    assert_eq!(json["data"]["generated"], true);
    assert_eq!(app.store.artifact(&bio_key("en")).unwrap().content, "Bio text");
    assert_eq!(app.mock.call_count(), 1);
}

#[tokio::test]
async fn delete_invalidates_every_language() {
    let app = build_test_app();
    app.store.seed_artifact(&bio_key("en"), "Bio");
    app.store.seed_artifact(&bio_key("de"), "Bio");
    let token = app.token(ACCOUNT_ID);

    let response = delete(app.app(), "/api/v1/artifacts/client/1", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["deleted"], 2);
    assert_eq!(app.store.artifact_count(), 0);

    // Idempotent.
    let response = delete(app.app(), "/api/v1/artifacts/client/1", &token).await;
    assert_eq!(body_json(response).await["data"]["deleted"], 0);
}

#[tokio::test]
async fn delete_for_other_accounts_reference_is_404() {
    let app = build_test_app();
    app.store.seed_artifact(&bio_key("en"), "Bio");
    let token = app.token(common::OTHER_ACCOUNT_ID);

    let response = delete(app.app(), "/api/v1/artifacts/client/1", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.store.artifact_count(), 1);
}

#[tokio::test]
async fn cached_artifact_is_not_readable_by_another_account() {
    let app = build_test_app();
    app.store.seed_artifact(&bio_key("fr"), "Private bio");
    let token = app.token(common::OTHER_ACCOUNT_ID);

    let response = get(app.app(), &format!("{BIO_URI}?cached_only=true"), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(app.app(), BIO_URI, &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.mock.call_count(), 0);
}
