//! HTTP tests for `POST /api/v1/prompts/{name}/generate`.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, post_json, ACCOUNT_ID};
use serde_json::json;

#[tokio::test]
async fn named_prompt_generates_with_caller_variables() {
    let app = build_test_app();
    let token = app.token(ACCOUNT_ID);

    let response = post_json(
        app.app(),
        "/api/v1/prompts/session_title/generate",
        &token,
        json!({ "variables": { "session_transcript": "We talked about insomnia." } }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "session_title");
    assert_eq!(json["data"]["language"], "en");
    assert_eq!(json["data"]["content"], "Sleep troubles");
    assert!(json["data"]["total_tokens"].as_u64().unwrap() > 0);
    assert!(app
        .mock
        .last_prompt()
        .unwrap()
        .contains("We talked about insomnia."));
}

#[tokio::test]
async fn named_generation_is_not_cached() {
    let app = build_test_app();
    let token = app.token(ACCOUNT_ID);
    let uri = "/api/v1/prompts/session_title/generate";

    post_json(app.app(), uri, &token, json!({})).await;
    post_json(app.app(), uri, &token, json!({})).await;

    assert_eq!(app.mock.call_count(), 2);
    assert_eq!(app.store.artifact_count(), 0);
}

#[tokio::test]
async fn unknown_name_is_prompt_not_found() {
    let app = build_test_app();
    let token = app.token(ACCOUNT_ID);

    let response = post_json(
        app.app(),
        "/api/v1/prompts/session_summary/generate",
        &token,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "PROMPT_NOT_FOUND");
    assert_eq!(app.mock.call_count(), 0);
}

#[tokio::test]
async fn malformed_name_is_400() {
    let app = build_test_app();
    let token = app.token(ACCOUNT_ID);

    let response = post_json(
        app.app(),
        "/api/v1/prompts/Session-Title/generate",
        &token,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}
