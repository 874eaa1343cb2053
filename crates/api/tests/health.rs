//! HTTP tests for the root health endpoint and router-level behavior.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{body_json, build_test_app};
use tower::ServiceExt;

async fn get_health(app: &common::TestApp) -> axum::response::Response {
    app.app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap()
}

#[tokio::test]
async fn health_reports_ok_without_auth() {
    let app = build_test_app();

    let response = get_health(&app).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["db_healthy"], true);
    assert!(json["version"].is_string());
    assert!(json["db_latency_ms"].is_u64());
}

#[tokio::test]
async fn health_reports_degraded_when_store_is_down() {
    let app = build_test_app();
    app.store.set_healthy(false);

    let response = get_health(&app).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["db_healthy"], false);
}

#[tokio::test]
async fn unknown_route_is_404() {
    let app = build_test_app();

    let response = app
        .app()
        .oneshot(Request::get("/api/v1/nothing").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn request_id_is_generated_and_propagated() {
    let app = build_test_app();

    let response = get_health(&app).await;
    assert!(response.headers().contains_key("x-request-id"));

    let response = app
        .app()
        .oneshot(
            Request::get("/health")
                .header("x-request-id", "req-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-123");
}

#[tokio::test]
async fn cors_preflight_allows_configured_origin() {
    let app = build_test_app();

    let response = app
        .app()
        .oneshot(
            Request::options("/api/v1/sessions/5")
                .header("origin", "http://localhost:5173")
                .header("access-control-request-method", "PATCH")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://localhost:5173"
    );
}
