//! Shared helpers for HTTP-level tests.
//!
//! The app is built with [`build_app_router`] over in-memory stores and the
//! mock provider, so every test runs the production middleware stack without
//! a database or network.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use scribe_api::auth::jwt::{Claims, JwtConfig};
use scribe_api::config::ServerConfig;
use scribe_api::router::build_app_router;
use scribe_api::state::AppState;
use scribe_core::artifact::ArtifactType;
use scribe_core::prompt::PromptSource;
use scribe_llm::providers::MockProvider;
use scribe_llm::GenerationClient;
use scribe_pipeline::memory::{prompt, MemoryStore};
use scribe_pipeline::{ArtifactService, Stores};
use tower::ServiceExt;

pub const ACCOUNT_ID: i64 = 10;
pub const OTHER_ACCOUNT_ID: i64 = 20;
pub const CLIENT_ID: i64 = 1;
pub const SESSION_ID: i64 = 5;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            issuer: None,
            leeway_secs: 0,
        },
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub mock: Arc<MockProvider>,
    pub config: ServerConfig,
}

impl TestApp {
    /// A valid Bearer token for `account_id`.
    pub fn token(&self, account_id: i64) -> String {
        mint_token(account_id, &self.config.jwt)
    }

    /// A fresh router handle (`oneshot` consumes it).
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

/// Sign a fifteen-minute HS256 token the way the identity service does.
pub fn mint_token(account_id: i64, jwt: &JwtConfig) -> String {
    let iat = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: account_id,
        exp: iat + 15 * 60,
        iat,
        iss: jwt.issuer.clone(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt.secret.as_bytes()),
    )
    .unwrap()
}

/// Seeded world: one therapist account (English, CBT) owning client C1 with
/// session 5, a French account owning nothing, and templates for `client_bio`,
/// `session_progress_note` and `name:session_title`.
pub fn build_test_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    store.seed_account(ACCOUNT_ID, Some("en"), Some("Cognitive Behavioral Therapy"));
    store.seed_account(OTHER_ACCOUNT_ID, Some("fr"), None);
    store.seed_client(ACCOUNT_ID, CLIENT_ID, "C1", Some("Works night shifts"));
    store.seed_session(
        ACCOUNT_ID,
        CLIENT_ID,
        SESSION_ID,
        Some("I can't sleep."),
        Some("Insomnia"),
    );
    store.insert_prompt(prompt(
        PromptSource::ArtifactType(ArtifactType::ClientBio),
        "Write a bio in {{language}}.\n{{client_info}}",
    ));
    store.insert_prompt(prompt(
        PromptSource::ArtifactType(ArtifactType::SessionProgressNote),
        "Progress note in {{language}}.\n{{session_transcript}}\n{{session_note}}",
    ));
    store.insert_prompt(prompt(
        PromptSource::Name("session_title".into()),
        "Title for:\n{{session_transcript}}",
    ));

    let mock = Arc::new(
        MockProvider::new()
            .with_response("artifact_type:client_bio", "Bio text")
            .with_response("name:session_title", "Sleep troubles"),
    );
    let llm = Arc::new(GenerationClient::single(mock.clone()));
    let service = ArtifactService::new(Stores::shared(store.clone()), llm);

    let config = test_config();
    let state = AppState {
        service: Arc::new(service),
        health: store.clone(),
        config: Arc::new(config.clone()),
    };

    TestApp {
        router: build_app_router(state, &config),
        store,
        mock,
        config,
    }
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Send a request with an optional Bearer token and JSON body.
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn patch_json(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn delete(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}
