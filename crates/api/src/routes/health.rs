use std::time::Instant;

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Liveness payload. The endpoint always answers 200; `status` says whether
/// the store behind the artifact cache is reachable.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Round trip of the store ping.
    pub db_latency_ms: u64,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let started = Instant::now();
    let ping = state.health.ping().await;
    let db_latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    if let Err(e) = &ping {
        tracing::warn!(error = %e, db_latency_ms, "Store unreachable");
    }
    let db_healthy = ping.is_ok();

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        db_latency_ms,
    })
}

/// `GET /health`, mounted at the root and reachable without a token.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
