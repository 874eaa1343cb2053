pub mod artifacts;
pub mod health;
pub mod prompts;
pub mod sessions;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /artifacts/{reference_type}/{reference_id}                     invalidate (DELETE)
/// /artifacts/{reference_type}/{reference_id}/{type}              get or generate
/// /artifacts/{reference_type}/{reference_id}/{type}/regenerate   regenerate (POST)
///
/// /sessions/{id}                                                 update (PATCH)
///
/// /prompts/{name}/generate                                       named generation (POST)
/// ```
///
/// Every route requires a Bearer token.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/artifacts", artifacts::router())
        .nest("/sessions", sessions::router())
        .nest("/prompts", prompts::router())
}
