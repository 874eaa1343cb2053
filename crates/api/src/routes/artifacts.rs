//! Route definitions for the `/artifacts` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::artifacts;
use crate::state::AppState;

/// Routes mounted at `/artifacts`.
///
/// ```text
/// DELETE /{reference_type}/{reference_id}                    -> invalidate_artifacts
/// GET    /{reference_type}/{reference_id}/{type}             -> get_artifact (?language, ?cached_only)
/// POST   /{reference_type}/{reference_id}/{type}/regenerate  -> regenerate_artifact (?language)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{reference_type}/{reference_id}",
            delete(artifacts::invalidate_artifacts),
        )
        .route(
            "/{reference_type}/{reference_id}/{artifact_type}",
            get(artifacts::get_artifact),
        )
        .route(
            "/{reference_type}/{reference_id}/{artifact_type}/regenerate",
            post(artifacts::regenerate_artifact),
        )
}
