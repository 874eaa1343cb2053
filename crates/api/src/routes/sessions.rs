//! Route definitions for the `/sessions` resource.

use axum::routing::patch;
use axum::Router;

use crate::handlers::sessions;
use crate::state::AppState;

/// Routes mounted at `/sessions`.
///
/// ```text
/// PATCH  /{id}    -> update_session
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", patch(sessions::update_session))
}
