//! Route definitions for named prompts.

use axum::routing::post;
use axum::Router;

use crate::handlers::prompts;
use crate::state::AppState;

/// Routes mounted at `/prompts`.
///
/// ```text
/// POST   /{name}/generate    -> generate
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{name}/generate", post(prompts::generate))
}
