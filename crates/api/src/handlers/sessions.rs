//! Handlers for the `/sessions` resource.

use axum::extract::{Path, State};
use axum::Json;
use scribe_core::repository::SessionPatch;
use scribe_core::types::DbId;
use scribe_pipeline::SessionUpdate;
use serde::{Deserialize, Deserializer};

use crate::error::AppResult;
use crate::handlers::run_detached;
use crate::middleware::context::AccountContext;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PATCH /sessions/{id}`.
///
/// An absent field is left untouched; an explicit `null` clears it.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateSessionRequest {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub transcript: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub note: Option<Option<String>>,
}

impl From<UpdateSessionRequest> for SessionPatch {
    fn from(req: UpdateSessionRequest) -> Self {
        Self {
            title: req.title,
            transcript: req.transcript,
            note: req.note,
        }
    }
}

/// Distinguish a present `null` from an absent field.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// PATCH /api/v1/sessions/{id}
///
/// Update title, transcript or note. A changed transcript or note deletes
/// the session's artifacts and its client's artifacts.
pub async fn update_session(
    State(state): State<AppState>,
    AccountContext(ctx): AccountContext,
    Path(session_id): Path<DbId>,
    Json(body): Json<UpdateSessionRequest>,
) -> AppResult<Json<DataResponse<SessionUpdate>>> {
    let patch = SessionPatch::from(body);

    let service = state.service.clone();
    let update =
        run_detached(async move { service.update_session(&ctx, session_id, &patch).await })
            .await?;
    Ok(Json(DataResponse { data: update }))
}
