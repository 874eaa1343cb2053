//! Handlers for the `/artifacts` resource.
//!
//! Artifacts are addressed by `(reference_type, reference_id, type,
//! language)`. A read that misses the cache generates synchronously.

use axum::extract::{Path, Query, State};
use axum::Json;
use scribe_core::artifact::{ArtifactKey, ArtifactType, ReferenceType};
use scribe_core::error::CoreError;
use scribe_core::types::DbId;
use scribe_pipeline::{ArtifactOutcome, RequestContext};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::handlers::run_detached;
use crate::middleware::context::AccountContext;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for artifact reads.
#[derive(Debug, Default, Deserialize)]
pub struct ArtifactQuery {
    /// Language code; defaults to the account language.
    pub language: Option<String>,
    /// Only return an already generated artifact; never generate.
    #[serde(default)]
    pub cached_only: bool,
}

/// Artifact payload.
#[derive(Debug, Serialize)]
pub struct ArtifactResponse {
    pub content: String,
    pub language: String,
    /// Whether this request generated the content.
    pub generated: bool,
    /// Always `false`: invalidation deletes rather than marks.
    pub stale: bool,
}

impl From<ArtifactOutcome> for ArtifactResponse {
    fn from(outcome: ArtifactOutcome) -> Self {
        Self {
            content: outcome.content,
            language: outcome.key.language,
            generated: outcome.generated,
            stale: false,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InvalidateResponse {
    pub deleted: u64,
}

/// GET /api/v1/artifacts/{reference_type}/{reference_id}/{type}
///
/// Return the cached artifact, generating it on a miss. With
/// `cached_only=true` a miss is a 404 instead.
pub async fn get_artifact(
    State(state): State<AppState>,
    AccountContext(ctx): AccountContext,
    Path((reference_type, reference_id, artifact_type)): Path<(String, DbId, String)>,
    Query(query): Query<ArtifactQuery>,
) -> AppResult<Json<DataResponse<ArtifactResponse>>> {
    let key = parse_key(&ctx, &reference_type, reference_id, &artifact_type, &query)?;

    if query.cached_only {
        let outcome = state.service.peek(&ctx, &key).await?.ok_or(AppError::Core(
            CoreError::NotFound {
                entity: "Artifact",
                id: reference_id,
            },
        ))?;
        return Ok(Json(DataResponse {
            data: outcome.into(),
        }));
    }

    let service = state.service.clone();
    let outcome = run_detached(async move { service.get_or_generate(&ctx, &key).await }).await?;
    Ok(Json(DataResponse {
        data: outcome.into(),
    }))
}

/// POST /api/v1/artifacts/{reference_type}/{reference_id}/{type}/regenerate
///
/// Discard the cached copy and generate a new one.
pub async fn regenerate_artifact(
    State(state): State<AppState>,
    AccountContext(ctx): AccountContext,
    Path((reference_type, reference_id, artifact_type)): Path<(String, DbId, String)>,
    Query(query): Query<ArtifactQuery>,
) -> AppResult<Json<DataResponse<ArtifactResponse>>> {
    let key = parse_key(&ctx, &reference_type, reference_id, &artifact_type, &query)?;

    let service = state.service.clone();
    let outcome = run_detached(async move { service.regenerate(&ctx, &key).await }).await?;
    Ok(Json(DataResponse {
        data: outcome.into(),
    }))
}

/// DELETE /api/v1/artifacts/{reference_type}/{reference_id}
///
/// Invalidate every artifact of a reference, in all languages.
pub async fn invalidate_artifacts(
    State(state): State<AppState>,
    AccountContext(ctx): AccountContext,
    Path((reference_type, reference_id)): Path<(String, DbId)>,
) -> AppResult<Json<DataResponse<InvalidateResponse>>> {
    let reference_type: ReferenceType = reference_type.parse()?;

    let service = state.service.clone();
    let deleted = run_detached(async move {
        service
            .invalidate_reference(&ctx, reference_type, reference_id)
            .await
    })
    .await?;
    Ok(Json(DataResponse {
        data: InvalidateResponse { deleted },
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_key(
    ctx: &RequestContext,
    reference_type: &str,
    reference_id: DbId,
    artifact_type: &str,
    query: &ArtifactQuery,
) -> AppResult<ArtifactKey> {
    let reference_type: ReferenceType = reference_type.parse()?;
    let artifact_type: ArtifactType = artifact_type.parse()?;
    let language = query
        .language
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(ctx.language.as_str());
    Ok(ArtifactKey::new(
        reference_id,
        reference_type,
        artifact_type,
        language,
    )?)
}
