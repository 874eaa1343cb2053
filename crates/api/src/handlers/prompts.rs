//! Handlers for ad-hoc named prompts.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::Json;
use scribe_pipeline::NamedGeneration;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::handlers::run_detached;
use crate::middleware::context::AccountContext;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub name: String,
    pub language: String,
    pub content: String,
    pub duration_ms: u64,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl From<NamedGeneration> for GenerateResponse {
    fn from(named: NamedGeneration) -> Self {
        Self {
            name: named.name,
            language: named.language,
            content: named.result.content,
            duration_ms: named.result.duration_ms,
            prompt_tokens: named.result.prompt_tokens,
            completion_tokens: named.result.completion_tokens,
            total_tokens: named.result.total_tokens,
        }
    }
}

/// POST /api/v1/prompts/{name}/generate
///
/// Run the active prompt registered under `name`. Not cached.
pub async fn generate(
    State(state): State<AppState>,
    AccountContext(ctx): AccountContext,
    Path(name): Path<String>,
    Json(body): Json<GenerateRequest>,
) -> AppResult<Json<DataResponse<GenerateResponse>>> {
    let service = state.service.clone();
    let named =
        run_detached(async move { service.generate_named(&ctx, &name, body.variables).await })
            .await?;
    Ok(Json(DataResponse { data: named.into() }))
}
