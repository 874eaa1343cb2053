use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use scribe_core::error::CoreError;
use scribe_core::repository::StoreError;
use scribe_pipeline::PipelineError;
use serde_json::json;

/// Message returned for every generation-side failure. Prompt text, provider
/// names and upstream error bodies never reach the client.
pub const GENERATION_FAILED_MESSAGE: &str = "Failed to generate artifact";

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`PipelineError`] for
/// orchestration failures. Implements [`IntoResponse`] to produce consistent
/// JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `scribe_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An orchestration error from `scribe_pipeline`.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// A storage failure outside the pipeline (health, context loading).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

type ErrorParts = (StatusCode, &'static str, String);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => classify_core_error(core),

            // --- Pipeline errors ---
            AppError::Pipeline(err) => classify_pipeline_error(err),

            // --- Storage errors ---
            AppError::Store(err) => classify_store_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal_error()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal_error() -> ErrorParts {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

fn classify_core_error(core: &CoreError) -> ErrorParts {
    match core {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal_error()
        }
    }
}

/// Map orchestration failures onto HTTP.
///
/// - Missing prompt template: 404 `PROMPT_NOT_FOUND` (a configuration gap).
/// - Missing session/client: 404 `NOT_FOUND`.
/// - Invalid input: 400 `VALIDATION_ERROR`.
/// - Render and generation failures: 500 with [`GENERATION_FAILED_MESSAGE`].
fn classify_pipeline_error(err: &PipelineError) -> ErrorParts {
    match err {
        PipelineError::TemplateNotFound(source) => {
            tracing::error!(source = %source, "No active prompt template");
            (
                StatusCode::NOT_FOUND,
                "PROMPT_NOT_FOUND",
                "No prompt is configured for this artifact".to_string(),
            )
        }
        PipelineError::ReferenceNotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        PipelineError::InvalidRequest(msg) => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
        }
        PipelineError::Render { prompt, cause } => {
            tracing::error!(source = %prompt, error = %cause, "Prompt rendering failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "GENERATION_FAILED",
                GENERATION_FAILED_MESSAGE.to_string(),
            )
        }
        PipelineError::Generation(failure) => {
            tracing::error!(source = %failure.source_id, error = %failure.cause, "Generation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "GENERATION_FAILED",
                GENERATION_FAILED_MESSAGE.to_string(),
            )
        }
        PipelineError::Store(store) => classify_store_error(store),
    }
}

/// Storage failures never expose backend detail. A pool that cannot hand
/// out a connection in time is 503 so callers can retry; a unique violation
/// on one of our `uq_` constraints is 409.
fn classify_store_error(err: &StoreError) -> ErrorParts {
    let db_err = match err.0.downcast_ref::<sqlx::Error>() {
        Some(sqlx::Error::PoolTimedOut) => {
            tracing::error!("Database pool timed out");
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                "Database temporarily unavailable".to_string(),
            );
        }
        Some(sqlx::Error::Database(db_err)) => db_err,
        _ => {
            tracing::error!(error = %err, "Store error");
            return internal_error();
        }
    };

    // 23505: unique_violation
    let constraint = db_err.constraint().filter(|c| c.starts_with("uq_"));
    match (db_err.code().as_deref(), constraint) {
        (Some("23505"), Some(constraint)) => (
            StatusCode::CONFLICT,
            "CONFLICT",
            format!("Duplicate value violates unique constraint: {constraint}"),
        ),
        _ => {
            tracing::error!(error = %db_err, "Database error");
            internal_error()
        }
    }
}
