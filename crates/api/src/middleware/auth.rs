//! Bearer token extraction.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use scribe_core::error::CoreError;
use scribe_core::types::DbId;

use crate::auth::jwt::verify_token;
use crate::error::AppError;
use crate::state::AppState;

/// The account a request acts for, taken from a verified Bearer token.
///
/// Every artifact, session and prompt route reads its tenant from here;
/// nothing in a path or body can override it.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub account_id: DbId,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).map_err(unauthorized)?;
        let claims = verify_token(token, &state.config.jwt).map_err(|e| {
            tracing::debug!(error = %e, "Rejected bearer token");
            unauthorized("Invalid or expired token")
        })?;

        Ok(AuthUser {
            account_id: claims.sub,
        })
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, &'static str> {
    let value = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or("Missing Authorization header")?
        .to_str()
        .map_err(|_| "Malformed Authorization header")?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or("Expected: Bearer <token>")
}

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.to_string()))
}
