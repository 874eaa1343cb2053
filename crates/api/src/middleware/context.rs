//! Per-request pipeline context extractor.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use scribe_pipeline::RequestContext;

use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

pub(crate) const REQUEST_ID_HEADER: &str = "x-request-id";

/// The authenticated account's [`RequestContext`]: language and therapeutic
/// approach from the account profile, the `x-request-id` set by the router,
/// and a span every pipeline log line is recorded under.
#[derive(Debug, Clone)]
pub struct AccountContext(pub RequestContext);

impl FromRequestParts<AppState> for AccountContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        let request_id = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let ctx = state
            .service
            .request_context(user.account_id, request_id)
            .await?;
        Ok(AccountContext(ctx))
    }
}
