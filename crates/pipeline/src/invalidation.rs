//! Artifact invalidation when a session's source content changes.
//!
//! A session edit is classified as `Unchanged` or `ContentChanged` by
//! comparing normalized transcript and note. On `ContentChanged` every
//! artifact of the session and every artifact of its client is deleted, so
//! the next read regenerates them. Titles are not compared.
//!
//! The comparison and the deletes run inside
//! [`SessionRepository::update`](scribe_core::repository::SessionRepository::update),
//! in the same unit of work as the write. A failed delete therefore leaves
//! the old content in place and a retry still sees the change.

use scribe_core::artifact::ReferenceType;
use scribe_core::repository::SessionPatch;
use scribe_core::types::DbId;
use tracing::Instrument;

use crate::context::RequestContext;
use crate::error::PipelineError;
use crate::service::ArtifactService;

pub use scribe_core::content::InvalidationOutcome;
pub use scribe_core::repository::SessionUpdate;

impl ArtifactService {
    /// Delete every artifact of a reference the account owns, in all
    /// languages. Returns the number removed.
    pub async fn invalidate_reference(
        &self,
        ctx: &RequestContext,
        reference_type: ReferenceType,
        reference_id: DbId,
    ) -> Result<u64, PipelineError> {
        async {
            self.ensure_owned(ctx, reference_type, reference_id).await?;

            let deleted = self
                .stores
                .artifacts
                .delete_for_reference(reference_id, reference_type)
                .await?;
            tracing::info!(%reference_type, reference_id, deleted, "Artifacts invalidated");
            Ok(deleted)
        }
        .instrument(ctx.span.clone())
        .await
    }

    /// Apply `patch` to a session and invalidate what it affects.
    pub async fn update_session(
        &self,
        ctx: &RequestContext,
        session_id: DbId,
        patch: &SessionPatch,
    ) -> Result<SessionUpdate, PipelineError> {
        if patch.is_empty() {
            return Err(PipelineError::InvalidRequest(
                "At least one of title, transcript or note must be provided".to_string(),
            ));
        }
        let not_found = || PipelineError::ReferenceNotFound {
            entity: "Session",
            id: session_id,
        };

        async {
            let update = self
                .stores
                .sessions
                .update(ctx.account_id, session_id, patch)
                .await?
                .ok_or_else(not_found)?;

            let invalidation = &update.invalidation;
            if invalidation.change.is_changed() {
                tracing::info!(
                    session_id,
                    client_id = update.session.client_id,
                    session_artifacts_deleted = invalidation.session_artifacts_deleted,
                    client_artifacts_deleted = invalidation.client_artifacts_deleted,
                    "Session content changed; artifacts invalidated",
                );
            }
            Ok(update)
        }
        .instrument(ctx.span.clone())
        .await
    }
}
