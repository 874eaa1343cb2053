use scribe_core::prompt::PromptSource;
use scribe_core::repository::StoreError;
use scribe_core::template::RenderError;
use scribe_core::types::DbId;
use scribe_llm::GenerationError;

/// Orchestration failures.
///
/// A failed `upsert` after successful generation is deliberately absent:
/// it is logged and the generated content is still returned.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// No active prompt template for the requested source.
    #[error("No active prompt template for {0}")]
    TemplateNotFound(PromptSource),

    #[error("Failed to render prompt for {prompt}: {cause}")]
    Render {
        prompt: PromptSource,
        #[source]
        cause: RenderError,
    },

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The session or client does not exist for this account.
    #[error("{entity} {id} not found")]
    ReferenceNotFound { entity: &'static str, id: DbId },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}
