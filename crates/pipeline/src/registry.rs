//! Prompt Registry: resolves a prompt source to its active template.

use std::sync::Arc;

use scribe_core::artifact::ArtifactType;
use scribe_core::prompt::{PromptSource, PromptTemplate};
use scribe_core::repository::PromptRepository;

use crate::error::PipelineError;

/// Read-only view over the active prompt templates.
///
/// Only rows with `active = true` are considered. There is no fallback to an
/// older or inactive version.
#[derive(Clone)]
pub struct PromptRegistry {
    prompts: Arc<dyn PromptRepository>,
}

impl PromptRegistry {
    pub fn new(prompts: Arc<dyn PromptRepository>) -> Self {
        Self { prompts }
    }

    pub async fn template_by_artifact_type(
        &self,
        artifact_type: ArtifactType,
    ) -> Result<PromptTemplate, PipelineError> {
        self.prompts
            .find_active_by_artifact_type(artifact_type)
            .await?
            .ok_or(PipelineError::TemplateNotFound(PromptSource::ArtifactType(
                artifact_type,
            )))
    }

    pub async fn template_by_name(&self, name: &str) -> Result<PromptTemplate, PipelineError> {
        self.prompts
            .find_active_by_name(name)
            .await?
            .ok_or_else(|| PipelineError::TemplateNotFound(PromptSource::Name(name.to_string())))
    }

    pub async fn resolve(&self, source: &PromptSource) -> Result<PromptTemplate, PipelineError> {
        match source {
            PromptSource::ArtifactType(t) => self.template_by_artifact_type(*t).await,
            PromptSource::Name(name) => self.template_by_name(name).await,
        }
    }
}
