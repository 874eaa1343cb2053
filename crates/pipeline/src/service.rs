//! Generation orchestration over the artifact cache.
//!
//! A read first confirms the account owns the reference, then checks the
//! store. On a miss the reference is loaded, its
//! variables assembled, the active template resolved and rendered, the
//! prompt generated, and the result upserted. Each step runs strictly after
//! the previous one; nothing is locked across keys or across callers, so
//! concurrent misses on one key may both generate and the last write wins.

use std::collections::BTreeMap;
use std::sync::Arc;

use scribe_core::artifact::{Artifact, ArtifactKey, ReferenceType};
use scribe_core::generation::{GenerationOptions, GenerationRequest, GenerationResult};
use scribe_core::prompt::{validate_prompt_name, PromptSource};
use scribe_core::repository::{
    AccountRepository, ArtifactRepository, ClientRepository, PromptRepository, SessionRepository,
    StoreResult,
};
use scribe_core::template;
use scribe_core::types::DbId;
use scribe_llm::GenerationClient;
use tracing::Instrument;

use crate::context::RequestContext;
use crate::error::PipelineError;
use crate::registry::PromptRegistry;
use crate::variables;

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

/// The storage handles the service needs.
#[derive(Clone)]
pub struct Stores {
    pub prompts: Arc<dyn PromptRepository>,
    pub artifacts: Arc<dyn ArtifactRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub clients: Arc<dyn ClientRepository>,
    pub accounts: Arc<dyn AccountRepository>,
}

impl Stores {
    /// Use one backend for every trait.
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: PromptRepository
            + ArtifactRepository
            + SessionRepository
            + ClientRepository
            + AccountRepository
            + 'static,
    {
        Self {
            prompts: store.clone(),
            artifacts: store.clone(),
            sessions: store.clone(),
            clients: store.clone(),
            accounts: store,
        }
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// An artifact returned to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactOutcome {
    pub key: ArtifactKey,
    pub content: String,
    /// `true` when the content was produced by this call.
    pub generated: bool,
    /// `false` only when generation succeeded but the upsert failed.
    pub persisted: bool,
    /// Present when `generated` is `true`.
    pub metrics: Option<GenerationResult>,
}

impl ArtifactOutcome {
    fn cached(artifact: Artifact) -> Self {
        Self {
            key: artifact.key,
            content: artifact.content,
            generated: false,
            persisted: true,
            metrics: None,
        }
    }
}

/// Result of an ad-hoc named prompt. Never cached.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedGeneration {
    pub name: String,
    pub language: String,
    pub result: GenerationResult,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

pub struct ArtifactService {
    pub(crate) stores: Stores,
    registry: PromptRegistry,
    llm: Arc<GenerationClient>,
}

impl ArtifactService {
    pub fn new(stores: Stores, llm: Arc<GenerationClient>) -> Self {
        let registry = PromptRegistry::new(stores.prompts.clone());
        Self {
            stores,
            registry,
            llm,
        }
    }

    pub fn registry(&self) -> &PromptRegistry {
        &self.registry
    }

    /// Build the request context for an authenticated account.
    pub async fn request_context(
        &self,
        account_id: DbId,
        request_id: Option<String>,
    ) -> StoreResult<RequestContext> {
        let profile = self.stores.accounts.find_profile(account_id).await?;
        Ok(RequestContext::new(account_id, request_id, profile.as_ref()))
    }

    /// Fail with `ReferenceNotFound` unless the account owns the reference.
    /// Runs before any artifact row is read or written.
    pub(crate) async fn ensure_owned(
        &self,
        ctx: &RequestContext,
        reference_type: ReferenceType,
        reference_id: DbId,
    ) -> Result<(), PipelineError> {
        let (owned, entity) = match reference_type {
            ReferenceType::Session => (
                self.stores
                    .sessions
                    .find(ctx.account_id, reference_id)
                    .await?
                    .is_some(),
                "Session",
            ),
            ReferenceType::Client => (
                self.stores
                    .clients
                    .find(ctx.account_id, reference_id)
                    .await?
                    .is_some(),
                "Client",
            ),
        };
        if owned {
            Ok(())
        } else {
            Err(PipelineError::ReferenceNotFound {
                entity,
                id: reference_id,
            })
        }
    }

    /// Cache read only. Never generates.
    pub async fn peek(
        &self,
        ctx: &RequestContext,
        key: &ArtifactKey,
    ) -> Result<Option<ArtifactOutcome>, PipelineError> {
        async {
            self.ensure_owned(ctx, key.reference_type, key.reference_id)
                .await?;
            let found = self.stores.artifacts.find(key).await?;
            Ok(found.map(ArtifactOutcome::cached))
        }
        .instrument(ctx.span.clone())
        .await
    }

    /// Return the cached artifact, generating and storing it on a miss.
    pub async fn get_or_generate(
        &self,
        ctx: &RequestContext,
        key: &ArtifactKey,
    ) -> Result<ArtifactOutcome, PipelineError> {
        async {
            self.ensure_owned(ctx, key.reference_type, key.reference_id)
                .await?;
            if let Some(artifact) = self.stores.artifacts.find(key).await? {
                tracing::debug!(artifact = %key, "Artifact cache hit");
                return Ok(ArtifactOutcome::cached(artifact));
            }
            tracing::info!(artifact = %key, "Artifact cache miss, generating");
            self.generate_and_store(ctx, key).await
        }
        .instrument(ctx.span.clone())
        .await
    }

    /// Drop the cached copy and generate a fresh one.
    pub async fn regenerate(
        &self,
        ctx: &RequestContext,
        key: &ArtifactKey,
    ) -> Result<ArtifactOutcome, PipelineError> {
        async {
            self.ensure_owned(ctx, key.reference_type, key.reference_id)
                .await?;
            let existed = self.stores.artifacts.delete_one(key).await?;
            tracing::info!(artifact = %key, existed, "Regenerating artifact");
            self.generate_and_store(ctx, key).await
        }
        .instrument(ctx.span.clone())
        .await
    }

    /// Run a name-keyed prompt with caller-supplied variables, in the
    /// account language.
    pub async fn generate_named(
        &self,
        ctx: &RequestContext,
        name: &str,
        variables: BTreeMap<String, String>,
    ) -> Result<NamedGeneration, PipelineError> {
        validate_prompt_name(name).map_err(|e| PipelineError::InvalidRequest(e.to_string()))?;
        let request = GenerationRequest {
            source: PromptSource::Name(name.to_string()),
            variables,
        };

        let result = self
            .run_generation(ctx, &ctx.language, &request)
            .instrument(ctx.span.clone())
            .await?;

        Ok(NamedGeneration {
            name: name.to_string(),
            language: ctx.language.clone(),
            result,
        })
    }

    async fn generate_and_store(
        &self,
        ctx: &RequestContext,
        key: &ArtifactKey,
    ) -> Result<ArtifactOutcome, PipelineError> {
        let vars = variables::assemble(
            self.stores.sessions.as_ref(),
            self.stores.clients.as_ref(),
            ctx.account_id,
            key,
        )
        .await?;
        let request = GenerationRequest {
            source: PromptSource::ArtifactType(key.artifact_type),
            variables: vars,
        };

        let result = self.run_generation(ctx, &key.language, &request).await?;

        let persisted = match self.stores.artifacts.upsert(key, &result.content).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(
                    artifact = %key,
                    error = %e,
                    "Failed to persist generated artifact; returning unsaved content",
                );
                false
            }
        };

        Ok(ArtifactOutcome {
            key: key.clone(),
            content: result.content.clone(),
            generated: true,
            persisted,
            metrics: Some(result),
        })
    }

    /// Resolve, render and generate. Template and render failures return
    /// before any provider call.
    async fn run_generation(
        &self,
        ctx: &RequestContext,
        language: &str,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, PipelineError> {
        let prompt_template = self.registry.resolve(&request.source).await?;
        let strict = prompt_template.parameters.strict_variables();

        let rendered = template::render(
            &prompt_template.template,
            &request.variables,
            &ctx.render_context(language),
            strict,
        )
        .map_err(|cause| PipelineError::Render {
            prompt: request.source.clone(),
            cause,
        })?;
        if !rendered.missing.is_empty() {
            tracing::warn!(
                source = %request.source,
                missing = ?rendered.missing,
                "Template variables not provided; rendered as empty",
            );
        }

        let options = GenerationOptions::from(&prompt_template);
        let result = self
            .llm
            .generate(&request.source, &rendered.text, &options)
            .await?;

        tracing::info!(
            source = %request.source,
            template_version = prompt_template.version,
            provider = %options.provider,
            model = %options.model,
            duration_ms = result.duration_ms,
            prompt_tokens = result.prompt_tokens,
            completion_tokens = result.completion_tokens,
            total_tokens = result.total_tokens,
            "Content generated",
        );

        Ok(result)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
