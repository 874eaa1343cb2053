//! The generation client: picks a provider, submits, post-processes.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use scribe_core::content::strip_code_fence;
use scribe_core::generation::{GenerationOptions, GenerationResult};
use scribe_core::prompt::{PromptSource, Provider};

use crate::error::{GenerationError, LlmError};
use crate::provider::{CompletionProvider, CompletionRequest};
use crate::providers::{AnthropicProvider, GoogleProvider, MockProvider, OpenAiProvider};
use crate::settings::{LlmMode, LlmSettings};
use crate::transport::HttpTransport;

enum Routing {
    /// One adapter per vendor; the template decides which.
    PerProvider(HashMap<Provider, Arc<dyn CompletionProvider>>),
    /// A single backend answers for every vendor (mock mode).
    Single(Arc<dyn CompletionProvider>),
}

/// Dispatches rendered prompts to the provider named by the template.
pub struct GenerationClient {
    routing: Routing,
}

impl GenerationClient {
    /// Build from startup settings. In [`LlmMode::Mock`] every call goes to a
    /// [`MockProvider`]; otherwise one adapter is registered per vendor with
    /// credentials.
    pub fn from_settings(settings: &LlmSettings) -> Result<Self, LlmError> {
        if settings.mode == LlmMode::Mock {
            let mock = match &settings.mock_responses {
                Some(path) => MockProvider::from_json_file(path)?,
                None => MockProvider::new(),
            };
            return Ok(Self::single(Arc::new(mock)));
        }

        let mut providers: HashMap<Provider, Arc<dyn CompletionProvider>> = HashMap::new();
        if let Some(s) = &settings.openai {
            let transport = HttpTransport::new("openai", settings.timeout, settings.max_retries)?;
            providers.insert(Provider::OpenAi, Arc::new(OpenAiProvider::new(s, transport)));
        }
        if let Some(s) = &settings.anthropic {
            let transport =
                HttpTransport::new("anthropic", settings.timeout, settings.max_retries)?;
            providers.insert(
                Provider::Anthropic,
                Arc::new(AnthropicProvider::new(s, transport)),
            );
        }
        if let Some(s) = &settings.google {
            let transport = HttpTransport::new("google", settings.timeout, settings.max_retries)?;
            providers.insert(Provider::Google, Arc::new(GoogleProvider::new(s, transport)));
        }
        Ok(Self::per_provider(providers))
    }

    pub fn per_provider(providers: HashMap<Provider, Arc<dyn CompletionProvider>>) -> Self {
        Self {
            routing: Routing::PerProvider(providers),
        }
    }

    pub fn single(provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            routing: Routing::Single(provider),
        }
    }

    /// Vendors this client can reach.
    pub fn configured_providers(&self) -> Vec<Provider> {
        match &self.routing {
            Routing::PerProvider(map) => {
                let mut v: Vec<_> = map.keys().copied().collect();
                v.sort_by_key(|p| p.as_str());
                v
            }
            Routing::Single(_) => vec![Provider::OpenAi, Provider::Anthropic, Provider::Google],
        }
    }

    fn provider_for(&self, provider: Provider) -> Result<&Arc<dyn CompletionProvider>, LlmError> {
        match &self.routing {
            Routing::PerProvider(map) => map
                .get(&provider)
                .ok_or(LlmError::ProviderNotConfigured(provider)),
            Routing::Single(p) => Ok(p),
        }
    }

    /// Submit a rendered prompt. Returns only after the provider has fully
    /// answered; content has any enclosing code fence removed.
    pub async fn generate(
        &self,
        source: &PromptSource,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<GenerationResult, GenerationError> {
        let source_id = source.to_string();
        let wrap = |cause: LlmError| GenerationError {
            source_id: source_id.clone(),
            cause,
        };

        let provider = self.provider_for(options.provider).map_err(wrap)?;
        let request = CompletionRequest {
            source: source_id.clone(),
            prompt: prompt.to_string(),
            model: options.model.clone(),
            parameters: options.parameters.clone(),
        };

        let started = Instant::now();
        let response = provider.complete(&request).await.map_err(wrap)?;
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        tracing::debug!(
            source = %source_id,
            provider = provider.name(),
            model = %options.model,
            duration_ms,
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            "Completion received"
        );

        let content = strip_code_fence(&response.content);
        if content.trim().is_empty() {
            return Err(wrap(LlmError::MalformedResponse {
                provider: provider.name(),
                message: "completion was empty once the code fence was removed".to_string(),
            }));
        }

        Ok(GenerationResult {
            content,
            duration_ms,
            prompt_tokens: response.usage.prompt_tokens,
            completion_tokens: response.usage.completion_tokens,
            total_tokens: response.usage.total_tokens,
        })
    }
}
