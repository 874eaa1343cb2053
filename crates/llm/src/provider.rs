//! The provider seam: one trait every LLM backend implements.

use async_trait::async_trait;
use serde_json::{Map, Value};

use scribe_core::prompt::GenerationParameters;

use crate::error::LlmError;

/// Parameters consumed by the pipeline itself and never forwarded.
const INTERNAL_PARAMETERS: &[&str] = &["strict_variables"];

/// A fully rendered prompt ready to submit.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Prompt source identifier (`artifact_type:client_bio`). Real providers
    /// ignore it; the mock routes on it.
    pub source: String,
    pub prompt: String,
    pub model: String,
    pub parameters: GenerationParameters,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }
}

/// Raw provider output, before fence stripping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResponse {
    pub content: String,
    pub usage: TokenUsage,
}

/// An LLM backend. Implementations must be thread-safe.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Short identifier used in logs and errors.
    fn name(&self) -> &'static str;

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

/// Parameters not already mapped onto a typed request field, for
/// pass-through to the provider body.
pub(crate) fn extra_parameters(parameters: &GenerationParameters, mapped: &[&str]) -> Map<String, Value> {
    parameters
        .0
        .iter()
        .filter(|(k, _)| !mapped.contains(&k.as_str()) && !INTERNAL_PARAMETERS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Reject an empty completion so it is never cached.
pub(crate) fn non_empty(provider: &'static str, content: String) -> Result<String, LlmError> {
    if content.trim().is_empty() {
        return Err(LlmError::MalformedResponse {
            provider,
            message: "completion contained no text".to_string(),
        });
    }
    Ok(content)
}
