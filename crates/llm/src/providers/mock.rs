//! Deterministic in-process provider for test mode.
//!
//! Responses are looked up by the request's source identifier
//! (`artifact_type:client_bio`, `name:session_title`). Unknown sources get a
//! fixed echo so every call still succeeds deterministically.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::LlmError;
use crate::provider::{CompletionProvider, CompletionRequest, CompletionResponse, TokenUsage};

const PROVIDER: &str = "mock";

#[derive(Debug, Default)]
pub struct MockProvider {
    responses: RwLock<HashMap<String, String>>,
    failing: RwLock<HashSet<String>>,
    calls: AtomicUsize,
    last_prompt: RwLock<Option<String>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object mapping source identifiers to responses.
    pub fn from_json_file(path: &Path) -> Result<Self, LlmError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| LlmError::MockSetup(format!("{}: {e}", path.display())))?;
        let responses: HashMap<String, String> = serde_json::from_str(&raw)
            .map_err(|e| LlmError::MockSetup(format!("{}: {e}", path.display())))?;
        Ok(Self {
            responses: RwLock::new(responses),
            ..Self::default()
        })
    }

    /// Register a canned response, builder style.
    pub fn with_response(self, source: impl Into<String>, content: impl Into<String>) -> Self {
        self.set_response(source, content);
        self
    }

    pub fn set_response(&self, source: impl Into<String>, content: impl Into<String>) {
        if let Ok(mut map) = self.responses.write() {
            map.insert(source.into(), content.into());
        }
    }

    /// Make every call for `source` fail with a provider error.
    pub fn fail_for(&self, source: impl Into<String>) {
        if let Ok(mut set) = self.failing.write() {
            set.insert(source.into());
        }
    }

    /// Number of completed or failed calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The prompt text of the most recent call.
    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.read().ok().and_then(|p| p.clone())
    }

    fn lookup(&self, source: &str) -> String {
        self.responses
            .read()
            .ok()
            .and_then(|map| map.get(source).cloned())
            .unwrap_or_else(|| format!("Mock response for {source}"))
    }

    fn is_failing(&self, source: &str) -> bool {
        self.failing
            .read()
            .map(|set| set.contains(source))
            .unwrap_or(false)
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_prompt.write() {
            *last = Some(request.prompt.clone());
        }

        if self.is_failing(&request.source) {
            return Err(LlmError::Api {
                provider: PROVIDER,
                status: 500,
                message: format!("configured failure for {}", request.source),
            });
        }

        let content = self.lookup(&request.source);
        let prompt_tokens = word_count(&request.prompt);
        let completion_tokens = word_count(&content);

        Ok(CompletionResponse {
            content,
            usage: TokenUsage::new(prompt_tokens, completion_tokens),
        })
    }
}

fn word_count(text: &str) -> u32 {
    u32::try_from(text.split_whitespace().count()).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_core::prompt::GenerationParameters;

    fn request(source: &str) -> CompletionRequest {
        CompletionRequest {
            source: source.to_string(),
            prompt: "three word prompt".to_string(),
            model: "any".to_string(),
            parameters: GenerationParameters::default(),
        }
    }

    #[tokio::test]
    async fn canned_response_is_returned() {
        let mock = MockProvider::new().with_response("artifact_type:client_bio", "Bio text");
        let res = mock.complete(&request("artifact_type:client_bio")).await.unwrap();
        assert_eq!(res.content, "Bio text");
        assert_eq!(res.usage.prompt_tokens, 3);
        assert_eq!(res.usage.completion_tokens, 2);
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn unknown_source_echoes() {
        let mock = MockProvider::new();
        let res = mock.complete(&request("name:session_title")).await.unwrap();
        assert_eq!(res.content, "Mock response for name:session_title");
    }

    #[tokio::test]
    async fn configured_failure() {
        let mock = MockProvider::new();
        mock.fail_for("artifact_type:client_bio");
        assert!(mock.complete(&request("artifact_type:client_bio")).await.is_err());
        assert_eq!(mock.call_count(), 1);
    }

    #[test]
    fn missing_file_is_a_setup_error() {
        let err = MockProvider::from_json_file(Path::new("/nonexistent/mock.json")).unwrap_err();
        assert!(matches!(err, LlmError::MockSetup(_)));
    }
}
