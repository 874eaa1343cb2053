//! Provider selection settings, resolved once at startup.

use std::path::PathBuf;
use std::time::Duration;

/// Which backend the generation client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmMode {
    /// Real vendor APIs, chosen per template.
    Live,
    /// [`MockProvider`](crate::providers::MockProvider) answers everything.
    Mock,
}

/// Credentials and endpoint for one vendor.
#[derive(Clone)]
pub struct ProviderSettings {
    pub api_key: String,
    pub base_url: String,
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub mode: LlmMode,
    pub openai: Option<ProviderSettings>,
    pub anthropic: Option<ProviderSettings>,
    pub google: Option<ProviderSettings>,
    /// Per-request HTTP timeout; an unbounded wait on a provider is a bug.
    pub timeout: Duration,
    /// Transport-level retries for transient failures.
    pub max_retries: u32,
    /// JSON file of canned mock responses (mock mode only).
    pub mock_responses: Option<PathBuf>,
}
