//! Error types for provider calls.

use scribe_core::prompt::Provider;

/// A single provider call failed.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("{provider} request failed: {source}")]
    Request {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} rate limit exceeded")]
    RateLimited { provider: &'static str },

    #[error("{provider} rejected the configured API key")]
    InvalidApiKey { provider: &'static str },

    /// Any other non-2xx response.
    #[error("{provider} API error ({status}): {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },

    /// A 2xx response that could not be used (bad JSON, no text, empty text).
    #[error("{provider} returned a malformed response: {message}")]
    MalformedResponse {
        provider: &'static str,
        message: String,
    },

    /// A template names a provider with no credentials configured.
    #[error("Provider '{0}' is not configured")]
    ProviderNotConfigured(Provider),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Failed to load mock responses: {0}")]
    MockSetup(String),
}

impl LlmError {
    /// Whether re-submitting the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request { source, .. } => source.is_timeout() || source.is_connect(),
            Self::RateLimited { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// A failed generation, tagged with the prompt source it was for
/// (`artifact_type:client_bio`).
#[derive(Debug, thiserror::Error)]
#[error("Failed to generate content for {source_id}: {cause}")]
pub struct GenerationError {
    pub source_id: String,
    #[source]
    pub cause: LlmError,
}
