//! Anthropic Messages API adapter.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::LlmError;
use crate::provider::{
    extra_parameters, non_empty, CompletionProvider, CompletionRequest, CompletionResponse,
    TokenUsage,
};
use crate::settings::ProviderSettings;
use crate::transport::HttpTransport;

const PROVIDER: &str = "anthropic";

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";

const API_VERSION: &str = "2023-06-01";

/// `max_tokens` is mandatory for this API; used when the template sets none.
const DEFAULT_MAX_TOKENS: u32 = 4096;

#[derive(Debug, Serialize)]
struct MessageRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

pub struct AnthropicProvider {
    transport: HttpTransport,
    api_key: String,
    base_url: String,
}

impl AnthropicProvider {
    pub fn new(settings: &ProviderSettings, transport: HttpTransport) -> Self {
        Self {
            transport,
            api_key: settings.api_key.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl CompletionProvider for AnthropicProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let params = &request.parameters;
        let body = MessageRequest {
            model: &request.model,
            max_tokens: params.max_tokens().unwrap_or(DEFAULT_MAX_TOKENS),
            messages: vec![Message {
                role: "user",
                content: &request.prompt,
            }],
            temperature: params.temperature(),
            top_p: params.top_p(),
            extra: extra_parameters(params, &["temperature", "top_p", "max_tokens"]),
        };

        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&self.api_key)
            .map_err(|_| LlmError::InvalidApiKey { provider: PROVIDER })?;
        headers.insert(HeaderName::from_static("x-api-key"), key);
        headers.insert(
            HeaderName::from_static("anthropic-version"),
            HeaderValue::from_static(API_VERSION),
        );

        let url = format!("{}/messages", self.base_url);
        let response: MessageResponse = self.transport.post_json(&url, headers, &body).await?;

        let content: String = response
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("");

        Ok(CompletionResponse {
            content: non_empty(PROVIDER, content)?,
            usage: TokenUsage::new(response.usage.input_tokens, response.usage.output_tokens),
        })
    }
}

impl std::fmt::Debug for AnthropicProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicProvider")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_blocks_are_concatenated_and_others_skipped() {
        let raw = json!({
            "id": "msg_1",
            "content": [
                {"type": "text", "text": "Hello "},
                {"type": "thinking", "thinking": "..."},
                {"type": "text", "text": "world"}
            ],
            "usage": {"input_tokens": 20, "output_tokens": 4}
        });
        let parsed: MessageResponse = serde_json::from_value(raw).unwrap();
        let texts: Vec<_> = parsed
            .content
            .into_iter()
            .filter_map(|b| match b {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect();
        assert_eq!(texts.join(""), "Hello world");
        assert_eq!(parsed.usage.input_tokens, 20);
    }

    #[test]
    fn request_always_carries_max_tokens() {
        let body = MessageRequest {
            model: "claude-sonnet",
            max_tokens: DEFAULT_MAX_TOKENS,
            messages: vec![Message {
                role: "user",
                content: "hi",
            }],
            temperature: None,
            top_p: None,
            extra: Map::new(),
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["max_tokens"], DEFAULT_MAX_TOKENS);
        assert!(v.get("temperature").is_none());
    }
}
