//! Shared HTTP transport for provider adapters.
//!
//! Every request carries a client-level timeout. Retryable failures (429,
//! 5xx, connect errors, timeouts) are re-submitted with exponential backoff
//! up to `max_retries` times; completions are idempotent derivations of the
//! prompt, so re-submission is safe.

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::LlmError;

/// Backoff schedule in seconds; the last entry repeats.
const RETRY_DELAYS_SECS: [u64; 3] = [1, 2, 4];

/// Upper bound on error-body text kept in [`LlmError::Api`].
const MAX_ERROR_BODY_CHARS: usize = 500;

pub struct HttpTransport {
    client: Client,
    provider: &'static str,
    max_retries: u32,
}

impl HttpTransport {
    pub fn new(provider: &'static str, timeout: Duration, max_retries: u32) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(LlmError::Client)?;
        Ok(Self {
            client,
            provider,
            max_retries,
        })
    }

    /// POST a JSON body and decode a JSON response, retrying transient
    /// failures.
    pub async fn post_json<Req, Res>(
        &self,
        url: &str,
        headers: HeaderMap,
        body: &Req,
    ) -> Result<Res, LlmError>
    where
        Req: Serialize + Sync,
        Res: DeserializeOwned,
    {
        let mut attempt: u32 = 0;
        loop {
            match self.try_post(url, headers.clone(), body).await {
                Ok(res) => return Ok(res),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let idx = (attempt as usize).min(RETRY_DELAYS_SECS.len() - 1);
                    let delay = RETRY_DELAYS_SECS[idx];
                    tracing::warn!(
                        provider = self.provider,
                        attempt = attempt + 1,
                        delay_secs = delay,
                        error = %e,
                        "Provider call failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_secs(delay)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn try_post<Req, Res>(&self, url: &str, headers: HeaderMap, body: &Req) -> Result<Res, LlmError>
    where
        Req: Serialize + Sync,
        Res: DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(|source| LlmError::Request {
                provider: self.provider,
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            return response.json::<Res>().await.map_err(|e| LlmError::MalformedResponse {
                provider: self.provider,
                message: e.to_string(),
            });
        }

        let text = response.text().await.unwrap_or_default();
        Err(classify_status(self.provider, status, &text))
    }
}

/// Map a non-2xx status onto an [`LlmError`].
fn classify_status(provider: &'static str, status: StatusCode, body: &str) -> LlmError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited { provider },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::InvalidApiKey { provider },
        _ => LlmError::Api {
            provider,
            status: status.as_u16(),
            message: extract_error_message(body),
        },
    }
}

/// Pull `error.message` (OpenAI, Anthropic, Google all use it) out of an
/// error body, falling back to the truncated raw text.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.chars().take(MAX_ERROR_BODY_CHARS).collect())
}
