use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use scribe_llm::providers::{anthropic, google, openai};
use scribe_llm::{LlmMode, LlmSettings, ProviderSettings};

use crate::auth::jwt::JwtConfig;

/// HTTP server settings. Every field except the JWT secret has a local
/// development default.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    /// Generation on a cache miss runs inside this window.
    pub request_timeout_secs: u64,
    /// How long in-flight requests may drain after a shutdown signal.
    pub shutdown_timeout_secs: u64,
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `HOST`                  | `0.0.0.0`               |
    /// | `PORT`                  | `3000`                  |
    /// | `CORS_ORIGINS`          | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`  | `120`                   |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                    |
    ///
    /// `CORS_ORIGINS` is comma separated; `*` allows any origin.
    pub fn from_env() -> Self {
        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_parse("PORT", 3000),
            cors_origins,
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", 120),
            shutdown_timeout_secs: env_parse("SHUTDOWN_TIMEOUT_SECS", 30),
            jwt: JwtConfig::from_env(),
        }
    }
}

/// Connection pool settings.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    /// Apply pending migrations before serving.
    pub run_migrations: bool,
}

impl DatabaseConfig {
    /// | Env Var                   | Required | Default |
    /// |---------------------------|----------|---------|
    /// | `DATABASE_URL`            | **yes**  | --      |
    /// | `DB_MAX_CONNECTIONS`      | no       | `20`    |
    /// | `DB_ACQUIRE_TIMEOUT_SECS` | no       | `5`     |
    /// | `DB_RUN_MIGRATIONS`       | no       | `false` |
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            max_connections: env_parse("DB_MAX_CONNECTIONS", 20),
            acquire_timeout: Duration::from_secs(env_parse("DB_ACQUIRE_TIMEOUT_SECS", 5)),
            run_migrations: env_parse("DB_RUN_MIGRATIONS", false),
        }
    }
}

/// Load LLM provider settings from environment variables.
///
/// | Env Var              | Default                                   |
/// |----------------------|-------------------------------------------|
/// | `LLM_MODE`           | `live` (`mock` answers from canned data)  |
/// | `OPENAI_API_KEY`     | unset: OpenAI templates fail              |
/// | `OPENAI_BASE_URL`    | `https://api.openai.com/v1`               |
/// | `ANTHROPIC_API_KEY`  | unset: Anthropic templates fail           |
/// | `ANTHROPIC_BASE_URL` | `https://api.anthropic.com/v1`            |
/// | `GOOGLE_API_KEY`     | unset: Google templates fail              |
/// | `GOOGLE_BASE_URL`    | Gemini `v1beta` endpoint                  |
/// | `LLM_TIMEOUT_SECS`   | `60`                                      |
/// | `LLM_MAX_RETRIES`    | `2`                                       |
/// | `LLM_MOCK_RESPONSES` | unset                                     |
///
/// # Panics
///
/// Panics on an unknown `LLM_MODE` or a non-numeric timeout or retry count.
pub fn llm_settings_from_env() -> LlmSettings {
    let mode = parse_llm_mode(std::env::var("LLM_MODE").ok().as_deref())
        .unwrap_or_else(|v| panic!("LLM_MODE must be 'live' or 'mock', got '{v}'"));

    LlmSettings {
        mode,
        openai: provider_from_env("OPENAI", openai::DEFAULT_BASE_URL),
        anthropic: provider_from_env("ANTHROPIC", anthropic::DEFAULT_BASE_URL),
        google: provider_from_env("GOOGLE", google::DEFAULT_BASE_URL),
        timeout: Duration::from_secs(env_parse("LLM_TIMEOUT_SECS", 60)),
        max_retries: env_parse("LLM_MAX_RETRIES", 2),
        mock_responses: std::env::var("LLM_MOCK_RESPONSES").ok().map(PathBuf::from),
    }
}

/// `{PREFIX}_API_KEY` and optional `{PREFIX}_BASE_URL`.
fn provider_from_env(prefix: &str, default_base_url: &str) -> Option<ProviderSettings> {
    let api_key = std::env::var(format!("{prefix}_API_KEY"))
        .ok()
        .filter(|k| !k.trim().is_empty())?;
    let base_url = std::env::var(format!("{prefix}_BASE_URL"))
        .ok()
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| default_base_url.to_string());
    Some(ProviderSettings { api_key, base_url })
}

/// Parse `key` if set, otherwise `default`.
///
/// # Panics
///
/// Panics if the variable is set but does not parse as `T`.
pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{key} is invalid ('{raw}'): {e}")),
        _ => default,
    }
}

fn parse_llm_mode(value: Option<&str>) -> Result<LlmMode, String> {
    match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("live") => Ok(LlmMode::Live),
        Some("mock") => Ok(LlmMode::Mock),
        Some(other) => Err(other.to_string()),
    }
}
