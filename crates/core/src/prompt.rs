//! Prompt templates and how a generation request names one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::artifact::ArtifactType;
use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// LLM vendor a prompt template is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Anthropic,
    Google,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Google => "google",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            "google" => Ok(Self::Google),
            other => Err(CoreError::validation(format!(
                "Unknown provider '{other}'. Must be one of: openai, anthropic, google"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Generation parameters
// ---------------------------------------------------------------------------

/// Provider knobs stored alongside a template as a JSON object.
///
/// Known keys have typed accessors; unknown keys are kept so operators can
/// pass provider-specific settings through without a code change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationParameters(pub Map<String, Value>);

impl GenerationParameters {
    /// Build from an arbitrary JSON value. Anything other than an object
    /// (including SQL `NULL`) yields an empty parameter set.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    pub fn temperature(&self) -> Option<f64> {
        self.0.get("temperature").and_then(Value::as_f64)
    }

    pub fn top_p(&self) -> Option<f64> {
        self.0.get("top_p").and_then(Value::as_f64)
    }

    pub fn max_tokens(&self) -> Option<u32> {
        self.0
            .get("max_tokens")
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
    }

    /// When set, unresolved template variables are a render error instead
    /// of rendering as empty strings.
    pub fn strict_variables(&self) -> bool {
        self.0
            .get("strict_variables")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

// ---------------------------------------------------------------------------
// Prompt source
// ---------------------------------------------------------------------------

/// How a generation request identifies its template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "source_type", content = "source_value", rename_all = "snake_case")]
pub enum PromptSource {
    ArtifactType(ArtifactType),
    Name(String),
}

impl PromptSource {
    pub fn source_type(&self) -> &'static str {
        match self {
            Self::ArtifactType(_) => "artifact_type",
            Self::Name(_) => "name",
        }
    }

    pub fn source_value(&self) -> &str {
        match self {
            Self::ArtifactType(t) => t.as_str(),
            Self::Name(n) => n,
        }
    }
}

/// Renders as `sourceType:sourceValue`, e.g. `artifact_type:client_bio`.
impl fmt::Display for PromptSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source_type(), self.source_value())
    }
}

// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

/// An active prompt template as stored in the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub id: DbId,
    pub artifact_type: Option<ArtifactType>,
    pub name: Option<String>,
    pub version: i32,
    pub template: String,
    pub provider: Provider,
    pub model: String,
    pub parameters: GenerationParameters,
    pub active: bool,
    pub updated_at: Timestamp,
}

impl PromptTemplate {
    /// The source this template answers to.
    pub fn source(&self) -> Option<PromptSource> {
        match (self.artifact_type, &self.name) {
            (Some(t), _) => Some(PromptSource::ArtifactType(t)),
            (None, Some(n)) => Some(PromptSource::Name(n.clone())),
            (None, None) => None,
        }
    }
}

/// Validate an ad-hoc prompt name (`session_title`, `note_cleanup`).
pub fn validate_prompt_name(name: &str) -> Result<(), CoreError> {
    if name.is_empty() {
        return Err(CoreError::validation("Prompt name must not be empty"));
    }
    if name.len() > MAX_PROMPT_NAME_LENGTH {
        return Err(CoreError::validation(format!(
            "Prompt name exceeds maximum length of {MAX_PROMPT_NAME_LENGTH} characters (got {})",
            name.len()
        )));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(CoreError::validation(format!(
            "Prompt name '{name}' may only contain lowercase letters, digits and underscores"
        )));
    }
    Ok(())
}

/// Maximum length for an ad-hoc prompt name.
pub const MAX_PROMPT_NAME_LENGTH: usize = 100;
