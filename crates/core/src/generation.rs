//! Ephemeral request/result types that flow through one generation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::prompt::{GenerationParameters, PromptSource, PromptTemplate, Provider};

/// What the caller wants generated, before a template is resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub source: PromptSource,
    /// Untrusted, caller-supplied values keyed by template variable name.
    pub variables: BTreeMap<String, String>,
}

impl GenerationRequest {
    pub fn new(source: PromptSource) -> Self {
        Self {
            source,
            variables: BTreeMap::new(),
        }
    }

    /// Add a variable, builder style.
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }
}

/// Trusted values derived from the authenticated account, merged into every
/// render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderContext {
    /// Full language name, e.g. `English`.
    pub language: String,
    /// Title of the therapist's primary therapeutic approach; empty when unset.
    pub primary_therapeutic_approach: String,
}

/// Per-call options handed to the generation client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub provider: Provider,
    pub model: String,
    pub parameters: GenerationParameters,
}

impl From<&PromptTemplate> for GenerationOptions {
    fn from(template: &PromptTemplate) -> Self {
        Self {
            provider: template.provider,
            model: template.model.clone(),
            parameters: template.parameters.clone(),
        }
    }
}

/// Outcome of a completed provider call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Generated text with any enclosing code fence removed.
    pub content: String,
    pub duration_ms: u64,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}
