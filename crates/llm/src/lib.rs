//! Generation client and LLM provider adapters.
//!
//! [`GenerationClient`] is the only entry point the pipeline uses. Which
//! backend answers is decided once at startup from [`LlmSettings`]: real
//! vendor adapters routed per template, or a deterministic
//! [`MockProvider`](providers::MockProvider) in test mode.

pub mod client;
pub mod error;
pub mod provider;
pub mod providers;
pub mod settings;
pub mod transport;

pub use client::GenerationClient;
pub use error::{GenerationError, LlmError};
pub use provider::{CompletionProvider, CompletionRequest, CompletionResponse, TokenUsage};
pub use settings::{LlmMode, LlmSettings, ProviderSettings};
