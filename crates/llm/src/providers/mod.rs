//! Concrete [`CompletionProvider`](crate::CompletionProvider) implementations.

pub mod anthropic;
pub mod google;
pub mod mock;
pub mod openai;

pub use anthropic::AnthropicProvider;
pub use google::GoogleProvider;
pub use mock::MockProvider;
pub use openai::OpenAiProvider;
