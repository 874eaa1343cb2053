//! Artifact generation orchestration.
//!
//! Ties the storage traits from `scribe-core` to the generation client from
//! `scribe-llm`: cache lookup, variable assembly, prompt resolution and
//! rendering, generation, persistence, and invalidation when session
//! content changes.

pub mod context;
pub mod error;
pub mod invalidation;
pub mod registry;
pub mod service;
pub mod variables;

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

pub use context::RequestContext;
pub use error::PipelineError;
pub use invalidation::{InvalidationOutcome, SessionUpdate};
pub use registry::PromptRegistry;
pub use service::{ArtifactOutcome, ArtifactService, NamedGeneration, Stores};
