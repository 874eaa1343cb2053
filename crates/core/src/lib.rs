//! Domain types and pure logic for clinical artifact generation.
//!
//! Nothing in this crate performs I/O: storage and LLM access are reached
//! through the traits in [`repository`] and the `scribe-llm` crate.

pub mod artifact;
pub mod content;
pub mod error;
pub mod generation;
pub mod language;
pub mod prompt;
pub mod repository;
pub mod template;
pub mod types;
