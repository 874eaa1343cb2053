//! Repository layer: one zero-sized struct per table group, each function
//! taking a `&PgPool` or, where a call joins a transaction, any executor.

pub mod account_repo;
pub mod artifact_repo;
pub mod client_repo;
pub mod prompt_repo;
pub mod session_repo;

pub use account_repo::AccountRepo;
pub use artifact_repo::ArtifactRepo;
pub use client_repo::ClientRepo;
pub use prompt_repo::PromptRepo;
pub use session_repo::SessionRepo;
