use std::sync::Arc;

use scribe_core::repository::StoreHealth;
use scribe_pipeline::ArtifactService;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Artifact generation, caching and invalidation.
    pub service: Arc<ArtifactService>,
    /// Store reachability check for `/health`.
    pub health: Arc<dyn StoreHealth>,
    pub config: Arc<ServerConfig>,
}
