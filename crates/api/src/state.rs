use std::sync::Arc;

use atlasprint_engine::JobRegistry;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (the registry handle and `Arc` fields
/// share their inner data).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration, including worker invocation settings.
    pub config: Arc<ServerConfig>,
    /// The in-memory job registry.
    pub registry: JobRegistry,
}
