use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Read-only; requests never share mutable data.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration, including scratch location and render settings.
    pub config: Arc<ServerConfig>,
}
