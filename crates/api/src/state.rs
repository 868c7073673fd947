use std::sync::Arc;

use crate::config::ServerConfig;
use crate::sessions::SessionStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`). The session
/// store is constructed once at process start and injected here -- there
/// is no module-level singleton, so tests build isolated instances.
#[derive(Clone)]
pub struct AppState {
    /// Visitor-session registry (session id -> upstream client).
    pub sessions: Arc<SessionStore>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
