use std::sync::Arc;

use clientdesk_db::store::Store;
use clientdesk_events::EventBus;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Persistence port: PostgreSQL in production, in-memory in tests.
    pub store: Arc<dyn Store>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Event bus feeding the notification dispatcher.
    pub event_bus: Arc<EventBus>,
}
