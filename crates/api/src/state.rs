use std::sync::Arc;

use hareline_core::settings::EventSettings;
use hareline_listmonk::ListmonkClient;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already
/// `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: hareline_db::DbPool,
    /// Assembly settings, fixed after startup.
    pub settings: Arc<EventSettings>,
    /// Listmonk client; `None` when campaign publishing is disabled.
    pub listmonk: Option<Arc<ListmonkClient>>,
    /// Static API token; `None` disables the token check.
    pub api_token: Option<Arc<str>>,
}
