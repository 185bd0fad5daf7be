use std::sync::Arc;

use wanted_board::{BoardOptions, BoardView, StoreBackend};
use wanted_events::EventLog;
use wanted_store::DocumentStore;

use crate::auth::jwt::SessionKeys;
use crate::config::{BoardConfig, ServerConfig};
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything lives behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub board_config: Arc<BoardConfig>,
    /// Per-process signing key for admin sessions.
    pub sessions: Arc<SessionKeys>,
    pub store: Arc<DocumentStore>,
    /// Store handle bound to the leaderboard collection. Each WebSocket
    /// connection mounts its own view over it.
    pub backend: Arc<StoreBackend>,
    /// Server-side view backing the HTTP routes.
    pub board: Arc<BoardView>,
    pub ws_manager: Arc<WsManager>,
    pub event_log: Arc<EventLog>,
}

impl AppState {
    /// Options for every board view mounted by this server.
    pub fn board_options(&self) -> BoardOptions {
        BoardOptions {
            sort_delay: self.board_config.sort_delay,
        }
    }
}
