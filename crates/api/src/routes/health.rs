use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `ok` once the board has loaded, `starting` before.
    pub status: &'static str,
    pub version: &'static str,
    /// Entries in the server's live view.
    pub entries: usize,
    /// Documents in the store. Differs from `entries` only while the view
    /// catches up.
    pub documents: usize,
    pub ws_connections: usize,
    pub admin_connections: usize,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let live = state.board.live();
    Json(HealthResponse {
        status: if live.loading { "starting" } else { "ok" },
        version: env!("CARGO_PKG_VERSION"),
        entries: live.entries.len(),
        documents: state.store.document_count(state.backend.path()).await,
        ws_connections: state.ws_manager.connection_count().await,
        admin_connections: state.ws_manager.admin_count().await,
    })
}

/// Mount health check routes (root level, not under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
