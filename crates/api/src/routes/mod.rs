pub mod admin;
pub mod board;
pub mod health;
pub mod setup;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /ws[?token=]                              live board WebSocket
/// /entries                                  live set (GET)
///
/// /admin/session                            password -> session token (POST)
/// /admin/entries                            post a bounty (POST)
/// /admin/entries/{id}?confirm=true          remove (DELETE)
/// /admin/entries/{id}/bounty                set from raw input (PUT)
/// /admin/entries/{id}/bounty/adjust         add a delta (POST)
/// /admin/events                             recent mutations (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .route("/entries", get(handlers::entries::list_entries))
        .nest("/admin", admin::router())
}
