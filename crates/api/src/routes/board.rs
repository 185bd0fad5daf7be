use axum::routing::get;
use axum::Router;

use crate::handlers::board;
use crate::state::AppState;

/// Page routes, mounted at the root.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(board::public_board))
        .route("/admin", get(board::admin_board))
}
