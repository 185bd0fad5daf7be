//! Rendered board state for the public and admin pages.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use wanted_board::BoardSnapshot;

use crate::middleware::auth::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// A board page: the displayed ranking with live values, plus whether the
/// admin controls are shown.
#[derive(Debug, Serialize)]
pub struct BoardPage {
    #[serde(flatten)]
    pub board: BoardSnapshot,
    pub admin: bool,
}

/// GET /
pub async fn public_board(State(state): State<AppState>) -> Json<DataResponse<BoardPage>> {
    Json(DataResponse {
        data: BoardPage {
            board: state.board.snapshot(),
            admin: false,
        },
    })
}

/// GET /admin
pub async fn admin_board(
    RequireAdmin(_claims): RequireAdmin,
    State(state): State<AppState>,
) -> Json<DataResponse<BoardPage>> {
    Json(DataResponse {
        data: BoardPage {
            board: state.board.snapshot(),
            admin: true,
        },
    })
}
