use axum::extract::State;
use axum::Json;
use wanted_events::BoardEvent;

use crate::middleware::auth::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/admin/events -- recent store mutations, newest first.
pub async fn recent_events(
    RequireAdmin(_claims): RequireAdmin,
    State(state): State<AppState>,
) -> Json<DataResponse<Vec<BoardEvent>>> {
    Json(DataResponse {
        data: state.event_log.recent().await,
    })
}
