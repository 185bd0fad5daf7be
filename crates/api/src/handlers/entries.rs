//! Handlers for the `/entries` resource.
//!
//! Admin writes go through the server-side board view, so increments are
//! computed from the live set exactly as a page would compute them.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use wanted_core::entry::Entry;
use wanted_core::types::EntryId;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct LiveEntries {
    pub entries: Vec<Entry>,
    pub loading: bool,
}

/// Body for `POST /admin/entries`. Negative bounties clamp to 0.
#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    pub name: String,
    #[serde(default)]
    pub bounty: i64,
}

/// Body for `PUT /admin/entries/{id}/bounty`: the raw text of the input.
#[derive(Debug, Deserialize)]
pub struct SetBountyRequest {
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct SetBountyResponse {
    /// `false` when the input was not a number and nothing was written.
    pub written: bool,
    pub entry: Option<Entry>,
}

#[derive(Debug, Deserialize)]
pub struct AdjustBountyRequest {
    pub delta: i64,
}

#[derive(Debug, Deserialize)]
pub struct RemoveParams {
    #[serde(default)]
    pub confirm: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/entries
pub async fn list_entries(State(state): State<AppState>) -> Json<DataResponse<LiveEntries>> {
    let live = state.board.live();
    Json(DataResponse {
        data: LiveEntries {
            entries: live.entries.as_ref().clone(),
            loading: live.loading,
        },
    })
}

/// POST /api/v1/admin/entries
pub async fn create_entry(
    RequireAdmin(_claims): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateEntryRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Entry>>)> {
    let entry = state.board.create(&input.name, input.bounty).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: entry })))
}

/// PUT /api/v1/admin/entries/{id}/bounty
pub async fn set_bounty(
    RequireAdmin(_claims): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<EntryId>,
    Json(input): Json<SetBountyRequest>,
) -> AppResult<Json<DataResponse<SetBountyResponse>>> {
    let entry = state.board.set_bounty(id, &input.value).await?;
    Ok(Json(DataResponse {
        data: SetBountyResponse {
            written: entry.is_some(),
            entry,
        },
    }))
}

/// POST /api/v1/admin/entries/{id}/bounty/adjust
pub async fn adjust_bounty(
    RequireAdmin(_claims): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<EntryId>,
    Json(input): Json<AdjustBountyRequest>,
) -> AppResult<Json<DataResponse<Entry>>> {
    let entry = state.board.increment_bounty(id, input.delta).await?;
    Ok(Json(DataResponse { data: entry }))
}

/// DELETE /api/v1/admin/entries/{id}?confirm=true
pub async fn remove_entry(
    RequireAdmin(_claims): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<EntryId>,
    Query(params): Query<RemoveParams>,
) -> AppResult<StatusCode> {
    if !params.confirm {
        return Err(AppError::BadRequest(
            "Removing an outlaw requires confirm=true".into(),
        ));
    }
    if state.board.remove(id, true).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(wanted_board::BoardError::NotFound(id).into())
    }
}
