//! Admin sign-in.

use std::time::Instant;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use wanted_core::gate::{AdminGate, GateOutcome};

use crate::auth::jwt::generate_session_token;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
}

/// POST /api/v1/admin/session
///
/// Exchange the admin password for a session token. A wrong password
/// answers 401 `WRONG_PASSWORD`; retries are unlimited.
pub async fn create_session(
    State(state): State<AppState>,
    Json(input): Json<SessionRequest>,
) -> AppResult<Json<DataResponse<SessionResponse>>> {
    let mut gate = AdminGate::new(state.board_config.admin_password.as_str());
    gate.type_password(input.password);

    match gate.submit(Instant::now()) {
        GateOutcome::Denied => Err(AppError::WrongPassword),
        GateOutcome::Granted => {
            let token = generate_session_token(&state.sessions)
                .map_err(|e| AppError::InternalError(format!("Token signing failed: {e}")))?;
            tracing::info!("Admin session opened");
            Ok(Json(DataResponse {
                data: SessionResponse {
                    token,
                    expires_in: state.sessions.expires_in_secs(),
                },
            }))
        }
    }
}
