//! Setup mode: served instead of the board when required configuration
//! is missing.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::json;

use crate::config::ConfigError;

const INSTRUCTIONS: [&str; 3] = [
    "Set APP_ID to the application id that owns the leaderboard collection.",
    "Set ADMIN_PASSWORD to the password admins type to unlock editing.",
    "Restart the server (a .env file in the working directory is read at startup).",
];

/// Router answering every request with `503` and setup instructions.
pub fn router(problem: &ConfigError) -> Router {
    let detail = problem.to_string();
    Router::new().fallback(move || {
        let detail = detail.clone();
        async move { setup_required(&detail) }
    })
}

fn setup_required(detail: &str) -> Response {
    let body = json!({
        "error": "Setup required",
        "code": "SETUP_REQUIRED",
        "detail": detail,
        "instructions": INSTRUCTIONS,
    });
    (StatusCode::SERVICE_UNAVAILABLE, axum::Json(body)).into_response()
}
