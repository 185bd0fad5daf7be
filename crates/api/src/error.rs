use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use wanted_board::BoardError;
use wanted_core::error::CoreError;
use wanted_core::gate::{SHAKE_DURATION, WRONG_PASSWORD_MESSAGE};
use wanted_store::StoreError;

/// Application-level error type for HTTP handlers.
///
/// Implements [`IntoResponse`] to produce consistent `{ "error", "code" }`
/// JSON bodies.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Board(#[from] BoardError),

    /// The admin password did not match. The client clears its input and
    /// shakes the form.
    #[error("Wrong admin password")]
    WrongPassword,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),
            AppError::Board(board) => classify_board_error(board),

            AppError::WrongPassword => {
                tracing::info!("Rejected admin password");
                let body = json!({
                    "error": WRONG_PASSWORD_MESSAGE,
                    "code": "WRONG_PASSWORD",
                    "clearInput": true,
                    "shakeMs": SHAKE_DURATION.as_millis() as u64,
                });
                return (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response();
            }

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal()
        }
    }
}

/// Map board and store failures.
///
/// - Unknown entries map to 404.
/// - A closed store or a view that never signed in maps to 503.
/// - Permission failures are the server's own identity going bad, so 500.
fn classify_board_error(err: &BoardError) -> (StatusCode, &'static str, String) {
    match err {
        BoardError::Core(core) => classify_core_error(core),
        BoardError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("Outlaw with id {id} not found"),
        ),
        BoardError::Store(StoreError::NotFound { id, .. }) => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("Outlaw with id {id} not found"),
        ),
        BoardError::Store(StoreError::Closed) | BoardError::NotSignedIn => (
            StatusCode::SERVICE_UNAVAILABLE,
            "UNAVAILABLE",
            "The board is not connected".to_string(),
        ),
        BoardError::Store(StoreError::PermissionDenied(msg)) => {
            tracing::error!(error = %msg, "Store rejected the server identity");
            internal()
        }
    }
}
