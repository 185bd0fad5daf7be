//! Admin session extractor for Axum handlers.

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::Deserialize;
use wanted_core::error::CoreError;

use crate::auth::jwt::{validate_token, Claims, ROLE_ADMIN};
use crate::error::AppError;
use crate::state::AppState;

/// `?token=` query parameter. Browsers cannot set headers on a WebSocket
/// upgrade, so the session token may travel in the URL instead.
#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

/// A request carrying a valid admin session.
///
/// The token is read from `Authorization: Bearer <token>` or, failing
/// that, from the `token` query parameter.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(claims): RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub Claims);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = request_token(parts)?.ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Admin session required".into()))
        })?;
        authorize(&token, state).map(RequireAdmin)
    }
}

/// An optional admin session: absent credentials are fine, bad ones are not.
#[derive(Debug, Clone)]
pub struct MaybeAdmin(pub Option<Claims>);

impl MaybeAdmin {
    pub fn is_admin(&self) -> bool {
        self.0.is_some()
    }
}

impl FromRequestParts<AppState> for MaybeAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match request_token(parts)? {
            Some(token) => authorize(&token, state).map(|c| MaybeAdmin(Some(c))),
            None => Ok(MaybeAdmin(None)),
        }
    }
}

fn request_token(parts: &Parts) -> Result<Option<String>, AppError> {
    if let Some(header) = parts.headers.get("authorization") {
        let token = header
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Invalid Authorization format. Expected: Bearer <token>".into(),
                ))
            })?;
        return Ok(Some(token.to_string()));
    }

    Ok(Query::<TokenQuery>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(q)| q.token)
        .filter(|t| !t.is_empty()))
}

fn authorize(token: &str, state: &AppState) -> Result<Claims, AppError> {
    let claims = validate_token(token, &state.sessions).map_err(|_| {
        AppError::Core(CoreError::Unauthorized("Invalid or expired session".into()))
    })?;
    if claims.role != ROLE_ADMIN {
        return Err(AppError::Core(CoreError::Forbidden(
            "Admin role required".into(),
        )));
    }
    Ok(claims)
}
