//! Route definitions for the `/admin` resource.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{entries, events, session};
use crate::state::AppState;

/// Routes mounted at `/api/v1/admin`.
///
/// ```text
/// POST   /session                    sign in (public)
/// POST   /entries                    create
/// DELETE /entries/{id}               remove (requires ?confirm=true)
/// PUT    /entries/{id}/bounty        set
/// POST   /entries/{id}/bounty/adjust increment / decrement
/// GET    /events                     activity feed
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/session", post(session::create_session))
        .route("/entries", post(entries::create_entry))
        .route("/entries/{id}", delete(entries::remove_entry))
        .route("/entries/{id}/bounty", put(entries::set_bounty))
        .route("/entries/{id}/bounty/adjust", post(entries::adjust_bounty))
        .route("/events", get(events::recent_events))
}
