//! Route definitions for the `/events` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::events;
use crate::state::AppState;

/// Routes mounted at `/events`.
///
/// ```text
/// GET  /       -> list_events
/// POST /       -> create_event
/// PUT  /{id}   -> update_event_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(events::list_events).post(events::create_event))
        .route("/{id}", put(events::update_event_status))
}
