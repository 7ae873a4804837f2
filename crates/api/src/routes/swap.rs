//! Route definitions for the `/swap` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::swap;
use crate::state::AppState;

/// Routes mounted at `/swap`.
///
/// ```text
/// GET  /swappable-slots          -> list_swappable_slots
/// POST /request                  -> create_swap_request
/// GET  /requests/incoming        -> list_incoming_requests
/// GET  /requests/outgoing        -> list_outgoing_requests
/// POST /response/{request_id}    -> respond_to_swap
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/swappable-slots", get(swap::list_swappable_slots))
        .route("/request", post(swap::create_swap_request))
        .route("/requests/incoming", get(swap::list_incoming_requests))
        .route("/requests/outgoing", get(swap::list_outgoing_requests))
        .route("/response/{request_id}", post(swap::respond_to_swap))
}
