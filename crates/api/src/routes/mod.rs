pub mod auth;
pub mod events;
pub mod health;
pub mod swap;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                     register (public)
/// /auth/login                      login (public)
/// /auth/refresh                    refresh (public)
/// /auth/logout                     logout (requires auth)
///
/// /events                          list, create (auth required)
/// /events/{id}                     owner status change (PUT)
///
/// /swap/swappable-slots            marketplace listing
/// /swap/request                    create swap request (POST)
/// /swap/requests/incoming          requests where caller is recipient
/// /swap/requests/outgoing          requests where caller is requester
/// /swap/response/{request_id}      accept/reject (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/events", events::router())
        .nest("/swap", swap::router())
}
