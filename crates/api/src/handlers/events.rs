//! Handlers for the `/events` resource: a user's own calendar slots.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use slotswap_core::error::CoreError;
use slotswap_core::slot::{validate_slot_times, SlotStatus};
use slotswap_core::types::{DbId, Timestamp};
use slotswap_db::models::slot::{CreateSlot, Slot};
use slotswap_db::repositories::SlotRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Request body for `POST /events`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
}

/// Request body for `PUT /events/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateEventStatusRequest {
    pub status: SlotStatus,
}

/// GET /api/v1/events
///
/// List the caller's own slots, newest first.
pub async fn list_events(auth: AuthUser, State(state): State<AppState>) -> AppResult<Json<Vec<Slot>>> {
    let slots = SlotRepo::list_for_owner(&state.pool, auth.user_id).await?;
    Ok(Json(slots))
}

/// POST /api/v1/events
///
/// Create a slot owned by the caller. Status always starts at `BUSY`.
pub async fn create_event(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateEventRequest>,
) -> AppResult<impl IntoResponse> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    validate_slot_times(input.start_time, input.end_time)?;

    let slot = SlotRepo::create(
        &state.pool,
        &CreateSlot {
            owner_id: auth.user_id,
            title: input.title,
            start_time: input.start_time,
            end_time: input.end_time,
        },
    )
    .await?;

    tracing::info!(user_id = auth.user_id, slot_id = slot.id, "Slot created");

    Ok((StatusCode::CREATED, Json(slot)))
}

/// PUT /api/v1/events/{id}
///
/// Owner-initiated status change (`BUSY <-> SWAPPABLE`). Slots locked by a
/// pending swap request cannot be changed, and a stale transition (the slot
/// moved underneath the client) is a conflict rather than an overwrite.
pub async fn update_event_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateEventStatusRequest>,
) -> AppResult<Json<Slot>> {
    let slot = SlotRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Slot", id }))?;

    if slot.owner_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You do not own this slot".into(),
        )));
    }

    slot.status.validate_owner_transition(input.status)?;

    // Compare-and-set against the status we just validated; a miss means a
    // concurrent mutation (e.g. a swap request arrived) won the race.
    let updated = SlotRepo::update_status_checked(&state.pool, id, slot.status, input.status)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Slot status changed concurrently; reload and retry".into(),
            ))
        })?;

    tracing::info!(
        user_id = auth.user_id,
        slot_id = id,
        status = %updated.status,
        "Slot status changed"
    );

    Ok(Json(updated))
}
