//! Handlers for the `/swap` resource: marketplace listing, request creation,
//! and the accept/reject workflow.
//!
//! The server is the sole authority for the negotiation state machine. Every
//! mutation here runs inside a single transaction with `FOR UPDATE` row locks
//! and compare-and-set status updates, so two users racing on the same slot
//! get a clean 409 instead of corrupted state.

use std::collections::BTreeSet;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use slotswap_core::error::CoreError;
use slotswap_core::slot::SlotStatus;
use slotswap_core::types::DbId;
use slotswap_db::models::slot::{MarketplaceSlot, Slot};
use slotswap_db::models::swap_request::{CreateSwapRequest, SwapRequest, SwapRequestDetail};
use slotswap_db::repositories::{SlotRepo, SwapRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Request body for `POST /swap/request`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSwapRequestBody {
    pub my_slot_id: DbId,
    pub their_slot_id: DbId,
}

/// Request body for `POST /swap/response/{request_id}`.
#[derive(Debug, Deserialize)]
pub struct SwapResponseBody {
    pub accepted: bool,
}

/// GET /api/v1/swap/swappable-slots
///
/// List all `SWAPPABLE` slots owned by other users, with owner info.
pub async fn list_swappable_slots(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<MarketplaceSlot>>> {
    let rows = SlotRepo::list_swappable_excluding(&state.pool, auth.user_id).await?;
    let slots = rows.into_iter().map(MarketplaceSlot::from).collect();
    Ok(Json(slots))
}

/// GET /api/v1/swap/requests/incoming
///
/// Requests where the caller is the recipient.
pub async fn list_incoming_requests(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<SwapRequestDetail>>> {
    let rows = SwapRepo::list_incoming(&state.pool, auth.user_id).await?;
    Ok(Json(rows.into_iter().map(SwapRequestDetail::from).collect()))
}

/// GET /api/v1/swap/requests/outgoing
///
/// Requests where the caller is the requester.
pub async fn list_outgoing_requests(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<SwapRequestDetail>>> {
    let rows = SwapRepo::list_outgoing(&state.pool, auth.user_id).await?;
    Ok(Json(rows.into_iter().map(SwapRequestDetail::from).collect()))
}

/// POST /api/v1/swap/request
///
/// Propose exchanging one of the caller's `SWAPPABLE` slots for another
/// user's `SWAPPABLE` slot. Both slots move to `SWAP_PENDING` atomically
/// with the request insert; a racing second request against either slot
/// loses the compare-and-set and gets a 409.
pub async fn create_swap_request(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateSwapRequestBody>,
) -> AppResult<impl IntoResponse> {
    if input.my_slot_id == input.their_slot_id {
        return Err(AppError::Core(CoreError::Validation(
            "Cannot swap a slot with itself".into(),
        )));
    }

    let mut tx = state.pool.begin().await?;

    // Lock both slots in id order so concurrent requests cannot deadlock.
    let (first, second) = if input.my_slot_id < input.their_slot_id {
        (input.my_slot_id, input.their_slot_id)
    } else {
        (input.their_slot_id, input.my_slot_id)
    };
    let slot_first = SlotRepo::find_by_id_for_update(&mut tx, first).await?;
    let slot_second = SlotRepo::find_by_id_for_update(&mut tx, second).await?;

    let (my_slot, their_slot) = if first == input.my_slot_id {
        (slot_first, slot_second)
    } else {
        (slot_second, slot_first)
    };

    let my_slot = my_slot.ok_or(AppError::Core(CoreError::NotFound {
        entity: "Slot",
        id: input.my_slot_id,
    }))?;
    let their_slot = their_slot.ok_or(AppError::Core(CoreError::NotFound {
        entity: "Slot",
        id: input.their_slot_id,
    }))?;

    if my_slot.owner_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You can only offer a slot you own".into(),
        )));
    }
    if their_slot.owner_id == auth.user_id {
        return Err(AppError::Core(CoreError::Validation(
            "Cannot request a swap against your own slot".into(),
        )));
    }
    if my_slot.status != SlotStatus::Swappable {
        return Err(AppError::Core(CoreError::Conflict(
            "Your offered slot is not swappable".into(),
        )));
    }
    if their_slot.status != SlotStatus::Swappable {
        return Err(AppError::Core(CoreError::Conflict(
            "That slot is no longer swappable".into(),
        )));
    }

    // Both slots are locked and verified SWAPPABLE; move them to
    // SWAP_PENDING and insert the request in the same transaction.
    lock_slot_for_swap(&mut tx, my_slot.id).await?;
    lock_slot_for_swap(&mut tx, their_slot.id).await?;

    let request = SwapRepo::create(
        &mut *tx,
        &CreateSwapRequest {
            requester_id: auth.user_id,
            requester_slot_id: my_slot.id,
            recipient_id: their_slot.owner_id,
            recipient_slot_id: their_slot.id,
        },
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        request_id = request.id,
        requester_id = auth.user_id,
        recipient_id = request.recipient_id,
        "Swap request created"
    );

    Ok((StatusCode::CREATED, Json(request)))
}

/// POST /api/v1/swap/response/{request_id}
///
/// Accept or reject a pending swap request. Only the recipient may respond,
/// and only once.
///
/// Accept exchanges ownership of the two slots and sets both to `BUSY`,
/// then cascade-rejects any other pending request referencing either slot.
/// Reject returns each slot to `SWAPPABLE` unless another pending request
/// still references it.
pub async fn respond_to_swap(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(request_id): Path<DbId>,
    Json(input): Json<SwapResponseBody>,
) -> AppResult<Json<SwapRequest>> {
    let mut tx = state.pool.begin().await?;

    let request = SwapRepo::find_by_id_for_update(&mut tx, request_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "SwapRequest",
            id: request_id,
        }))?;

    if request.recipient_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the recipient can respond to this request".into(),
        )));
    }

    // Terminal requests refuse a second response.
    let new_status = request.status.respond(input.accepted)?;

    // Lock both slots in id order, same as request creation.
    let (first, second) = if request.requester_slot_id < request.recipient_slot_id {
        (request.requester_slot_id, request.recipient_slot_id)
    } else {
        (request.recipient_slot_id, request.requester_slot_id)
    };
    SlotRepo::find_by_id_for_update(&mut tx, first).await?;
    SlotRepo::find_by_id_for_update(&mut tx, second).await?;

    let updated = if input.accepted {
        apply_accept(&mut tx, &request).await?
    } else {
        apply_reject(&mut tx, &request).await?
    };

    tx.commit().await?;

    tracing::info!(
        request_id,
        recipient_id = auth.user_id,
        status = %new_status,
        "Swap request resolved"
    );

    Ok(Json(updated))
}

// ---------------------------------------------------------------------------
// Workflow steps
// ---------------------------------------------------------------------------

/// CAS a slot from `SWAPPABLE` to `SWAP_PENDING`, treating a miss as a
/// concurrent-mutation conflict.
async fn lock_slot_for_swap(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    slot_id: DbId,
) -> AppResult<Slot> {
    SlotRepo::update_status_checked(
        &mut **tx,
        slot_id,
        SlotStatus::Swappable,
        SlotStatus::SwapPending,
    )
    .await?
    .ok_or_else(|| {
        AppError::Core(CoreError::Conflict(
            "Slot state changed concurrently; reload and retry".into(),
        ))
    })
}

/// Accept: exchange ownership, set both slots `BUSY`, mark the request
/// `ACCEPTED`, then cascade-reject other pending requests on either slot.
async fn apply_accept(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    request: &SwapRequest,
) -> AppResult<SwapRequest> {
    use slotswap_core::swap::RequestStatus;

    // The requester's slot goes to the recipient and vice versa. Both must
    // still be SWAP_PENDING; anything else means the state machine was
    // bypassed and the whole transaction rolls back.
    transfer_slot(tx, request.requester_slot_id, request.recipient_id).await?;
    transfer_slot(tx, request.recipient_slot_id, request.requester_id).await?;

    let updated = SwapRepo::mark_responded(&mut **tx, request.id, RequestStatus::Accepted)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Swap request has already been resolved".into(),
            ))
        })?;

    // Cascading invalidation: any other pending request referencing either
    // slot is now moot.
    let cascaded = SwapRepo::reject_other_pending_for_slots(
        &mut **tx,
        request.requester_slot_id,
        request.recipient_slot_id,
        request.id,
    )
    .await?;

    // Release the cascaded requests' other slots back to SWAPPABLE where no
    // pending request remains. The two just-swapped slots are BUSY and are
    // not touched by the guarded update.
    let mut affected: BTreeSet<DbId> = BTreeSet::new();
    for rejected in &cascaded {
        affected.insert(rejected.requester_slot_id);
        affected.insert(rejected.recipient_slot_id);
    }
    affected.remove(&request.requester_slot_id);
    affected.remove(&request.recipient_slot_id);

    for slot_id in affected {
        SlotRepo::release_if_unreferenced(&mut **tx, slot_id).await?;
    }

    if !cascaded.is_empty() {
        tracing::info!(
            request_id = request.id,
            cascaded = cascaded.len(),
            "Cascade-rejected competing swap requests"
        );
    }

    Ok(updated)
}

/// Reject: mark the request `REJECTED` and release both slots back to
/// `SWAPPABLE` where no other pending request references them.
async fn apply_reject(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    request: &SwapRequest,
) -> AppResult<SwapRequest> {
    use slotswap_core::swap::RequestStatus;

    let updated = SwapRepo::mark_responded(&mut **tx, request.id, RequestStatus::Rejected)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Swap request has already been resolved".into(),
            ))
        })?;

    SlotRepo::release_if_unreferenced(&mut **tx, request.requester_slot_id).await?;
    SlotRepo::release_if_unreferenced(&mut **tx, request.recipient_slot_id).await?;

    Ok(updated)
}

/// CAS one slot from `SWAP_PENDING` to `BUSY` under its new owner.
async fn transfer_slot(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    slot_id: DbId,
    new_owner_id: DbId,
) -> AppResult<Slot> {
    SlotRepo::transfer_checked(
        &mut **tx,
        slot_id,
        new_owner_id,
        SlotStatus::SwapPending,
        SlotStatus::Busy,
    )
    .await?
    .ok_or_else(|| {
        AppError::Core(CoreError::Conflict(
            "Slot state changed concurrently; reload and retry".into(),
        ))
    })
}
