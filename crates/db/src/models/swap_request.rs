//! Swap request models.

use serde::Serialize;
use slotswap_core::swap::RequestStatus;
use slotswap_core::types::{DbId, Timestamp};
use sqlx::FromRow;

use crate::models::slot::SlotSummary;
use crate::models::user::UserSummary;

/// A row from the `swap_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    pub id: DbId,
    pub requester_id: DbId,
    pub recipient_id: DbId,
    pub requester_slot_id: DbId,
    pub recipient_slot_id: DbId,
    #[sqlx(try_from = "String")]
    pub status: RequestStatus,
    pub responded_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a new swap request.
#[derive(Debug, Clone)]
pub struct CreateSwapRequest {
    pub requester_id: DbId,
    pub requester_slot_id: DbId,
    pub recipient_id: DbId,
    pub recipient_slot_id: DbId,
}

/// Flat join row for request listings (request + both parties + both slots).
#[derive(Debug, Clone, FromRow)]
pub struct SwapRequestDetailRow {
    pub id: DbId,
    #[sqlx(try_from = "String")]
    pub status: RequestStatus,
    pub responded_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub requester_id: DbId,
    pub requester_name: String,
    pub requester_email: String,
    pub recipient_id: DbId,
    pub recipient_name: String,
    pub recipient_email: String,
    pub requester_slot_id: DbId,
    pub requester_slot_title: String,
    pub requester_slot_start: Timestamp,
    pub requester_slot_end: Timestamp,
    pub recipient_slot_id: DbId,
    pub recipient_slot_title: String,
    pub recipient_slot_start: Timestamp,
    pub recipient_slot_end: Timestamp,
}

/// A swap request with populated parties and slots, as listed by the
/// incoming/outgoing endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequestDetail {
    pub id: DbId,
    pub status: RequestStatus,
    pub responded_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub requester: UserSummary,
    pub recipient: UserSummary,
    pub requester_slot: SlotSummary,
    pub recipient_slot: SlotSummary,
}

impl From<SwapRequestDetailRow> for SwapRequestDetail {
    fn from(row: SwapRequestDetailRow) -> Self {
        SwapRequestDetail {
            id: row.id,
            status: row.status,
            responded_at: row.responded_at,
            created_at: row.created_at,
            requester: UserSummary {
                id: row.requester_id,
                name: row.requester_name,
                email: row.requester_email,
            },
            recipient: UserSummary {
                id: row.recipient_id,
                name: row.recipient_name,
                email: row.recipient_email,
            },
            requester_slot: SlotSummary {
                id: row.requester_slot_id,
                title: row.requester_slot_title,
                start_time: row.requester_slot_start,
                end_time: row.requester_slot_end,
            },
            recipient_slot: SlotSummary {
                id: row.recipient_slot_id,
                title: row.recipient_slot_title,
                start_time: row.recipient_slot_start,
                end_time: row.recipient_slot_end,
            },
        }
    }
}
