//! Calendar slot models.
//!
//! API-facing structs serialize with camelCase keys to match the wire
//! contract the web client consumes.

use serde::Serialize;
use slotswap_core::slot::SlotStatus;
use slotswap_core::types::{DbId, Timestamp};
use sqlx::FromRow;

use crate::models::user::UserSummary;

/// A row from the `slots` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub id: DbId,
    pub owner_id: DbId,
    pub title: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    #[sqlx(try_from = "String")]
    pub status: SlotStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Compact slot info embedded in swap request responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotSummary {
    pub id: DbId,
    pub title: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
}

/// DTO for inserting a new slot. Status always starts at `BUSY`.
#[derive(Debug, Clone)]
pub struct CreateSlot {
    pub owner_id: DbId,
    pub title: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
}

/// Flat join row for the marketplace listing (slot + owner columns).
#[derive(Debug, Clone, FromRow)]
pub struct MarketplaceSlotRow {
    pub id: DbId,
    pub title: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    #[sqlx(try_from = "String")]
    pub status: SlotStatus,
    pub owner_id: DbId,
    pub owner_name: String,
    pub owner_email: String,
}

/// A swappable slot with its owner, as shown in the marketplace.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceSlot {
    pub id: DbId,
    pub title: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub status: SlotStatus,
    pub owner: UserSummary,
}

impl From<MarketplaceSlotRow> for MarketplaceSlot {
    fn from(row: MarketplaceSlotRow) -> Self {
        MarketplaceSlot {
            id: row.id,
            title: row.title,
            start_time: row.start_time,
            end_time: row.end_time,
            status: row.status,
            owner: UserSummary {
                id: row.owner_id,
                name: row.owner_name,
                email: row.owner_email,
            },
        }
    }
}
