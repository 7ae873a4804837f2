//! Repository for the `slots` table.
//!
//! Every status mutation here is compare-and-set: the `UPDATE` carries the
//! expected pre-state in its `WHERE` clause and returns `None` when the row
//! has moved on, so concurrent mutations surface as conflicts instead of
//! silently overwriting each other. Functions used inside the swap workflow
//! take an [`sqlx::PgExecutor`] so they run on a plain pool or inside a
//! transaction.

use sqlx::{PgConnection, PgExecutor, PgPool};

use slotswap_core::slot::SlotStatus;
use slotswap_core::types::DbId;

use crate::models::slot::{CreateSlot, MarketplaceSlotRow, Slot};

/// Column list for slots queries.
const SLOT_COLUMNS: &str = "id, owner_id, title, start_time, end_time, status, \
    created_at, updated_at";

/// Provides CRUD and compare-and-set operations for calendar slots.
pub struct SlotRepo;

impl SlotRepo {
    /// Insert a new slot with the default `BUSY` status, returning the row.
    pub async fn create(pool: &PgPool, input: &CreateSlot) -> Result<Slot, sqlx::Error> {
        let query = format!(
            "INSERT INTO slots (owner_id, title, start_time, end_time)
             VALUES ($1, $2, $3, $4)
             RETURNING {SLOT_COLUMNS}"
        );
        sqlx::query_as::<_, Slot>(&query)
            .bind(input.owner_id)
            .bind(&input.title)
            .bind(input.start_time)
            .bind(input.end_time)
            .fetch_one(pool)
            .await
    }

    /// List a user's own slots, newest first.
    pub async fn list_for_owner(pool: &PgPool, owner_id: DbId) -> Result<Vec<Slot>, sqlx::Error> {
        let query = format!(
            "SELECT {SLOT_COLUMNS} FROM slots
             WHERE owner_id = $1
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Slot>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Find a slot by id.
    pub async fn find_by_id(
        executor: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<Slot>, sqlx::Error> {
        let query = format!("SELECT {SLOT_COLUMNS} FROM slots WHERE id = $1");
        sqlx::query_as::<_, Slot>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find a slot by id, taking a row lock for the rest of the transaction.
    pub async fn find_by_id_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Slot>, sqlx::Error> {
        let query = format!("SELECT {SLOT_COLUMNS} FROM slots WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Slot>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// List all `SWAPPABLE` slots not owned by the given user, with owner
    /// info, soonest first. This is the marketplace view.
    pub async fn list_swappable_excluding(
        pool: &PgPool,
        excluded_owner_id: DbId,
    ) -> Result<Vec<MarketplaceSlotRow>, sqlx::Error> {
        sqlx::query_as::<_, MarketplaceSlotRow>(
            "SELECT
                s.id,
                s.title,
                s.start_time,
                s.end_time,
                s.status,
                u.id AS owner_id,
                u.name AS owner_name,
                u.email AS owner_email
             FROM slots s
             JOIN users u ON u.id = s.owner_id
             WHERE s.status = 'SWAPPABLE'
               AND s.owner_id <> $1
             ORDER BY s.start_time ASC",
        )
        .bind(excluded_owner_id)
        .fetch_all(pool)
        .await
    }

    /// Compare-and-set a slot's status.
    ///
    /// Returns the updated row, or `None` when the slot no longer holds the
    /// expected status (concurrent mutation).
    pub async fn update_status_checked(
        executor: impl PgExecutor<'_>,
        id: DbId,
        expected: SlotStatus,
        new_status: SlotStatus,
    ) -> Result<Option<Slot>, sqlx::Error> {
        let query = format!(
            "UPDATE slots
             SET status = $3, updated_at = now()
             WHERE id = $1 AND status = $2
             RETURNING {SLOT_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Slot>(&query)
            .bind(id)
            .bind(expected.as_str())
            .bind(new_status.as_str())
            .fetch_optional(executor)
            .await?;
        if updated.is_none() {
            tracing::debug!(
                slot_id = id,
                expected = %expected,
                "Slot status CAS missed; row no longer holds expected status"
            );
        }
        Ok(updated)
    }

    /// Compare-and-set ownership and status together (swap acceptance).
    ///
    /// Returns `None` when the slot no longer holds the expected status.
    pub async fn transfer_checked(
        executor: impl PgExecutor<'_>,
        id: DbId,
        new_owner_id: DbId,
        expected: SlotStatus,
        new_status: SlotStatus,
    ) -> Result<Option<Slot>, sqlx::Error> {
        let query = format!(
            "UPDATE slots
             SET owner_id = $2, status = $4, updated_at = now()
             WHERE id = $1 AND status = $3
             RETURNING {SLOT_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Slot>(&query)
            .bind(id)
            .bind(new_owner_id)
            .bind(expected.as_str())
            .bind(new_status.as_str())
            .fetch_optional(executor)
            .await?;
        if updated.is_none() {
            tracing::debug!(
                slot_id = id,
                expected = %expected,
                "Slot transfer CAS missed; row no longer holds expected status"
            );
        }
        Ok(updated)
    }

    /// Revert a `SWAP_PENDING` slot to `SWAPPABLE` if no pending request
    /// still references it. Returns whether the slot was released.
    ///
    /// The `NOT EXISTS` guard and the status check run in one statement, so
    /// the decision is atomic with the update.
    pub async fn release_if_unreferenced(
        executor: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE slots
             SET status = 'SWAPPABLE', updated_at = now()
             WHERE id = $1
               AND status = 'SWAP_PENDING'
               AND NOT EXISTS (
                   SELECT 1 FROM swap_requests r
                   WHERE r.status = 'PENDING'
                     AND (r.requester_slot_id = $1 OR r.recipient_slot_id = $1)
               )",
        )
        .bind(id)
        .execute(executor)
        .await?;
        let released = result.rows_affected() > 0;
        tracing::debug!(slot_id = id, released, "Guarded slot release");
        Ok(released)
    }
}
