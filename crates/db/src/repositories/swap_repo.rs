//! Repository for the `swap_requests` table.

use sqlx::{PgConnection, PgExecutor, PgPool};

use slotswap_core::swap::RequestStatus;
use slotswap_core::types::DbId;

use crate::models::swap_request::{CreateSwapRequest, SwapRequest, SwapRequestDetailRow};

/// Column list for swap_requests queries.
const REQUEST_COLUMNS: &str = "id, requester_id, recipient_id, requester_slot_id, \
    recipient_slot_id, status, responded_at, created_at, updated_at";

/// Join projection shared by the incoming/outgoing listings.
const DETAIL_SELECT: &str = "SELECT
        r.id,
        r.status,
        r.responded_at,
        r.created_at,
        req.id AS requester_id,
        req.name AS requester_name,
        req.email AS requester_email,
        rec.id AS recipient_id,
        rec.name AS recipient_name,
        rec.email AS recipient_email,
        rs.id AS requester_slot_id,
        rs.title AS requester_slot_title,
        rs.start_time AS requester_slot_start,
        rs.end_time AS requester_slot_end,
        cs.id AS recipient_slot_id,
        cs.title AS recipient_slot_title,
        cs.start_time AS recipient_slot_start,
        cs.end_time AS recipient_slot_end
     FROM swap_requests r
     JOIN users req ON req.id = r.requester_id
     JOIN users rec ON rec.id = r.recipient_id
     JOIN slots rs ON rs.id = r.requester_slot_id
     JOIN slots cs ON cs.id = r.recipient_slot_id";

/// Provides operations for swap requests.
pub struct SwapRepo;

impl SwapRepo {
    /// Insert a new pending swap request, returning the created row.
    pub async fn create(
        executor: impl PgExecutor<'_>,
        input: &CreateSwapRequest,
    ) -> Result<SwapRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO swap_requests
                (requester_id, requester_slot_id, recipient_id, recipient_slot_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {REQUEST_COLUMNS}"
        );
        sqlx::query_as::<_, SwapRequest>(&query)
            .bind(input.requester_id)
            .bind(input.requester_slot_id)
            .bind(input.recipient_id)
            .bind(input.recipient_slot_id)
            .fetch_one(executor)
            .await
    }

    /// Find a request by id, taking a row lock for the rest of the
    /// transaction. This serializes concurrent responses to one request.
    pub async fn find_by_id_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<SwapRequest>, sqlx::Error> {
        let query = format!("SELECT {REQUEST_COLUMNS} FROM swap_requests WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, SwapRequest>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// List requests where the user is the recipient, newest first.
    pub async fn list_incoming(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<SwapRequestDetailRow>, sqlx::Error> {
        let query = format!("{DETAIL_SELECT} WHERE r.recipient_id = $1 ORDER BY r.created_at DESC");
        sqlx::query_as::<_, SwapRequestDetailRow>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// List requests where the user is the requester, newest first.
    pub async fn list_outgoing(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<SwapRequestDetailRow>, sqlx::Error> {
        let query = format!("{DETAIL_SELECT} WHERE r.requester_id = $1 ORDER BY r.created_at DESC");
        sqlx::query_as::<_, SwapRequestDetailRow>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Compare-and-set a pending request to a terminal status.
    ///
    /// Returns the updated row, or `None` when the request was already
    /// resolved (double response, or cascade got there first).
    pub async fn mark_responded(
        executor: impl PgExecutor<'_>,
        id: DbId,
        status: RequestStatus,
    ) -> Result<Option<SwapRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE swap_requests
             SET status = $2, responded_at = now(), updated_at = now()
             WHERE id = $1 AND status = 'PENDING'
             RETURNING {REQUEST_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, SwapRequest>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(executor)
            .await?;
        if updated.is_none() {
            tracing::debug!(request_id = id, "Request already resolved; CAS missed");
        }
        Ok(updated)
    }

    /// Cascading invalidation: reject every other pending request that
    /// references either of the two slots just exchanged.
    ///
    /// Returns the rejected rows so the caller can release their slots.
    pub async fn reject_other_pending_for_slots(
        executor: impl PgExecutor<'_>,
        slot_a: DbId,
        slot_b: DbId,
        except_request_id: DbId,
    ) -> Result<Vec<SwapRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE swap_requests
             SET status = 'REJECTED', responded_at = now(), updated_at = now()
             WHERE status = 'PENDING'
               AND id <> $3
               AND (requester_slot_id IN ($1, $2) OR recipient_slot_id IN ($1, $2))
             RETURNING {REQUEST_COLUMNS}"
        );
        let rejected = sqlx::query_as::<_, SwapRequest>(&query)
            .bind(slot_a)
            .bind(slot_b)
            .bind(except_request_id)
            .fetch_all(executor)
            .await?;
        if !rejected.is_empty() {
            tracing::debug!(
                slot_a,
                slot_b,
                rejected = rejected.len(),
                "Cascade-rejected pending requests"
            );
        }
        Ok(rejected)
    }
}
