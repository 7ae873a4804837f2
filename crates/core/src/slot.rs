//! Slot status domain and transition rules.
//!
//! A slot is a user's calendar event. Its status controls what the owner and
//! the swap workflow may do with it:
//!
//! ```text
//! BUSY <-> SWAPPABLE            owner-initiated, always allowed
//! SWAPPABLE -> SWAP_PENDING     swap request created against the slot
//! SWAP_PENDING -> BUSY          swap request accepted (ownership exchanged)
//! SWAP_PENDING -> SWAPPABLE     swap request rejected, no other request left
//! ```
//!
//! Owners may never mutate a `SWAP_PENDING` slot directly; it is released
//! only by resolving the request that locked it.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Status of a calendar slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlotStatus {
    /// The slot is a plain calendar entry, not offered for exchange.
    Busy,
    /// The owner offers the slot for exchange.
    Swappable,
    /// The slot is referenced by a pending swap request and locked.
    SwapPending,
}

impl SlotStatus {
    /// Wire/storage representation of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            SlotStatus::Busy => "BUSY",
            SlotStatus::Swappable => "SWAPPABLE",
            SlotStatus::SwapPending => "SWAP_PENDING",
        }
    }

    /// Validate an owner-initiated status change.
    ///
    /// Only `BUSY <-> SWAPPABLE` is permitted. A `SWAP_PENDING` slot is
    /// locked by its request and yields a conflict; every other combination
    /// is a validation error.
    pub fn validate_owner_transition(self, to: SlotStatus) -> Result<(), CoreError> {
        match (self, to) {
            (SlotStatus::Busy, SlotStatus::Swappable)
            | (SlotStatus::Swappable, SlotStatus::Busy) => Ok(()),
            (SlotStatus::SwapPending, _) => Err(CoreError::Conflict(
                "Slot is locked by a pending swap request".to_string(),
            )),
            (_, SlotStatus::SwapPending) => Err(CoreError::Validation(
                "Slot status cannot be set to SWAP_PENDING directly".to_string(),
            )),
            (from, to) => Err(CoreError::Validation(format!(
                "Invalid slot status transition: {} -> {}",
                from.as_str(),
                to.as_str()
            ))),
        }
    }
}

impl std::fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SlotStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BUSY" => Ok(SlotStatus::Busy),
            "SWAPPABLE" => Ok(SlotStatus::Swappable),
            "SWAP_PENDING" => Ok(SlotStatus::SwapPending),
            other => Err(CoreError::Internal(format!(
                "Unknown slot status in storage: {other}"
            ))),
        }
    }
}

impl TryFrom<String> for SlotStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Validate that a slot's time range is well-formed (start strictly before end).
pub fn validate_slot_times(start_time: Timestamp, end_time: Timestamp) -> Result<(), CoreError> {
    if start_time >= end_time {
        return Err(CoreError::Validation(
            "Slot start time must be before end time".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_owner_can_toggle_busy_and_swappable() {
        assert!(SlotStatus::Busy
            .validate_owner_transition(SlotStatus::Swappable)
            .is_ok());
        assert!(SlotStatus::Swappable
            .validate_owner_transition(SlotStatus::Busy)
            .is_ok());
    }

    #[test]
    fn test_pending_slot_is_locked() {
        for to in [SlotStatus::Busy, SlotStatus::Swappable, SlotStatus::SwapPending] {
            let result = SlotStatus::SwapPending.validate_owner_transition(to);
            assert!(
                matches!(result, Err(CoreError::Conflict(_))),
                "SWAP_PENDING -> {to} must be a conflict"
            );
        }
    }

    #[test]
    fn test_owner_cannot_set_swap_pending() {
        for from in [SlotStatus::Busy, SlotStatus::Swappable] {
            let result = from.validate_owner_transition(SlotStatus::SwapPending);
            assert!(
                matches!(result, Err(CoreError::Validation(_))),
                "{from} -> SWAP_PENDING must be refused"
            );
        }
    }

    #[test]
    fn test_noop_transition_refused() {
        assert!(SlotStatus::Busy
            .validate_owner_transition(SlotStatus::Busy)
            .is_err());
        assert!(SlotStatus::Swappable
            .validate_owner_transition(SlotStatus::Swappable)
            .is_err());
    }

    #[test]
    fn test_status_round_trips_through_storage_form() {
        for status in [SlotStatus::Busy, SlotStatus::Swappable, SlotStatus::SwapPending] {
            let parsed: SlotStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_unknown_status_string_rejected() {
        assert!("FREE".parse::<SlotStatus>().is_err());
        assert!("".parse::<SlotStatus>().is_err());
    }

    #[test]
    fn test_serde_uses_screaming_snake_case() {
        let json = serde_json::to_string(&SlotStatus::SwapPending).unwrap();
        assert_eq!(json, "\"SWAP_PENDING\"");

        let status: SlotStatus = serde_json::from_str("\"SWAPPABLE\"").unwrap();
        assert_eq!(status, SlotStatus::Swappable);
    }

    #[test]
    fn test_slot_times_must_be_ordered() {
        let now = Utc::now();
        assert!(validate_slot_times(now, now + Duration::hours(1)).is_ok());
        assert!(validate_slot_times(now, now).is_err());
        assert!(validate_slot_times(now + Duration::hours(1), now).is_err());
    }
}
