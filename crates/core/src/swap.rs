//! Swap request lifecycle: `PENDING -> ACCEPTED | REJECTED`.
//!
//! A request is terminal once accepted or rejected; responding to a resolved
//! request is always a conflict.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Status of a swap request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    /// Awaiting a response from the recipient.
    Pending,
    /// Accepted: slot ownership was exchanged.
    Accepted,
    /// Rejected, either by the recipient or by cascading invalidation.
    Rejected,
}

impl RequestStatus {
    /// Wire/storage representation of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Accepted => "ACCEPTED",
            RequestStatus::Rejected => "REJECTED",
        }
    }

    /// Whether the request has been resolved.
    pub fn is_terminal(self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }

    /// Resolve a pending request, returning the terminal status.
    ///
    /// Responding to an already-resolved request is a conflict, which makes
    /// double responses (stale clients, double clicks) fail loudly instead
    /// of silently re-applying.
    pub fn respond(self, accepted: bool) -> Result<RequestStatus, CoreError> {
        if self.is_terminal() {
            return Err(CoreError::Conflict(format!(
                "Swap request has already been resolved ({})",
                self.as_str()
            )));
        }
        Ok(if accepted {
            RequestStatus::Accepted
        } else {
            RequestStatus::Rejected
        })
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(RequestStatus::Pending),
            "ACCEPTED" => Ok(RequestStatus::Accepted),
            "REJECTED" => Ok(RequestStatus::Rejected),
            other => Err(CoreError::Internal(format!(
                "Unknown request status in storage: {other}"
            ))),
        }
    }
}

impl TryFrom<String> for RequestStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_accept_resolves_accepted() {
        assert_eq!(
            RequestStatus::Pending.respond(true).unwrap(),
            RequestStatus::Accepted
        );
    }

    #[test]
    fn test_pending_reject_resolves_rejected() {
        assert_eq!(
            RequestStatus::Pending.respond(false).unwrap(),
            RequestStatus::Rejected
        );
    }

    #[test]
    fn test_terminal_states_refuse_response() {
        for status in [RequestStatus::Accepted, RequestStatus::Rejected] {
            for accepted in [true, false] {
                let result = status.respond(accepted);
                assert!(
                    matches!(result, Err(CoreError::Conflict(_))),
                    "{status} must not accept a second response"
                );
            }
        }
    }

    #[test]
    fn test_only_pending_is_non_terminal() {
        assert!(!RequestStatus::Pending.is_terminal());
        assert!(RequestStatus::Accepted.is_terminal());
        assert!(RequestStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_status_round_trips_through_storage_form() {
        for status in [
            RequestStatus::Pending,
            RequestStatus::Accepted,
            RequestStatus::Rejected,
        ] {
            let parsed: RequestStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }
}
