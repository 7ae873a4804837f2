use crate::types::DbId;

/// Domain-level errors shared by the db and api layers.
///
/// Variants map one-to-one onto HTTP statuses at the API boundary. The
/// carried messages are shown to the end user as-is, so they are written
/// in plain language rather than as diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
