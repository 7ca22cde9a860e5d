use crate::types::DbId;

/// Domain-level errors shared across crates.
///
/// HTTP status mapping lives in the API crate; nothing here knows about
/// transports.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Caller-supplied input was rejected before any side effect.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Validation failure attributed to a single named field.
    pub fn invalid_field(field: &str, reason: impl std::fmt::Display) -> Self {
        Self::Validation(format!("{field} {reason}"))
    }
}
