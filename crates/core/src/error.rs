//! Domain-level error type shared by every crate in the workspace.

use crate::types::DbId;

/// Errors raised by domain validation and entity lookups.
///
/// The HTTP layer maps each variant onto a status code; nothing here knows
/// about HTTP.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A tenant-scoped entity (session, client, account) does not exist or
    /// belongs to another account.
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Caller-supplied input failed a domain rule.
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
    /// Shorthand for [`CoreError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
