use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Entity not found: {entity} '{key}'")]
    NotFoundByKey { entity: &'static str, key: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Account disabled: {0}")]
    Disabled(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn note_not_found(id: DbId) -> Self {
        Self::NotFound { entity: "Note", id }
    }

    pub fn user_not_found(username: &str) -> Self {
        Self::NotFoundByKey {
            entity: "User",
            key: username.to_string(),
        }
    }

    /// A bearer credential (refresh token, share token) that is unknown,
    /// revoked or expired. Deliberately does not say which.
    pub fn invalid_bearer_token() -> Self {
        Self::Unauthorized("Invalid or expired token".into())
    }
}
