//! Owner/admin authorization predicates for notes.
//!
//! The request principal is resolved once at the HTTP boundary and passed
//! into every authorization-sensitive call.

use crate::error::CoreError;
use crate::roles::ROLE_ADMIN;
use crate::types::DbId;

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: DbId,
    pub username: String,
    pub roles: Vec<String>,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r == ROLE_ADMIN)
    }
}

/// Read access: admins bypass, everybody else must own the note.
pub fn ensure_read_access(principal: Option<&Principal>, owner: &str) -> Result<(), CoreError> {
    if principal.is_some_and(Principal::is_admin) {
        return Ok(());
    }
    ensure_edit_access(principal, owner)
}

/// Edit access: the principal must be the note owner. Admins are not exempt.
pub fn ensure_edit_access(principal: Option<&Principal>, owner: &str) -> Result<(), CoreError> {
    let principal = principal
        .ok_or_else(|| CoreError::Unauthorized("No authenticated user".into()))?;
    if principal.username != owner {
        return Err(CoreError::Forbidden(
            "You do not have access to this note".into(),
        ));
    }
    Ok(())
}
