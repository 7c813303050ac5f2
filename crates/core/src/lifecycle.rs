//! Note lifecycle: Active -> SoftDeleted -> Purged.
//!
//! Restore moves a note from SoftDeleted back to Active. Purging is only
//! legal from SoftDeleted and is irreversible.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Upper bound on ids accepted by one bulk request.
pub const MAX_BULK_IDS: usize = 100;

/// Lifecycle state of a persisted note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteState {
    Active,
    SoftDeleted,
}

impl NoteState {
    pub fn from_deleted_flag(deleted: bool) -> Self {
        if deleted {
            NoteState::SoftDeleted
        } else {
            NoteState::Active
        }
    }
}

/// Guard for permanent deletion.
pub fn ensure_purgeable(id: DbId, state: NoteState) -> Result<(), CoreError> {
    match state {
        NoteState::SoftDeleted => Ok(()),
        NoteState::Active => Err(CoreError::InvalidOperation(format!(
            "Note {id} must be moved to trash before it can be deleted permanently"
        ))),
    }
}

/// Actions accepted by `POST /notes/bulk`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BulkAction {
    DeleteSoft,
    Restore,
    DeleteForever,
}

impl BulkAction {
    /// State a note must currently be in for this action to apply.
    pub fn required_state(self) -> NoteState {
        match self {
            BulkAction::DeleteSoft => NoteState::Active,
            BulkAction::Restore | BulkAction::DeleteForever => NoteState::SoftDeleted,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BulkAction::DeleteSoft => "DELETE_SOFT",
            BulkAction::Restore => "RESTORE",
            BulkAction::DeleteForever => "DELETE_FOREVER",
        }
    }
}

/// In-memory partition of a bulk request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkPlan {
    /// Ids the batch statement will be applied to.
    pub eligible: Vec<DbId>,
    /// Ids that were not found or are in the wrong state for the action.
    pub failed: Vec<DbId>,
}

/// Partition `requested` ids against the notes that were actually `found`
/// (id, current state). Duplicate ids in the request are collapsed and the
/// request order is kept in both buckets.
pub fn plan_bulk(action: BulkAction, requested: &[DbId], found: &[(DbId, NoteState)]) -> BulkPlan {
    let states: HashMap<DbId, NoteState> = found.iter().copied().collect();
    let mut seen = HashSet::new();
    let mut plan = BulkPlan::default();

    for &id in requested {
        if !seen.insert(id) {
            continue;
        }
        match states.get(&id) {
            Some(&state) if state == action.required_state() => plan.eligible.push(id),
            _ => plan.failed.push(id),
        }
    }
    plan
}

/// Response body for a bulk action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkResult {
    pub processed_count: u64,
    pub failed_ids: Vec<DbId>,
}

/// Validate the size of a bulk id set.
pub fn validate_bulk_ids(ids: &[DbId]) -> Result<(), CoreError> {
    if ids.len() > MAX_BULK_IDS {
        return Err(CoreError::Validation(format!(
            "At most {MAX_BULK_IDS} ids may be processed in one bulk request"
        )));
    }
    Ok(())
}
