//! Shared query parameter types for API handlers.

use notekeep_core::note_filter::{NoteCriteria, NoteSort};
use notekeep_core::paging::PageRequest;
use serde::Deserialize;

use crate::error::AppResult;

/// Pagination parameters (`?page=&size=`). `page` is zero-based.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

impl PageParams {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.size)
    }
}

/// Query parameters for note listings: criteria, paging and `sort=field,dir`.
///
/// Kept flat because `serde(flatten)` does not cooperate with numeric and
/// boolean fields in query strings.
#[derive(Debug, Default, Deserialize)]
pub struct NoteListParams {
    pub search: Option<String>,
    pub color: Option<String>,
    pub pinned: Option<bool>,
    pub tag: Option<String>,
    /// Owner username; honoured by admin listings only.
    pub owner: Option<String>,
    /// Admin listings only: list trashed notes instead of active ones.
    #[serde(default)]
    pub trashed: bool,
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub sort: Option<String>,
}

impl NoteListParams {
    pub fn criteria(&self) -> NoteCriteria {
        NoteCriteria {
            search: self.search.clone(),
            color: self.color.clone(),
            pinned: self.pinned,
            tag: self.tag.clone(),
            owner: self.owner.clone(),
        }
    }

    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.size)
    }

    pub fn sort(&self) -> AppResult<NoteSort> {
        Ok(NoteSort::parse(self.sort.as_deref())?)
    }
}
