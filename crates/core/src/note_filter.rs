//! Note search criteria and ordering.
//!
//! Criteria are turned into a flat list of [`NoteFilter`] predicates that the
//! repository combines with `AND`. A missing or blank criterion contributes no
//! predicate at all.

use serde::Deserialize;

use crate::error::CoreError;
use crate::tags::normalize_tag_name;

/// Optional search criteria accepted by the list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteCriteria {
    /// Case-insensitive substring over title and content.
    pub search: Option<String>,
    /// Exact color match (e.g. `#FFAA00`).
    pub color: Option<String>,
    pub pinned: Option<bool>,
    /// Tag-name membership.
    pub tag: Option<String>,
    /// Owner username. Only honoured for admin listings.
    pub owner: Option<String>,
}

/// A single predicate over the `notes` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteFilter {
    NotDeleted,
    Deleted,
    /// Lowercased needle, matched against lowercased title and content.
    TextContains(String),
    ColorEquals(String),
    Pinned(bool),
    /// Normalized tag name.
    HasTag(String),
    OwnedBy(String),
}

/// Which side of the trash a listing looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Active,
    Trashed,
}

/// Build the predicate list for a listing.
///
/// `owner_scope` is the username the listing is restricted to; `None` only for
/// admin-wide listings, in which case the criteria's own `owner` is honoured.
pub fn compose_filters(
    visibility: Visibility,
    owner_scope: Option<&str>,
    criteria: &NoteCriteria,
) -> Vec<NoteFilter> {
    let mut filters = vec![match visibility {
        Visibility::Active => NoteFilter::NotDeleted,
        Visibility::Trashed => NoteFilter::Deleted,
    }];

    let owner = owner_scope.or_else(|| non_blank(criteria.owner.as_deref()));
    if let Some(owner) = owner {
        filters.push(NoteFilter::OwnedBy(owner.to_string()));
    }
    if let Some(text) = non_blank(criteria.search.as_deref()) {
        filters.push(NoteFilter::TextContains(text.to_lowercase()));
    }
    if let Some(color) = non_blank(criteria.color.as_deref()) {
        filters.push(NoteFilter::ColorEquals(color.to_string()));
    }
    if let Some(pinned) = criteria.pinned {
        filters.push(NoteFilter::Pinned(pinned));
    }
    if let Some(tag) = criteria.tag.as_deref().and_then(normalize_tag_name) {
        filters.push(NoteFilter::HasTag(tag));
    }
    filters
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// Columns a caller may sort by. Pinned notes always come first regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    Title,
    Color,
}

impl SortField {
    pub fn column(self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::Title => "title",
            SortField::Color => "color",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn keyword(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Tiebreak ordering applied after `pinned DESC`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteSort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for NoteSort {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

impl NoteSort {
    /// Parse `field[,direction]`, e.g. `title,asc` or `updated_at`.
    ///
    /// Absent or blank input yields the default (`created_at,desc`). A field
    /// without a direction sorts ascending.
    pub fn parse(raw: Option<&str>) -> Result<Self, CoreError> {
        let Some(raw) = non_blank(raw) else {
            return Ok(Self::default());
        };
        let (field, direction) = match raw.split_once(',') {
            Some((f, d)) => (f.trim(), Some(d.trim())),
            None => (raw, None),
        };
        let field = match field.to_ascii_lowercase().as_str() {
            "created_at" | "createdat" | "created_date" | "createddate" => SortField::CreatedAt,
            "updated_at" | "updatedat" | "modified_date" | "modifieddate" => SortField::UpdatedAt,
            "title" => SortField::Title,
            "color" => SortField::Color,
            other => {
                return Err(CoreError::Validation(format!(
                    "Unsupported sort field '{other}'"
                )))
            }
        };
        let direction = match direction.map(str::to_ascii_lowercase).as_deref() {
            None | Some("") | Some("asc") => SortDirection::Asc,
            Some("desc") => SortDirection::Desc,
            Some(other) => {
                return Err(CoreError::Validation(format!(
                    "Unsupported sort direction '{other}'"
                )))
            }
        };
        Ok(Self { field, direction })
    }
}
