//! Tag-name normalization.
//!
//! Tag names are compared case-insensitively after trimming. The normalized
//! form is what gets stored in `tags.name`.

use std::collections::HashSet;

/// Maximum length of a single tag name after normalization.
pub const MAX_TAG_NAME_LEN: usize = 50;

/// Maximum number of tags on one note.
pub const MAX_TAGS_PER_NOTE: usize = 20;

/// Normalize a tag name: trim whitespace and lowercase.
///
/// Returns `None` for names that are empty after trimming.
pub fn normalize_tag_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Normalize and de-duplicate a list of tag names, keeping first-seen order.
///
/// `[" Java ", "spring", "java"]` becomes `["java", "spring"]`.
pub fn normalize_tag_names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter_map(|n| normalize_tag_name(n.as_ref()))
        .filter(|n| seen.insert(n.clone()))
        .collect()
}
