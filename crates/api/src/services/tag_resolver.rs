//! Resolves free-form tag names to tag rows, creating missing ones.

use notekeep_core::tags::normalize_tag_names;
use notekeep_db::models::tag::Tag;
use notekeep_db::repositories::TagRepo;
use sqlx::PgConnection;

use crate::error::AppResult;

/// Normalize and dedupe `names`, reuse existing tags and create the rest.
///
/// The result follows the first-seen order of the normalized names. Empty
/// input returns an empty list without touching the database.
pub async fn resolve_tags(conn: &mut PgConnection, names: &[String]) -> AppResult<Vec<Tag>> {
    let normalized = normalize_tag_names(names);
    if normalized.is_empty() {
        return Ok(Vec::new());
    }

    let mut found = TagRepo::find_by_names(conn, &normalized).await?;
    let missing: Vec<String> = normalized
        .iter()
        .filter(|n| !found.iter().any(|t| &t.name == *n))
        .cloned()
        .collect();

    if !missing.is_empty() {
        let created = TagRepo::create_missing(conn, &missing).await?;
        tracing::debug!(created = created.len(), "Created tags");
        if created.len() < missing.len() {
            // Another transaction created some of them first.
            found = TagRepo::find_by_names(conn, &normalized).await?;
        } else {
            found.extend(created);
        }
    }

    Ok(order_by_names(found, &normalized))
}

/// Put `tags` in the order of `names`, dropping tags not named.
fn order_by_names(mut tags: Vec<Tag>, names: &[String]) -> Vec<Tag> {
    let mut ordered = Vec::with_capacity(names.len());
    for name in names {
        if let Some(pos) = tags.iter().position(|t| &t.name == name) {
            ordered.push(tags.swap_remove(pos));
        }
    }
    ordered
}

/// Whether replacing `before` by `after` dropped any tag, which may leave
/// orphans behind.
pub fn removes_any(before: &[String], after: &[Tag]) -> bool {
    before
        .iter()
        .any(|name| !after.iter().any(|t| &t.name == name))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn tag(id: i64, name: &str) -> Tag {
        Tag {
            id,
            name: name.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn orders_by_discovery_order() {
        let tags = vec![tag(1, "spring"), tag(2, "java")];
        let names = vec!["java".to_string(), "spring".to_string()];
        let ordered = order_by_names(tags, &names);
        let got: Vec<_> = ordered.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(got, vec!["java", "spring"]);
    }

    #[test]
    fn detects_removed_tags() {
        let before = vec!["java".to_string(), "spring".to_string()];
        assert!(removes_any(&before, &[tag(1, "java")]));
        assert!(!removes_any(&before, &[tag(1, "java"), tag(2, "spring"), tag(3, "rust")]));
        assert!(!removes_any(&[], &[]));
    }
}
