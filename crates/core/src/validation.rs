//! Input validation and normalization helpers.
//!
//! The `validate_*` functions with a `ValidationError` return type are meant
//! for `#[validate(custom(function = ...))]` on request DTOs.

use std::borrow::Cow;

use validator::{ValidationError, ValidationErrors};

use crate::error::CoreError;
use crate::tags::{normalize_tag_name, MAX_TAGS_PER_NOTE, MAX_TAG_NAME_LEN};

/// Minimum password length for registration and password changes.
pub const MIN_PASSWORD_LENGTH: usize = 8;

pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 50;

/// Usernames are compared lower-cased and trimmed.
pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

/// Emails are compared lower-cased and trimmed.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Rejects strings that are empty after trimming.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(error_with_message("blank", "must not be blank"))
    } else {
        Ok(())
    }
}

/// `#RRGGBB` hex color.
pub fn validate_color(color: &str) -> Result<(), ValidationError> {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        Ok(())
    } else {
        Err(error_with_message("color", "color must be a #RRGGBB hex value"))
    }
}

/// At most [`MAX_TAGS_PER_NOTE`] tags, each at most [`MAX_TAG_NAME_LEN`]
/// characters once normalized.
pub fn validate_tag_names(names: &[String]) -> Result<(), ValidationError> {
    if names.len() > MAX_TAGS_PER_NOTE {
        return Err(error_with_message(
            "tags",
            "a note can carry at most 20 tags",
        ));
    }
    let too_long = names
        .iter()
        .filter_map(|n| normalize_tag_name(n))
        .any(|n| n.chars().count() > MAX_TAG_NAME_LEN);
    if too_long {
        return Err(error_with_message(
            "tags",
            "tag names are limited to 50 characters",
        ));
    }
    Ok(())
}

/// Lower-case letters, digits, `.`, `_` and `-` after normalization.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let normalized = normalize_username(username);
    let len = normalized.chars().count();
    if !(MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&len) {
        return Err(error_with_message(
            "username",
            "username must be between 3 and 50 characters",
        ));
    }
    let allowed = normalized
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-'));
    if !allowed {
        return Err(error_with_message(
            "username",
            "username may only contain letters, digits, '.', '_' and '-'",
        ));
    }
    Ok(())
}

/// Validate that a password meets minimum strength requirements.
pub fn validate_password_strength(password: &str, min_length: usize) -> Result<(), CoreError> {
    if password.chars().count() < min_length {
        return Err(CoreError::Validation(format!(
            "Password must be at least {min_length} characters long"
        )));
    }
    Ok(())
}

/// Flatten `validator` output into a single [`CoreError::Validation`].
///
/// Field names are sorted so the message is deterministic.
pub fn into_core_error(errors: ValidationErrors) -> CoreError {
    let mut parts: Vec<String> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let detail = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("{field}: {detail}")
        })
        .collect();
    parts.sort();
    CoreError::Validation(parts.join("; "))
}

fn error_with_message(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}
