//! Internal helpers for input normalization.
//!
//! These utilities are **not** part of the public API. They centralize
//! text cleanup so every entity applies the same rules.

use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, ResultEngine};

/// Trims a required text field, rejecting blank input.
pub(crate) fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::validation(format!("{label} must not be empty")));
    }
    Ok(trimmed.to_string())
}

/// Trims an optional text field; blank input becomes `None`.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Applies an optional patch to an optional text field.
///
/// `None` keeps the stored value, `Some(None)` clears it.
pub(crate) fn apply_optional_text_patch(
    existing: Option<String>,
    patch: Option<Option<&str>>,
) -> Option<String> {
    match patch {
        None => existing,
        Some(value) => normalize_optional_text(value),
    }
}

/// Comparison key for names that must be unique regardless of case or
/// Unicode composition.
pub(crate) fn name_key(value: &str) -> String {
    value.trim().nfkc().collect::<String>().to_lowercase()
}

/// Minimal shape check for an e-mail address.
pub(crate) fn normalize_email(value: &str) -> ResultEngine<String> {
    let email = normalize_required_text(value, "email")?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(EngineError::validation(format!(
            "invalid email address: {email}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_is_trimmed() {
        assert_eq!(
            normalize_required_text("  Groceries ", "category name").unwrap(),
            "Groceries"
        );
        assert_eq!(
            normalize_required_text("   ", "category name"),
            Err(EngineError::validation("category name must not be empty"))
        );
    }

    #[test]
    fn optional_patch_keeps_or_clears() {
        let stored = Some("rent".to_string());
        assert_eq!(apply_optional_text_patch(stored.clone(), None), stored);
        assert_eq!(apply_optional_text_patch(stored.clone(), Some(None)), None);
        assert_eq!(
            apply_optional_text_patch(stored, Some(Some(" March rent "))),
            Some("March rent".to_string())
        );
    }

    #[test]
    fn name_key_ignores_case_and_composition() {
        assert_eq!(name_key("Café"), name_key("CAFE\u{301}"));
        assert_eq!(name_key(" Groceries"), "groceries");
    }

    #[test]
    fn email_requires_local_and_domain() {
        assert!(normalize_email("jane@example.com").is_ok());
        assert!(normalize_email("jane@").is_err());
        assert!(normalize_email("example.com").is_err());
    }
}
