//! Shared request validation and normalization helpers.

use crate::error::HttpError;
use tagsnip_core::constants::{
    DEFAULT_LIST_SNIPPETS_LIMIT, MAX_LIST_SNIPPETS_LIMIT, MAX_NAME_CHARS, MAX_TITLE_CHARS,
};
use tagsnip_core::text::{char_len, normalize_tag};

/// Resolve a list page size, rejecting values outside `1..=1000`.
pub(super) fn normalized_limit(limit: Option<usize>) -> Result<usize, HttpError> {
    match limit {
        None => Ok(DEFAULT_LIST_SNIPPETS_LIMIT),
        Some(limit) if (1..=MAX_LIST_SNIPPETS_LIMIT).contains(&limit) => Ok(limit),
        Some(limit) => Err(HttpError::bad_request(format!(
            "limit must be between 1 and {}, got {}",
            MAX_LIST_SNIPPETS_LIMIT, limit
        ))),
    }
}

/// Check title length and code size of a create/update payload.
pub(super) fn validate_snippet_fields(
    title: Option<&str>,
    code: Option<&str>,
    max_code_size: usize,
) -> Result<(), HttpError> {
    if let Some(title) = title {
        if char_len(title) > MAX_TITLE_CHARS {
            return Err(HttpError::bad_request(format!(
                "Title must be at most {} characters",
                MAX_TITLE_CHARS
            )));
        }
    }
    if let Some(code) = code {
        if code.len() > max_code_size {
            return Err(HttpError::bad_request(format!(
                "Snippet code exceeds maximum size of {} bytes",
                max_code_size
            )));
        }
    }
    Ok(())
}

/// Trimmed folder name, required to be non-empty and at most 100 chars.
pub(super) fn folder_name(raw: &str) -> Result<String, HttpError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(HttpError::bad_request("Folder name cannot be empty"));
    }
    if char_len(name) > MAX_NAME_CHARS {
        return Err(HttpError::bad_request(format!(
            "Folder name must be at most {} characters",
            MAX_NAME_CHARS
        )));
    }
    Ok(name.to_string())
}

/// Normalized tag name, required to be non-empty and at most 100 chars.
pub(super) fn tag_name(raw: &str) -> Result<String, HttpError> {
    let name = normalize_tag(raw).ok_or_else(|| HttpError::bad_request("Tag name cannot be empty"))?;
    if char_len(&name) > MAX_NAME_CHARS {
        return Err(HttpError::bad_request(format!(
            "Tag name must be at most {} characters",
            MAX_NAME_CHARS
        )));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_bounds() {
        assert_eq!(normalized_limit(None).unwrap(), 100);
        assert_eq!(normalized_limit(Some(1000)).unwrap(), 1000);
        assert!(normalized_limit(Some(0)).is_err());
        assert!(normalized_limit(Some(1001)).is_err());
    }

    #[test]
    fn names_are_trimmed_and_bounded() {
        assert_eq!(folder_name("  Work ").unwrap(), "Work");
        assert!(folder_name("   ").is_err());
        assert!(folder_name(&"x".repeat(101)).is_err());
        assert_eq!(tag_name(" Rust ").unwrap(), "rust");
        assert!(tag_name("").is_err());
    }

    #[test]
    fn snippet_fields_respect_limits() {
        assert!(validate_snippet_fields(Some("ok"), Some("abc"), 3).is_ok());
        assert!(validate_snippet_fields(None, Some("abcd"), 3).is_err());
        assert!(validate_snippet_fields(Some(&"t".repeat(256)), None, 10).is_err());
    }
}
