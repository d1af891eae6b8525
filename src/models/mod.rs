//! Data models for the portfolio content and the object references it holds.
//!
//! Documents map to SQLite rows via `sqlx::FromRow` and serialize as
//! camelCase JSON via `serde`.

pub mod contact;
pub mod introduction;
pub mod project;
pub mod purpose;
pub mod reference;

use crate::services::content_service::{ContentError, ContentResult};
use regex::Regex;
use std::sync::LazyLock;

/// Reject empty or whitespace-only required fields.
pub(crate) fn ensure_present(field: &str, value: &str) -> ContentResult<()> {
    if value.trim().is_empty() {
        return Err(ContentError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

/// Loose address check: some `x@y.z` run without whitespace.
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern is valid"));

pub(crate) fn ensure_email(value: &str) -> ContentResult<()> {
    if EMAIL.is_match(value) {
        Ok(())
    } else {
        Err(ContentError::Validation("Invalid email address".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_check_matches_loose_pattern() {
        assert!(ensure_email("me@example.com").is_ok());
        assert!(ensure_email("a@b.c").is_ok());
        assert!(ensure_email("me@localhost").is_err());
        assert!(ensure_email("@example.com").is_err());
        assert!(ensure_email("me@.com").is_err());
        assert!(ensure_email("me@example.").is_err());
        assert!(ensure_email("").is_err());
        assert!(ensure_email("reach me at me@example.com").is_ok());
        assert!(ensure_email("a@b@c").is_err());
    }

    #[test]
    fn blank_fields_are_missing() {
        assert!(ensure_present("subject", " \t").is_err());
        assert!(ensure_present("subject", "hello").is_ok());
    }
}
