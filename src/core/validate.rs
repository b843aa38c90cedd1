//! Identifier validation.
//!
//! User-supplied vault names, emails, and secret paths end up in filesystem
//! paths and in argument lists handed to `gpg` and `pass`. These checks run
//! before any such use, for every caller. A value starting with `-` is
//! rejected even though the adapters pass `--` before positional arguments,
//! so a crafted identifier can never read as a flag downstream.

use crate::error::{Result, ValidationError};

/// Validate a flat identifier: vault names, emails, key names.
///
/// Rejects empty strings, `..`, any path separator, and a leading `-`.
pub fn validate_flat_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        Some("empty")
    } else if name.contains("..") {
        Some("path traversal")
    } else if name.contains('/') || name.contains('\\') {
        Some("path separator")
    } else if name.starts_with('-') {
        Some("leading hyphen")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ValidationError::InvalidIdentifier {
            name: name.to_string(),
            reason,
        }
        .into()),
        None => Ok(()),
    }
}

/// Validate a hierarchical secret path like `database/password`.
///
/// Interior `/` separators are allowed; everything that could escape the
/// vault's store directory is not. Separate from [`validate_flat_name`]
/// because secret paths legitimately contain the separator that would be a
/// traversal vector in a flat identifier.
pub fn validate_secret_path(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        Some("empty")
    } else if name.starts_with('-') {
        Some("leading hyphen")
    } else if name.starts_with('/') || name.ends_with('/') {
        Some("leading or trailing slash")
    } else if name.contains("//") {
        Some("empty path segment")
    } else if name.split('/').any(|seg| seg == "..") {
        Some("path traversal")
    } else if name.contains('\\') {
        Some("backslash")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ValidationError::InvalidIdentifier {
            name: name.to_string(),
            reason,
        }
        .into()),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn flat_accepts_names_and_emails() {
        assert!(validate_flat_name("dev").is_ok());
        assert!(validate_flat_name("alice@example.com").is_ok());
        assert!(validate_flat_name("bob@mail.dev.example.com").is_ok());
        assert!(validate_flat_name("user+label@example.com").is_ok());
    }

    #[test]
    fn flat_rejects_unsafe_names() {
        assert!(validate_flat_name("").is_err());
        assert!(validate_flat_name("../test").is_err());
        assert!(validate_flat_name("dev/prod").is_err());
        assert!(validate_flat_name("dev\\prod").is_err());
        assert!(validate_flat_name("-flag").is_err());
        assert!(validate_flat_name("a..b").is_err());
    }

    #[test]
    fn path_accepts_hierarchical_names() {
        assert!(validate_secret_path("apikey").is_ok());
        assert!(validate_secret_path("database/password").is_ok());
        assert!(validate_secret_path("a/b/c").is_ok());
        // interior hyphen is fine, only a leading one is dangerous
        assert!(validate_secret_path("ops/read-only-token").is_ok());
    }

    #[test]
    fn path_rejects_unsafe_names() {
        assert!(validate_secret_path("").is_err());
        assert!(validate_secret_path("../test").is_err());
        assert!(validate_secret_path("a/../b").is_err());
        assert!(validate_secret_path("test\\secret").is_err());
        assert!(validate_secret_path("test//secret").is_err());
        assert!(validate_secret_path("/test").is_err());
        assert!(validate_secret_path("test/").is_err());
        assert!(validate_secret_path("-flag").is_err());
    }

    proptest! {
        #[test]
        fn flat_never_accepts_traversal_or_separators(s in ".*") {
            if s.contains("..") || s.contains('/') || s.contains('\\') || s.starts_with('-') || s.is_empty() {
                prop_assert!(validate_flat_name(&s).is_err());
            } else {
                prop_assert!(validate_flat_name(&s).is_ok());
            }
        }

        #[test]
        fn path_accepts_exactly_safe_segment_lists(s in "[a-z]{1,8}(/[a-z]{1,8}){0,4}") {
            prop_assert!(validate_secret_path(&s).is_ok());
        }

        #[test]
        fn path_never_accepts_dotdot_segments(s in ".*") {
            if validate_secret_path(&s).is_ok() {
                prop_assert!(!s.split('/').any(|seg| seg == ".."));
                prop_assert!(!s.starts_with('-'));
                prop_assert!(!s.contains('\\'));
                prop_assert!(!s.contains("//"));
            }
        }
    }
}
