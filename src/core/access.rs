//! Membership-based authorization.
//!
//! Every read and write against a vault's secrets goes through
//! [`ensure_access`] and fails closed for a known non-member. An unresolved
//! acting principal is only permitted when the store's
//! `allow_unauthenticated_fallback` flag says so.

use crate::core::registry::VaultRecord;
use crate::error::{Result, VaultError};

/// The acting principal, as far as it could be resolved.
#[derive(Debug, Clone)]
pub struct Actor {
    pub email: Option<String>,
    /// From the store config; whether a missing identity passes checks.
    pub allow_unauthenticated: bool,
}

/// Case-insensitive membership test.
pub fn has_access(record: &VaultRecord, email: &str) -> bool {
    record
        .members
        .iter()
        .any(|m| m.eq_ignore_ascii_case(email))
}

/// Authorize `actor` against a vault's current member list.
pub fn ensure_access(record: &VaultRecord, actor: &Actor) -> Result<()> {
    match &actor.email {
        Some(email) if has_access(record, email) => Ok(()),
        Some(_) => Err(VaultError::AccessDenied {
            vault: record.name.clone(),
        }
        .into()),
        None if actor.allow_unauthenticated => Ok(()),
        None => Err(VaultError::AccessDenied {
            vault: record.name.clone(),
        }
        .into()),
    }
}
