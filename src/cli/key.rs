//! Key commands - manage stored public keys.
//!
//! A stored key is a precondition for vault membership, not a grant:
//! adding a key gives no access until `vault add-member` is run.

use std::path::Path;

use crate::cli::output;
use crate::core::context::Context;
use crate::core::gpg::Keyring;
use crate::core::registry::Registry;
use crate::core::validate::validate_flat_name;
use crate::error::{KeyError, Result};

/// List all public keys on file.
pub fn list(ctx: &Context) -> Result<()> {
    let registry = Registry::open(&ctx.secrets_dir)?;
    let keys = registry.list_keys()?;

    output::header("Stored public keys:");
    if keys.is_empty() {
        output::dimmed("  (none)");
    } else {
        for email in keys {
            output::list_item(&email);
        }
    }
    Ok(())
}

/// Add a team member's public key to the store.
///
/// Exports from the local keyring when no key file is given.
pub fn add(ctx: &Context, email: &str, key_file: Option<&Path>) -> Result<()> {
    validate_flat_name(email)?;
    let registry = Registry::open(&ctx.secrets_dir)?;

    let key_path = registry.key_path(email);
    if key_path.exists() {
        return Err(KeyError::AlreadyStored(email.to_string()).into());
    }

    match key_file {
        Some(file) => {
            let data = std::fs::read(file)?;
            std::fs::write(&key_path, data)?;
        }
        None => {
            let gpg = ctx.gpg();
            if !gpg.key_exists(email) {
                return Err(KeyError::NotInKeyring(email.to_string()).into());
            }
            let key = gpg.export_public_key(email)?;
            std::fs::write(&key_path, key)?;
        }
    }

    output::success(&format!("Added key for {}", email));
    Ok(())
}

/// Remove a public key from the store.
///
/// Does not revoke vault access; run `vault remove-member` first.
pub fn remove(ctx: &Context, email: &str) -> Result<()> {
    validate_flat_name(email)?;
    let registry = Registry::open(&ctx.secrets_dir)?;

    if !registry.key_on_file(email) {
        return Err(KeyError::NotOnFile(email.to_string()).into());
    }
    std::fs::remove_file(registry.key_path(email))?;

    output::success(&format!("Removed key for {}", email));
    Ok(())
}

/// Import all stored keys into the local GPG keyring.
pub fn import(ctx: &Context) -> Result<()> {
    let registry = Registry::open(&ctx.secrets_dir)?;
    let imported = ctx.gpg().import_key_dir(&registry.keys_dir())?;

    output::success(&format!("Imported {} key(s) to GPG keyring", imported));
    Ok(())
}
