//! Vault commands - lifecycle and membership.

use crate::cli::output;
use crate::core::access;
use crate::core::context::Context;
use crate::core::gpg::Keyring;
use crate::core::membership;
use crate::core::pass::{PassStore, SecretStore};
use crate::core::registry::Registry;
use crate::core::validate::validate_flat_name;
use crate::error::{KeyError, Result, SecretError, StoreError};

/// List all vaults with the actor's access status.
pub fn list(ctx: &Context) -> Result<()> {
    let registry = Registry::open(&ctx.secrets_dir)?;
    let vaults = registry.list_vaults()?;

    if vaults.is_empty() {
        output::dimmed("No vaults found. Create one with: covert vault create <name>");
        return Ok(());
    }

    output::header("Vaults:");
    for name in vaults {
        let record = match registry.load_vault(&name) {
            Ok(record) => record,
            Err(_) => {
                output::list_item(&format!("{} (error loading record)", name));
                continue;
            }
        };

        let status = match &ctx.email {
            Some(email) if access::has_access(&record, email) => " ✓",
            Some(_) => " ✗",
            None => "",
        };
        let desc = if record.description.is_empty() {
            String::new()
        } else {
            format!(" - {}", record.description)
        };
        output::list_item(&format!("{}{}{}", name, status, desc));
    }

    Ok(())
}

/// Create a vault with the acting principal as sole initial member.
pub fn create(ctx: &Context, name: &str, description: &str) -> Result<()> {
    validate_flat_name(name)?;
    let registry = Registry::open(&ctx.secrets_dir)?;

    let email = ctx.email.clone().ok_or(StoreError::EmailRequired)?;
    validate_flat_name(&email)?;

    let gpg = ctx.gpg();
    if !gpg.key_exists(&email) {
        return Err(KeyError::NotInKeyring(email).into());
    }

    let record = registry.create_vault(name, description, &email)?;

    let store = PassStore::new(registry.store_dir(name));
    if let Err(e) = store.init(&record.members) {
        // roll the half-created vault back so a retry starts clean
        let _ = registry.delete_vault(name);
        return Err(e);
    }

    output::success(&format!("Created vault: {}", name));
    if !description.is_empty() {
        output::kv("Description:", description);
    }
    output::kv("Owner:", &email);

    Ok(())
}

/// Show vault details and members.
pub fn info(ctx: &Context, name: &str) -> Result<()> {
    validate_flat_name(name)?;
    let registry = Registry::open(&ctx.secrets_dir)?;
    let record = registry.load_vault(name)?;

    let store = PassStore::new(registry.store_dir(name));
    let secrets = store.list().unwrap_or_default();

    output::kv("Vault:", &record.name);
    if !record.description.is_empty() {
        output::kv("Description:", &record.description);
    }
    output::kv("Created:", record.created_at.to_rfc3339());
    if record.updated_at != record.created_at {
        output::kv("Updated:", record.updated_at.to_rfc3339());
    }
    output::kv("Secrets:", secrets.len());
    println!();
    output::header("Members:");
    for member in &record.members {
        output::list_item(member);
    }

    Ok(())
}

/// Delete a vault and all its secrets. Irreversible.
pub fn delete(ctx: &Context, name: &str, force: bool) -> Result<()> {
    validate_flat_name(name)?;
    let registry = Registry::open(&ctx.secrets_dir)?;

    if !registry.vault_exists(name) {
        return Err(crate::error::VaultError::NotFound(name.to_string()).into());
    }

    let prompt = format!("Delete vault {} and all its secrets?", name);
    if !output::confirm(&prompt, force) {
        return Err(SecretError::Cancelled(format!("deletion of vault {}", name)).into());
    }

    registry.delete_vault(name)?;
    output::success(&format!("Deleted vault: {}", name));
    Ok(())
}

/// Grant vault access to a team member and re-encrypt.
pub fn add_member(ctx: &Context, vault: &str, email: &str) -> Result<()> {
    validate_flat_name(vault)?;
    validate_flat_name(email)?;

    let registry = Registry::open(&ctx.secrets_dir)?;
    let actor = registry.actor(ctx.email.clone());
    let store = PassStore::new(registry.store_dir(vault));

    let report = membership::add_member(&registry, &ctx.gpg(), &store, &actor, vault, email)?;

    output::success(&format!("Added {} to vault {}", email, vault));
    output::success(&format!("Re-encrypted {} secret(s)", report.secrets));
    Ok(())
}

/// Revoke vault access from a team member and re-encrypt.
///
/// The removed member may still hold copies of secrets they decrypted while
/// a member; re-keying only prevents future decryption.
pub fn remove_member(ctx: &Context, vault: &str, email: &str) -> Result<()> {
    validate_flat_name(vault)?;
    validate_flat_name(email)?;

    let registry = Registry::open(&ctx.secrets_dir)?;
    let actor = registry.actor(ctx.email.clone());
    let store = PassStore::new(registry.store_dir(vault));

    let report = membership::remove_member(&registry, &ctx.gpg(), &store, &actor, vault, email)?;

    output::success(&format!("Removed {} from vault {}", email, vault));
    output::success(&format!("Re-encrypted {} secret(s)", report.secrets));
    Ok(())
}
