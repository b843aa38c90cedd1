//! Secret CRUD commands.
//!
//! Every handler validates identifiers first, then authorizes the actor
//! against the vault's member list before touching the store.

use std::io::Read;

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::ListFormat;
use crate::core::access;
use crate::core::context::Context;
use crate::core::pass::{PassStore, SecretStore};
use crate::core::registry::Registry;
use crate::core::validate::{validate_flat_name, validate_secret_path};
use crate::error::{Result, SecretError};

/// Validate, authorize, and open one vault's store.
fn open_vault(ctx: &Context, vault: &str) -> Result<(Registry, PassStore)> {
    validate_flat_name(vault)?;
    let registry = Registry::open(&ctx.secrets_dir)?;
    let record = registry.load_vault(vault)?;
    access::ensure_access(&record, &registry.actor(ctx.email.clone()))?;
    let store = PassStore::new(registry.store_dir(vault));
    Ok((registry, store))
}

/// Set a secret value; reads from stdin when no value argument is given.
pub fn set(ctx: &Context, vault: &str, secret: &str, value: Option<&str>) -> Result<()> {
    validate_secret_path(secret)?;
    let (_registry, store) = open_vault(ctx, vault)?;

    let value = match value {
        Some(v) => Zeroizing::new(v.to_string()),
        None => read_value_from_stdin()?,
    };
    if value.is_empty() {
        return Err(SecretError::EmptyValue.into());
    }

    store.insert(secret, &value)?;
    output::success(&format!("Set secret: {}/{}", vault, secret));
    Ok(())
}

/// Print a decrypted secret value.
pub fn get(ctx: &Context, vault: &str, secret: &str) -> Result<()> {
    validate_secret_path(secret)?;
    let (_registry, store) = open_vault(ctx, vault)?;

    if !store.exists(secret) {
        return Err(SecretError::NotFound {
            vault: vault.to_string(),
            name: secret.to_string(),
        }
        .into());
    }

    let value = store.show(secret)?;
    println!("{}", value.as_str());
    Ok(())
}

/// List all secrets in a vault.
pub fn list(ctx: &Context, vault: &str, format: ListFormat) -> Result<()> {
    let (_registry, store) = open_vault(ctx, vault)?;
    let secrets = store.list()?;

    if secrets.is_empty() {
        output::dimmed(&format!("No secrets in vault: {}", vault));
        return Ok(());
    }

    match format {
        ListFormat::Names => {
            for secret in secrets {
                println!("{}", secret);
            }
        }
        ListFormat::Table => {
            output::header(&format!("Secrets in vault '{}':", vault));
            for secret in secrets {
                output::list_item(&secret);
            }
        }
    }

    Ok(())
}

/// Permanently delete a secret.
pub fn delete(ctx: &Context, vault: &str, secret: &str, force: bool) -> Result<()> {
    validate_secret_path(secret)?;
    let (_registry, store) = open_vault(ctx, vault)?;

    if !store.exists(secret) {
        return Err(SecretError::NotFound {
            vault: vault.to_string(),
            name: secret.to_string(),
        }
        .into());
    }

    let prompt = format!("Delete secret {}/{}?", vault, secret);
    if !output::confirm(&prompt, force) {
        return Err(SecretError::Cancelled(format!("deletion of {}/{}", vault, secret)).into());
    }

    store.remove(secret)?;
    output::success(&format!("Deleted secret: {}/{}", vault, secret));
    Ok(())
}

/// Rename or move a secret within one vault.
pub fn rename(ctx: &Context, vault: &str, old_name: &str, new_name: &str) -> Result<()> {
    validate_secret_path(old_name)?;
    validate_secret_path(new_name)?;
    let (_registry, store) = open_vault(ctx, vault)?;

    if !store.exists(old_name) {
        return Err(SecretError::NotFound {
            vault: vault.to_string(),
            name: old_name.to_string(),
        }
        .into());
    }

    store.rename(old_name, new_name)?;
    output::success(&format!(
        "Renamed secret: {}/{} -> {}/{}",
        vault, old_name, vault, new_name
    ));
    Ok(())
}

/// Copy a secret to another vault; requires access on both sides.
pub fn copy(
    ctx: &Context,
    src_vault: &str,
    secret: &str,
    dst_vault: &str,
    new_name: Option<&str>,
) -> Result<()> {
    validate_secret_path(secret)?;
    if let Some(name) = new_name {
        validate_secret_path(name)?;
    }

    let (_src_registry, src_store) = open_vault(ctx, src_vault)?;
    let (_dst_registry, dst_store) = open_vault(ctx, dst_vault)?;

    if !src_store.exists(secret) {
        return Err(SecretError::NotFound {
            vault: src_vault.to_string(),
            name: secret.to_string(),
        }
        .into());
    }

    // Decrypt from the source and re-encrypt for the destination's members
    let value = src_store.show(secret)?;
    let dst_name = new_name.unwrap_or(secret);
    dst_store.insert(dst_name, &value)?;

    output::success(&format!(
        "Copied secret: {}/{} -> {}/{}",
        src_vault, secret, dst_vault, dst_name
    ));
    Ok(())
}

/// Read a secret value from stdin, stripping one trailing newline.
fn read_value_from_stdin() -> Result<Zeroizing<String>> {
    let mut input = Zeroizing::new(String::new());
    std::io::stdin().read_to_string(&mut input)?;
    let trimmed = input.as_str().strip_suffix('\n').unwrap_or(input.as_str());
    Ok(Zeroizing::new(trimmed.to_string()))
}
