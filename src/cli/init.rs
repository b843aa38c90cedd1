//! Init command - create the secrets store.

use tracing::info;

use crate::cli::output;
use crate::core::context::Context;
use crate::core::gpg::Keyring;
use crate::core::registry::Registry;
use crate::core::validate::validate_flat_name;
use crate::error::{KeyError, Result, StoreError};

/// Initialize a new secrets store at the configured secrets dir.
///
/// Requires a Git repository (secrets travel with it) and a GPG key pair
/// for the acting email. Exports the owner's public key into the store so
/// teammates can add them to vaults after cloning.
pub fn execute(ctx: &Context) -> Result<()> {
    let git_root = ctx.require_git_root()?;
    info!(root = %git_root.display(), "initializing inside git repository");

    let email = ctx
        .email
        .clone()
        .ok_or(StoreError::EmailRequired)?;
    validate_flat_name(&email)?;

    let gpg = ctx.gpg();
    if !gpg.key_exists(&email) {
        return Err(KeyError::NotInKeyring(email).into());
    }

    let registry = Registry::init(&ctx.secrets_dir, &email)?;

    let key_path = registry.key_path(&email);
    let key = gpg.export_public_key(&email)?;
    std::fs::write(&key_path, key)?;

    output::success(&format!(
        "Initialized secrets store in {}",
        ctx.secrets_dir.display()
    ));
    output::success(&format!(
        "Exported your public key to {}",
        key_path.display()
    ));
    println!();
    println!("Next steps:");
    println!("  1. Create a vault:  covert vault create <name>");
    println!("  2. Add a secret:    covert set <vault> <secret>");
    println!("  3. Commit to git:   git add {} && git commit", ctx.secrets_dir.display());

    Ok(())
}
