//! Setup command - configure access after cloning.

use crate::cli::output;
use crate::core::access;
use crate::core::context::Context;
use crate::core::gpg::Keyring;
use crate::core::registry::Registry;
use crate::core::validate::validate_flat_name;
use crate::error::{Result, StoreError};

/// Post-clone setup: verify the actor's key is on file, import all stored
/// keys into the local keyring, then list vaults with access status.
pub fn execute(ctx: &Context) -> Result<()> {
    let registry = Registry::open(&ctx.secrets_dir)?;

    let email = ctx.email.clone().ok_or(StoreError::EmailRequired)?;
    validate_flat_name(&email)?;

    let config = registry.store_config()?;
    println!("Setting up secrets for: {}", email);
    output::kv("Store owner:", &config.owner);
    println!();

    if !registry.key_on_file(&email) {
        return Err(StoreError::KeyNotInStore(email).into());
    }
    output::success(&format!(
        "Found your key: {}",
        registry.key_path(&email).display()
    ));

    let imported = ctx.gpg().import_key_dir(&registry.keys_dir())?;
    output::success(&format!("Imported {} key(s) to your GPG keyring", imported));

    let vaults = registry.list_vaults()?;
    if !vaults.is_empty() {
        println!();
        output::header("Available vaults:");
        for name in vaults {
            let Ok(record) = registry.load_vault(&name) else {
                continue;
            };
            if access::has_access(&record, &email) {
                output::success(&format!("{} (access granted)", name));
            } else {
                output::dimmed(&format!("  ✗ {} (no access)", name));
            }
        }
    }

    println!();
    println!("Setup complete!");
    Ok(())
}
