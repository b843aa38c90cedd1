//! Sync command - re-assert a vault's recipient set.

use crate::cli::output;
use crate::core::context::Context;
use crate::core::membership;
use crate::core::pass::PassStore;
use crate::core::registry::Registry;
use crate::core::validate::validate_flat_name;
use crate::error::Result;

/// Re-encrypt a vault for its current member list and verify the result.
///
/// Idempotent; the recovery path after a failed or interrupted re-key.
pub fn execute(ctx: &Context, vault: &str) -> Result<()> {
    validate_flat_name(vault)?;

    let registry = Registry::open(&ctx.secrets_dir)?;
    let actor = registry.actor(ctx.email.clone());
    let store = PassStore::new(registry.store_dir(vault));

    println!("Synchronizing vault: {}", vault);
    let report = membership::sync(&registry, &ctx.gpg(), &store, &actor, vault)?;

    output::kv("Members:", report.members);
    output::kv("Secrets:", report.secrets);
    output::success(&format!("Synchronized vault: {}", vault));
    Ok(())
}
