//! Export command - render a vault's secrets as env/dotenv/json.

use tracing::warn;

use crate::core::access;
use crate::core::context::Context;
use crate::core::exportfmt::{self, ExportFormat};
use crate::core::pass::{PassStore, SecretStore};
use crate::core::registry::Registry;
use crate::core::validate::validate_flat_name;
use crate::error::Result;

/// Decrypt every secret in a vault and print it in the requested format.
pub fn execute(ctx: &Context, vault: &str, format: ExportFormat, prefix: &str) -> Result<()> {
    validate_flat_name(vault)?;
    let registry = Registry::open(&ctx.secrets_dir)?;
    let record = registry.load_vault(vault)?;
    access::ensure_access(&record, &registry.actor(ctx.email.clone()))?;

    let store = PassStore::new(registry.store_dir(vault));
    let mut pairs = Vec::new();
    for secret in store.list()? {
        match store.show(&secret) {
            Ok(value) => pairs.push((secret, value.as_str().to_string())),
            Err(e) => {
                // One undecryptable secret should not block the rest
                warn!(secret = %secret, error = %e, "skipping secret");
            }
        }
    }

    print!("{}", exportfmt::render(format, prefix, &pairs));
    Ok(())
}
