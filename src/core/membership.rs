//! Membership changes and verified re-keying.
//!
//! The invariant this module exists to uphold: at rest, every secret in a
//! vault is encrypted for exactly the vault's current member set. External
//! tools can break that silently — `pass init` exits 0 even when gpg
//! declined to encrypt for an untrusted key — so after every re-key the
//! engine counts the actual recipients of a representative blob and fails
//! hard on a mismatch.
//!
//! Verification compares recipient counts, not key IDs: key-ID formats are
//! not stable across gpg versions, and every expected member's key has
//! already been confirmed present in the keyring. The blind spot (a wrong
//! key occupying an intended member's slot) is accepted until a stable
//! fingerprint extraction exists.

use tracing::{debug, info, warn};

use crate::core::access::{self, Actor};
use crate::core::gpg::Keyring;
use crate::core::pass::SecretStore;
use crate::core::registry::{Registry, VaultRecord};
use crate::error::{KeyError, Result, VaultError};

/// Outcome of a successful membership or sync operation.
#[derive(Debug, Clone, Copy)]
pub struct RekeyReport {
    /// Members the vault is now encrypted for.
    pub members: usize,
    /// Secrets covered by the re-key.
    pub secrets: usize,
}

/// Grant `member` access to `vault` and re-encrypt its secrets.
///
/// Preconditions, each a distinct failure: the vault exists, the actor is a
/// member, a key record is on file for `member`, and `member` is not
/// already a member. The new member is appended, preserving existing order.
pub fn add_member(
    registry: &Registry,
    keyring: &impl Keyring,
    store: &impl SecretStore,
    actor: &Actor,
    vault: &str,
    member: &str,
) -> Result<RekeyReport> {
    let mut record = registry.load_vault(vault)?;
    access::ensure_access(&record, actor)?;

    if !registry.key_on_file(member) {
        return Err(KeyError::NotOnFile(member.to_string()).into());
    }
    if record.is_member(member) {
        return Err(VaultError::AlreadyMember {
            member: member.to_string(),
            vault: vault.to_string(),
        }
        .into());
    }

    // Best effort: the key may already be in the keyring, which is fine.
    // Verification below catches a key that genuinely failed to land.
    if let Err(e) = keyring.import_key(&registry.key_path(member)) {
        warn!(member, error = %e, "key import failed, continuing");
    }

    record.members.push(member.to_string());
    record.updated_at = chrono::Utc::now();
    registry.save_vault(&record)?;

    debug!(vault, member, members = record.members.len(), "member added");

    let secrets = rekey_and_verify(keyring, store, &record)?;
    info!(vault, member, secrets, "vault re-encrypted");

    Ok(RekeyReport {
        members: record.members.len(),
        secrets,
    })
}

/// Revoke `member`'s access to `vault` and re-encrypt its secrets.
///
/// Removing the sole remaining member is rejected: a memberless vault could
/// never be repaired, since no one would be authorized to re-add themselves.
/// Re-keying prevents future decryption only; copies the member decrypted
/// while they had access are out of reach.
pub fn remove_member(
    registry: &Registry,
    keyring: &impl Keyring,
    store: &impl SecretStore,
    actor: &Actor,
    vault: &str,
    member: &str,
) -> Result<RekeyReport> {
    let mut record = registry.load_vault(vault)?;
    access::ensure_access(&record, actor)?;

    let position = record
        .members
        .iter()
        .position(|m| m == member)
        .ok_or_else(|| VaultError::NotAMember {
            member: member.to_string(),
            vault: vault.to_string(),
        })?;

    if record.members.len() == 1 {
        return Err(VaultError::CannotRemoveLastMember(vault.to_string()).into());
    }

    record.members.remove(position);
    record.updated_at = chrono::Utc::now();
    registry.save_vault(&record)?;

    debug!(vault, member, members = record.members.len(), "member removed");

    let secrets = rekey_and_verify(keyring, store, &record)?;
    info!(vault, member, secrets, "vault re-encrypted");

    Ok(RekeyReport {
        members: record.members.len(),
        secrets,
    })
}

/// Re-assert the current member list without changing membership.
///
/// Idempotent; the documented recovery path for a vault left in a
/// needs-sync state by an earlier unverified re-key or a manual registry
/// edit.
pub fn sync(
    registry: &Registry,
    keyring: &impl Keyring,
    store: &impl SecretStore,
    actor: &Actor,
    vault: &str,
) -> Result<RekeyReport> {
    let mut record = registry.load_vault(vault)?;
    access::ensure_access(&record, actor)?;

    let secrets = rekey_and_verify(keyring, store, &record)?;

    record.updated_at = chrono::Utc::now();
    registry.save_vault(&record)?;

    info!(vault, secrets, members = record.members.len(), "vault synchronized");

    Ok(RekeyReport {
        members: record.members.len(),
        secrets,
    })
}

/// Re-key the store for the record's members, then verify the ciphertext
/// actually matches.
///
/// A clean exit from the re-key command is necessary but not sufficient:
/// the representative blob's recipient count must equal the member count,
/// with every member's key confirmed present in the keyring first.
fn rekey_and_verify(
    keyring: &impl Keyring,
    store: &impl SecretStore,
    record: &VaultRecord,
) -> Result<usize> {
    store.rekey(&record.members)?;

    let secrets = store.list()?;
    if let Some(representative) = secrets.first() {
        for member in &record.members {
            if !keyring.key_exists(member) {
                return Err(KeyError::NotInKeyring(member.clone()).into());
            }
        }

        let actual = keyring.recipients_of(&store.blob_path(representative))?;
        if actual != record.members.len() {
            return Err(VaultError::ReencryptionVerificationFailed {
                vault: record.name.clone(),
                secret: representative.clone(),
                expected: record.members.len(),
                actual,
            }
            .into());
        }

        debug!(
            vault = %record.name,
            secret = %representative,
            recipients = actual,
            "re-encryption verified"
        );
    }

    Ok(secrets.len())
}
