//! Acting-principal resolution.
//!
//! An email identifies the principal running the command. Resolution order:
//! explicit flag, `COVERT_EMAIL` (both handled by clap before this module
//! runs), `git config user.email`, then the uid of the default GPG secret
//! key. An unresolved identity is allowed; access checks decide what that
//! means.

use std::process::Command;

use tracing::debug;

use crate::core::gpg::Keyring;

/// Detect the acting email from git config or the GPG keyring.
pub fn resolve_email(keyring: &impl Keyring) -> Option<String> {
    if let Some(email) = git_config_email() {
        debug!(email = %email, "email resolved from git config");
        return Some(email);
    }

    if let Some(email) = keyring.default_identity() {
        debug!(email = %email, "email resolved from gpg keyring");
        return Some(email);
    }

    None
}

fn git_config_email() -> Option<String> {
    let output = Command::new("git")
        .args(["config", "--get", "user.email"])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let email = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if email.is_empty() {
        None
    } else {
        Some(email)
    }
}

/// Extract the first `<email>` from a GPG uid listing.
///
/// Shared with the keyring adapter's `default_identity`.
pub(crate) fn first_uid_email(listing: &str) -> Option<String> {
    for line in listing.lines() {
        if !line.trim_start().starts_with("uid") {
            continue;
        }
        if let Some(start) = line.rfind('<') {
            if let Some(end) = line.rfind('>') {
                if end > start {
                    return Some(line[start + 1..end].to_string());
                }
            }
        }
    }
    None
}
