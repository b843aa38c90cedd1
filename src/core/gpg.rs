//! Keyring adapter backed by the `gpg` CLI.
//!
//! All key custody is delegated to GnuPG. Every invocation separates flags
//! from positional data with `--`; identifiers are validated before they
//! reach this module, and the marker keeps a tool-ambiguous value from ever
//! reading as a flag.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, trace, warn};

use crate::core::identity;
use crate::error::{KeyError, Result, ToolError};

/// Key custody operations the membership engine depends on.
///
/// Production uses [`Gpg`]; tests substitute an in-memory fake.
pub trait Keyring {
    /// Whether the local keyring holds a key for this identity.
    fn key_exists(&self, email: &str) -> bool;

    /// ASCII-armored export of the public key for this identity.
    fn export_public_key(&self, email: &str) -> Result<Vec<u8>>;

    /// Import a key file into the local keyring.
    fn import_key(&self, path: &Path) -> Result<()>;

    /// Import every `.asc` file in a directory, best effort.
    ///
    /// A failure on one key (for example, one that is already present) must
    /// not abort the rest. Returns the number imported.
    fn import_key_dir(&self, dir: &Path) -> Result<usize>;

    /// Count the actual cryptographic recipients of an encrypted blob.
    ///
    /// This is the verification primitive: it enumerates recipients from
    /// the packet structure of the file, never from any tool exit status.
    fn recipients_of(&self, blob: &Path) -> Result<usize>;

    /// Email of the default secret key, when one exists.
    fn default_identity(&self) -> Option<String>;
}

/// `gpg` subprocess implementation of [`Keyring`].
#[derive(Debug, Clone)]
pub struct Gpg {
    binary: PathBuf,
}

impl Gpg {
    pub fn new(binary: PathBuf) -> Self {
        Self { binary }
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        trace!(?args, "gpg");

        let output = Command::new(&self.binary)
            .args(args)
            .output()
            .map_err(|source| ToolError::Spawn {
                tool: self.binary.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ToolError::Failed {
                tool: "gpg".to_string(),
                stderr,
            }
            .into());
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Keyring for Gpg {
    fn key_exists(&self, email: &str) -> bool {
        self.run(&["--list-keys", "--", email]).is_ok()
    }

    fn export_public_key(&self, email: &str) -> Result<Vec<u8>> {
        let armored = self.run(&["--armor", "--export", "--", email])?;
        // gpg exits 0 with empty output when nothing matched
        if armored.trim().is_empty() {
            return Err(KeyError::NotInKeyring(email.to_string()).into());
        }
        Ok(armored.into_bytes())
    }

    fn import_key(&self, path: &Path) -> Result<()> {
        let path = path.to_string_lossy();
        self.run(&["--import", "--", &path])?;
        debug!(key = %path, "imported key");
        Ok(())
    }

    fn import_key_dir(&self, dir: &Path) -> Result<usize> {
        let mut imported = 0;
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() || path.extension().map_or(true, |e| e != "asc") {
                continue;
            }
            match self.import_key(&path) {
                Ok(()) => imported += 1,
                Err(e) => {
                    // Some keys may already be imported; keep going
                    warn!(key = %path.display(), error = %e, "key import skipped");
                }
            }
        }
        Ok(imported)
    }

    fn recipients_of(&self, blob: &Path) -> Result<usize> {
        let path = blob.to_string_lossy();
        let packets = self.run(&["--list-packets", "--", &path])?;
        Ok(count_pubkey_enc_packets(&packets))
    }

    fn default_identity(&self) -> Option<String> {
        let listing = self
            .run(&["--list-secret-keys", "--keyid-format", "long"])
            .ok()?;
        identity::first_uid_email(&listing)
    }
}

/// Count `:pubkey enc packet:` lines in `gpg --list-packets` output.
///
/// One such packet exists per key the blob is encrypted for.
fn count_pubkey_enc_packets(packets: &str) -> usize {
    packets
        .lines()
        .filter(|line| line.to_ascii_lowercase().contains(":pubkey enc packet:"))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_recipients_from_packet_dump() {
        let dump = "\
# off=0 ctb=85 tag=1 hlen=3 plen=268\n\
:pubkey enc packet: version 3, algo 1, keyid AAAAAAAAAAAAAAAA\n\
\tdata: [2046 bits]\n\
# off=271 ctb=85 tag=1 hlen=3 plen=268\n\
:pubkey enc packet: version 3, algo 1, keyid BBBBBBBBBBBBBBBB\n\
\tdata: [2048 bits]\n\
:encrypted data packet:\n\
\tlength: 89\n";
        assert_eq!(count_pubkey_enc_packets(dump), 2);
    }

    #[test]
    fn zero_recipients_in_unencrypted_dump() {
        let dump = ":literal data packet:\n\tmode b (62), created 0\n";
        assert_eq!(count_pubkey_enc_packets(dump), 0);
    }

    #[test]
    fn packet_match_is_case_insensitive() {
        let dump = ":PUBKEY ENC PACKET: version 3\n";
        assert_eq!(count_pubkey_enc_packets(dump), 1);
    }
}
