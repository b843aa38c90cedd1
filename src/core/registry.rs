//! Vault registry records on disk.
//!
//! The registry is the source of truth for "who should this vault's secrets
//! be encrypted for". Layout under the secrets root:
//!
//! ```text
//! <secrets-root>/
//!   config.toml                  # store config: version, owner
//!   keys/<email>.asc             # exported public keys, one per principal
//!   vaults/<name>/
//!     vault.toml                 # the vault registry record
//!     .password-store/           # owned by the pass adapter
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::access::Actor;
use crate::error::{Result, StoreError, VaultError};

const CONFIG_FILE: &str = "config.toml";
const VAULT_FILE: &str = "vault.toml";
const KEYS_DIR: &str = "keys";
const VAULTS_DIR: &str = "vaults";
const PASS_DIR: &str = ".password-store";
const KEY_EXT: &str = "asc";

/// Store-level configuration, one per secrets root.
#[derive(Debug, Serialize, Deserialize)]
pub struct StoreConfig {
    pub version: String,
    pub owner: String,
    /// Whether an unresolved acting principal is allowed through access
    /// checks. Defaults to true, matching historical behavior; set to false
    /// to fail closed when no identity is configured.
    #[serde(default = "default_true")]
    pub allow_unauthenticated_fallback: bool,
}

fn default_true() -> bool {
    true
}

/// Durable record of one vault's membership and metadata.
///
/// `members` is ordered: insertion order is preserved and becomes the
/// encryption recipient order, so records serialize deterministically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultRecord {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub members: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VaultRecord {
    /// Exact membership test; access checks use the case-insensitive
    /// variant in [`crate::core::access`].
    pub fn is_member(&self, email: &str) -> bool {
        self.members.iter().any(|m| m == email)
    }
}

/// Filesystem-backed registry rooted at the secrets directory.
#[derive(Debug, Clone)]
pub struct Registry {
    root: PathBuf,
}

impl Registry {
    /// Open an existing store.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(StoreError::NotInitialized(root).into());
        }
        Ok(Self { root })
    }

    /// Create a new store with `owner` as the configured owner.
    pub fn init(root: impl Into<PathBuf>, owner: &str) -> Result<Self> {
        let root = root.into();
        if root.exists() {
            return Err(StoreError::AlreadyInitialized(root).into());
        }

        std::fs::create_dir_all(root.join(KEYS_DIR))?;
        std::fs::create_dir_all(root.join(VAULTS_DIR))?;

        let registry = Self { root };
        registry.save_store_config(&StoreConfig {
            version: "1".to_string(),
            owner: owner.to_string(),
            allow_unauthenticated_fallback: true,
        })?;

        debug!(root = %registry.root.display(), "store initialized");
        Ok(registry)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn keys_dir(&self) -> PathBuf {
        self.root.join(KEYS_DIR)
    }

    pub fn vault_dir(&self, vault: &str) -> PathBuf {
        self.root.join(VAULTS_DIR).join(vault)
    }

    /// Directory handed to the pass adapter for one vault.
    pub fn store_dir(&self, vault: &str) -> PathBuf {
        self.vault_dir(vault).join(PASS_DIR)
    }

    /// Path of a principal's exported public key record.
    pub fn key_path(&self, email: &str) -> PathBuf {
        self.keys_dir().join(format!("{}.{}", email, KEY_EXT))
    }

    /// Whether a public key record is on file for this principal.
    ///
    /// A precondition for vault membership, but not itself a grant.
    pub fn key_on_file(&self, email: &str) -> bool {
        self.key_path(email).is_file()
    }

    /// Emails with a key record on file, sorted.
    pub fn list_keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in std::fs::read_dir(self.keys_dir())? {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() {
                if let Some(email) = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .and_then(|n| n.strip_suffix(".asc"))
                {
                    keys.push(email.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }

    pub fn store_config(&self) -> Result<StoreConfig> {
        let contents = std::fs::read_to_string(self.root.join(CONFIG_FILE))?;
        Ok(toml::from_str(&contents)?)
    }

    pub fn save_store_config(&self, config: &StoreConfig) -> Result<()> {
        let contents = toml::to_string_pretty(config)?;
        std::fs::write(self.root.join(CONFIG_FILE), contents)?;
        Ok(())
    }

    /// The actor for access checks, honoring the configured fallback.
    pub fn actor(&self, email: Option<String>) -> Actor {
        let allow_unauthenticated = self
            .store_config()
            .map(|c| c.allow_unauthenticated_fallback)
            .unwrap_or(true);
        Actor {
            email,
            allow_unauthenticated,
        }
    }

    /// Vault names, sorted.
    pub fn list_vaults(&self) -> Result<Vec<String>> {
        let vaults_dir = self.root.join(VAULTS_DIR);
        let mut vaults = Vec::new();
        if vaults_dir.is_dir() {
            for entry in std::fs::read_dir(vaults_dir)? {
                let entry = entry?;
                if entry.file_type()?.is_dir() {
                    vaults.push(entry.file_name().to_string_lossy().into_owned());
                }
            }
        }
        vaults.sort();
        Ok(vaults)
    }

    pub fn vault_exists(&self, vault: &str) -> bool {
        self.vault_dir(vault).is_dir()
    }

    pub fn load_vault(&self, vault: &str) -> Result<VaultRecord> {
        let dir = self.vault_dir(vault);
        if !dir.is_dir() {
            return Err(VaultError::NotFound(vault.to_string()).into());
        }
        let contents = std::fs::read_to_string(dir.join(VAULT_FILE))?;
        Ok(toml::from_str(&contents)?)
    }

    pub fn save_vault(&self, record: &VaultRecord) -> Result<()> {
        let contents = toml::to_string_pretty(record)?;
        std::fs::write(self.vault_dir(&record.name).join(VAULT_FILE), contents)?;
        Ok(())
    }

    /// Create the vault directory, registry record, and empty store dir.
    ///
    /// The caller initializes the pass store; on failure there it should
    /// call [`Registry::delete_vault`] to roll the directory back.
    pub fn create_vault(
        &self,
        name: &str,
        description: &str,
        owner: &str,
    ) -> Result<VaultRecord> {
        let dir = self.vault_dir(name);
        if dir.exists() {
            return Err(VaultError::AlreadyExists(name.to_string()).into());
        }

        std::fs::create_dir_all(&dir)?;

        let now = Utc::now();
        let record = VaultRecord {
            name: name.to_string(),
            description: description.to_string(),
            members: vec![owner.to_string()],
            created_at: now,
            updated_at: now,
        };
        self.save_vault(&record)?;

        let store_dir = self.store_dir(name);
        std::fs::create_dir_all(&store_dir)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&store_dir, std::fs::Permissions::from_mode(0o700))?;
        }

        debug!(vault = name, "vault created");
        Ok(record)
    }

    /// Remove a vault and everything in it. Irreversible.
    pub fn delete_vault(&self, vault: &str) -> Result<()> {
        let dir = self.vault_dir(vault);
        if !dir.is_dir() {
            return Err(VaultError::NotFound(vault.to_string()).into());
        }
        std::fs::remove_dir_all(dir)?;
        debug!(vault, "vault deleted");
        Ok(())
    }
}
