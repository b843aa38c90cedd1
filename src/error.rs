//! Error types for covert operations.
//!
//! A closed taxonomy: every failure mode callers may want to branch on has
//! its own variant, grouped by domain. Commands never construct errors from
//! bare strings.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error wrapping all domain errors.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Vault(#[from] VaultError),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Secret(#[from] SecretError),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Identifier validation failures.
///
/// Raised before any filesystem path or subprocess argument is built from
/// user input. No side effects have happened when one of these is returned.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("invalid identifier: '{name}' ({reason})")]
    InvalidIdentifier { name: String, reason: &'static str },
}

/// Secrets-store-level failures (the `.secrets` directory itself).
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("secrets store not found: {0}")]
    NotInitialized(PathBuf),

    #[error("secrets store already exists: {0}")]
    AlreadyInitialized(PathBuf),

    #[error("email is required: use --email or set COVERT_EMAIL")]
    EmailRequired,

    #[error("not inside a git repository")]
    NotGitRepository,

    #[error("your key ({0}) is not in the store: ask an admin to add it")]
    KeyNotInStore(String),
}

/// Vault-level failures.
#[derive(Error, Debug)]
pub enum VaultError {
    #[error("vault not found: {0}")]
    NotFound(String),

    #[error("vault already exists: {0}")]
    AlreadyExists(String),

    #[error("access denied: you are not a member of vault {vault}")]
    AccessDenied { vault: String },

    #[error("{member} is not a member of {vault}")]
    NotAMember { member: String, vault: String },

    #[error("{member} is already a member of {vault}")]
    AlreadyMember { member: String, vault: String },

    #[error("cannot remove the last member from vault {0}")]
    CannotRemoveLastMember(String),

    /// The registry was updated but the on-disk ciphertext does not match it.
    ///
    /// The vault is in a needs-sync state; this must never be reported as
    /// success. `covert sync` re-asserts the recipient set.
    #[error(
        "re-encryption verification failed for vault {vault}: \
         secret '{secret}' is encrypted for {actual} recipient(s), expected {expected}"
    )]
    ReencryptionVerificationFailed {
        vault: String,
        secret: String,
        expected: usize,
        actual: usize,
    },
}

/// Public-key failures.
#[derive(Error, Debug)]
pub enum KeyError {
    /// No exported key record in `<secrets>/keys/`.
    #[error("no key on file for {0}")]
    NotOnFile(String),

    /// The local GPG keyring has no key for this identity.
    #[error("no GPG key found for {0}")]
    NotInKeyring(String),

    #[error("key already exists for {0}")]
    AlreadyStored(String),
}

/// Secret-level failures.
#[derive(Error, Debug)]
pub enum SecretError {
    #[error("secret not found: {vault}/{name}")]
    NotFound { vault: String, name: String },

    #[error("empty secret value not allowed")]
    EmptyValue,

    #[error("{0} cancelled")]
    Cancelled(String),
}

/// External-tool invocation failures (gpg, pass, git).
///
/// Diagnostic output from the tool is always attached; subprocess errors
/// are never silently discarded.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} error: {stderr}")]
    Failed { tool: String, stderr: String },
}

pub type Result<T> = std::result::Result<T, Error>;
