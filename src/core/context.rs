//! Resolved runtime configuration.
//!
//! Flags, environment, and auto-detection collapse into one immutable
//! [`Context`] built at process start and passed by reference into every
//! component. Nothing in `core` reads ambient globals.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::gpg::Gpg;
use crate::core::identity;
use crate::error::{Result, StoreError};

/// Immutable per-invocation configuration.
#[derive(Debug, Clone)]
pub struct Context {
    /// Absolute (or repo-root-relative) path to the secrets store.
    pub secrets_dir: PathBuf,
    /// Acting principal, if one could be resolved.
    pub email: Option<String>,
    /// GPG binary to invoke.
    pub gpg_binary: PathBuf,
    /// Root of the enclosing Git repository, when there is one.
    pub git_root: Option<PathBuf>,
}

impl Context {
    /// Resolve the context from CLI inputs.
    ///
    /// The secrets dir is anchored at the Git repository root when inside
    /// one, so the tool behaves the same from any subdirectory. The acting
    /// email falls back from the flag to `COVERT_EMAIL` (handled by clap),
    /// then to git config, then to the default GPG secret key.
    pub fn resolve(
        secrets_dir: &Path,
        email: Option<String>,
        gpg_binary: Option<PathBuf>,
    ) -> Result<Self> {
        let gpg_binary = resolve_gpg_binary(gpg_binary);
        let git_root = find_git_root(&std::env::current_dir()?);

        let secrets_dir = if secrets_dir.is_absolute() {
            secrets_dir.to_path_buf()
        } else if let Some(root) = &git_root {
            root.join(secrets_dir)
        } else {
            secrets_dir.to_path_buf()
        };

        let gpg = Gpg::new(gpg_binary.clone());
        let email = email.or_else(|| identity::resolve_email(&gpg));

        debug!(
            secrets_dir = %secrets_dir.display(),
            email = email.as_deref().unwrap_or("<none>"),
            gpg = %gpg_binary.display(),
            "context resolved"
        );

        Ok(Self {
            secrets_dir,
            email,
            gpg_binary,
            git_root,
        })
    }

    /// Keyring adapter bound to the resolved GPG binary.
    pub fn gpg(&self) -> Gpg {
        Gpg::new(self.gpg_binary.clone())
    }

    /// Error unless the current directory is inside a Git repository.
    pub fn require_git_root(&self) -> Result<&Path> {
        self.git_root
            .as_deref()
            .ok_or_else(|| StoreError::NotGitRepository.into())
    }
}

/// Locate the GPG binary: explicit flag/env, then PATH lookup, then `gpg`.
fn resolve_gpg_binary(flag: Option<PathBuf>) -> PathBuf {
    if let Some(binary) = flag {
        return binary;
    }
    which::which("gpg").unwrap_or_else(|_| PathBuf::from("gpg"))
}

/// Walk up from `start` looking for a `.git` entry.
///
/// `.git` can be a directory (normal repo) or a file (worktree/submodule).
pub fn find_git_root(start: &Path) -> Option<PathBuf> {
    let mut dir = start;
    loop {
        let git = dir.join(".git");
        if let Ok(meta) = std::fs::metadata(&git) {
            if meta.is_dir() || meta.is_file() {
                return Some(dir.to_path_buf());
            }
        }
        dir = dir.parent()?;
    }
}
