//! Covert - GPG-backed secrets vaults for Git repositories.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── init          # Initialize the secrets store
//! │   ├── setup         # Post-clone access setup
//! │   ├── key           # Public key management
//! │   ├── vault         # Vault lifecycle and membership
//! │   ├── secrets       # Secret CRUD operations
//! │   ├── export        # Export secrets as env/dotenv/json
//! │   ├── sync          # Re-assert vault recipient sets
//! │   └── completions   # Shell completions
//! └── core/             # Core library components
//!     ├── context       # Resolved runtime configuration
//!     ├── validate      # Identifier validation
//!     ├── identity      # Acting-principal resolution
//!     ├── gpg           # Keyring adapter (gpg CLI)
//!     ├── pass          # Secret store adapter (pass CLI)
//!     ├── registry      # Vault registry records on disk
//!     ├── access        # Membership-based authorization
//!     ├── membership    # Add/remove member + verified re-keying
//!     └── exportfmt     # Export format rendering
//! ```
//!
//! # Features
//!
//! - Vault-based organization with per-vault member lists
//! - GPG encryption of every secret via the pass password store
//! - Verified re-encryption on every membership change
//! - Multi-user key exchange through the Git repository
//! - Export to env, dotenv, or JSON formats

pub mod cli;
pub mod core;
pub mod error;
