//! Command-line interface.

pub mod completions;
pub mod export;
pub mod init;
pub mod key;
pub mod output;
pub mod secrets;
pub mod setup;
pub mod sync;
pub mod vault;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::core::context::Context;
use crate::core::exportfmt::ExportFormat;
use crate::error::Result;

/// Covert - GPG-backed secrets vaults for Git repositories.
#[derive(Parser)]
#[command(
    name = "covert",
    about = "GPG-backed secrets vaults for Git repositories",
    version,
    after_help = "Quick start:\n  \
        covert init --email you@example.com\n  \
        covert vault create dev\n  \
        covert set dev database/password \"secret123\"\n  \
        covert get dev database/password"
)]
pub struct Cli {
    /// Path to the secrets directory
    #[arg(
        long,
        global = true,
        env = "COVERT_SECRETS_DIR",
        default_value = ".secrets"
    )]
    pub secrets_dir: PathBuf,

    /// Acting email for GPG operations
    #[arg(long, global = true, env = "COVERT_EMAIL")]
    pub email: Option<String>,

    /// Path to the GPG binary
    #[arg(long, global = true, env = "COVERT_GPG")]
    pub gpg_binary: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Initialize a new secrets store in this repository
    Init,

    /// Configure access after cloning a secrets repository
    Setup,

    /// Manage GPG public keys for team members
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// Manage vaults for organizing secrets
    Vault {
        #[command(subcommand)]
        action: VaultAction,
    },

    /// Set a secret value (reads from stdin when no value is given)
    Set {
        vault: String,
        /// Secret name, slashes allowed (e.g. database/password)
        secret: String,
        value: Option<String>,
    },

    /// Retrieve and display a secret value
    Get {
        vault: String,
        #[arg(allow_hyphen_values = true)]
        secret: String,
    },

    /// List all secrets in a vault
    List {
        vault: String,
        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: ListFormat,
    },

    /// Permanently delete a secret
    #[command(visible_alias = "rm")]
    Delete {
        vault: String,
        secret: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Rename or move a secret within a vault
    #[command(visible_alias = "mv")]
    Rename {
        vault: String,
        old_name: String,
        new_name: String,
    },

    /// Copy a secret to another vault (access required on both sides)
    #[command(visible_alias = "cp")]
    Copy {
        src_vault: String,
        secret: String,
        dst_vault: String,
        /// New name for the copied secret
        #[arg(long)]
        new_name: Option<String>,
    },

    /// Export secrets as environment variables
    Export {
        vault: String,
        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: ExportFormat,
        /// Prefix for variable names
        #[arg(long, default_value = "")]
        prefix: String,
    },

    /// Re-encrypt a vault for its current member list and verify
    Sync { vault: String },

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

/// Key management subcommands.
#[derive(Subcommand)]
pub enum KeyAction {
    /// List all stored public keys
    List,
    /// Add a team member's public key to the store
    Add {
        email: String,
        /// Path to an ASCII-armored key file (exported from your keyring otherwise)
        #[arg(long)]
        key_file: Option<PathBuf>,
    },
    /// Remove a public key from the store
    Remove { email: String },
    /// Import all stored keys into your GPG keyring
    Import,
}

/// Vault management subcommands.
#[derive(Subcommand)]
pub enum VaultAction {
    /// List all vaults and your access status
    List,
    /// Create a new vault with you as the first member
    Create {
        #[arg(allow_hyphen_values = true)]
        name: String,
        /// Vault description
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// Show vault details and members
    Info { name: String },
    /// Delete a vault and all its secrets
    Delete {
        name: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Grant vault access to a team member
    AddMember {
        vault: String,
        #[arg(value_name = "EMAIL")]
        member: String,
    },
    /// Revoke vault access from a team member
    RemoveMember {
        vault: String,
        #[arg(value_name = "EMAIL")]
        member: String,
    },
}

/// Output format for `covert list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, Default)]
pub enum ListFormat {
    /// Human-readable listing
    #[default]
    Table,
    /// Bare names, one per line (for scripting)
    Names,
}

/// Execute a parsed command.
pub fn execute(cli: Cli) -> Result<()> {
    // Completions need no resolved context (and no subprocesses)
    if let Command::Completions { shell } = cli.command {
        return completions::execute(shell);
    }

    let ctx = Context::resolve(&cli.secrets_dir, cli.email, cli.gpg_binary)?;

    match cli.command {
        Command::Init => init::execute(&ctx),
        Command::Setup => setup::execute(&ctx),
        Command::Key { action } => match action {
            KeyAction::List => key::list(&ctx),
            KeyAction::Add { email, key_file } => key::add(&ctx, &email, key_file.as_deref()),
            KeyAction::Remove { email } => key::remove(&ctx, &email),
            KeyAction::Import => key::import(&ctx),
        },
        Command::Vault { action } => match action {
            VaultAction::List => vault::list(&ctx),
            VaultAction::Create { name, description } => vault::create(&ctx, &name, &description),
            VaultAction::Info { name } => vault::info(&ctx, &name),
            VaultAction::Delete { name, force } => vault::delete(&ctx, &name, force),
            VaultAction::AddMember {
                vault: name,
                member,
            } => vault::add_member(&ctx, &name, &member),
            VaultAction::RemoveMember {
                vault: name,
                member,
            } => vault::remove_member(&ctx, &name, &member),
        },
        Command::Set {
            vault,
            secret,
            value,
        } => secrets::set(&ctx, &vault, &secret, value.as_deref()),
        Command::Get { vault, secret } => secrets::get(&ctx, &vault, &secret),
        Command::List { vault, format } => secrets::list(&ctx, &vault, format),
        Command::Delete {
            vault,
            secret,
            force,
        } => secrets::delete(&ctx, &vault, &secret, force),
        Command::Rename {
            vault,
            old_name,
            new_name,
        } => secrets::rename(&ctx, &vault, &old_name, &new_name),
        Command::Copy {
            src_vault,
            secret,
            dst_vault,
            new_name,
        } => secrets::copy(&ctx, &src_vault, &secret, &dst_vault, new_name.as_deref()),
        Command::Export {
            vault,
            format,
            prefix,
        } => export::execute(&ctx, &vault, format, &prefix),
        Command::Sync { vault } => sync::execute(&ctx, &vault),
        Command::Completions { .. } => unreachable!("handled above"),
    }
}
