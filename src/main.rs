//! Covert - GPG-backed secrets vaults for Git repositories.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use covert::cli::output;
use covert::cli::{execute, Cli};
use covert::error::{Error, KeyError, StoreError, VaultError};

fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber with env-filter support
    let filter = EnvFilter::try_from_env("COVERT_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("covert=debug")
        } else {
            EnvFilter::new("covert=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(e) = execute(cli) {
        let suggestion = match &e {
            Error::Store(StoreError::NotInitialized(_)) => Some("run: covert init".to_string()),
            Error::Key(KeyError::NotOnFile(email)) => {
                Some(format!("run: covert key add {}", email))
            }
            Error::Vault(VaultError::ReencryptionVerificationFailed { vault, .. }) => {
                Some(format!("run: covert sync {}", vault))
            }
            _ => None,
        };

        output::error(&e.to_string());
        if let Some(hint) = suggestion {
            output::hint(&hint);
        }
        std::process::exit(1);
    }
}
