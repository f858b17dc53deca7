//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `portal_checker` library that handles:
//! - Environment variable loading (.env file)
//! - Command-line and environment configuration
//! - Logger initialization
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use portal_checker::initialization::{init_crypto_provider, init_logger_with};
use portal_checker::{run_portal_checker, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is normal in-cluster, where the pod spec sets the variables
    let dotenv = dotenvy::dotenv().or_else(|e| {
        let exe_env = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(".env")))
            .filter(|path| path.exists());
        match exe_env {
            Some(path) => dotenvy::from_path(&path).map(|_| path),
            None => Err(e),
        }
    });

    let config = Config::parse();

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    if let Ok(path) = dotenv {
        log::debug!("Loaded environment from {}", path.display());
    }

    // Must happen before any TLS connection is made
    init_crypto_provider();

    if let Err(e) = run_portal_checker(config).await {
        log::error!("portal_checker error: {:#}", e);
        eprintln!("portal_checker error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}
