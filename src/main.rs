//! Photo Renamer - rename photos and videos by capture time and checksum

use anyhow::{Context, Result};
use clap::Parser;
use photo_renamer::{Cli, Config, ConsolePrompter, SystemMetadata, logging, rename_tree};
use std::path::Path;
use tracing::{error, info};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    let root = config
        .dir
        .clone()
        .context("No target directory given (use --dir or set `dir` in the config file)")?;
    validate_root(&root)?;

    let log_path = config.log_path();
    let guard = logging::init(config.verbose, log_path.as_deref()).with_context(|| {
        format!(
            "Failed to open log file {}",
            log_path
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        )
    })?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        dir = %root.display(),
        dry_run = config.dry_run,
        "Photo renamer starting"
    );
    if config.verbose {
        tracing::debug!(?config, "Configuration loaded");
    }

    let mut prompter = ConsolePrompter;
    match rename_tree(&config, &SystemMetadata, &mut prompter) {
        Ok(_) => {
            if let Some(path) = &log_path {
                info!("Log saved to {}", path.display());
            }
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Processing failed");
            eprintln!("Error: {}", e);
            // Exiting skips destructors; flush the rename log first
            drop(guard);
            std::process::exit(1);
        }
    }
}

/// Load configuration from file or CLI arguments
fn load_config(cli: &Cli) -> Result<Config> {
    let config = match cli.config {
        Some(ref path) => cli.merge_with_config(Config::load_from_file(path)?),
        None => cli.to_config(),
    };
    Ok(config)
}

fn validate_root(root: &Path) -> Result<()> {
    if !root.is_dir() {
        anyhow::bail!("Target directory does not exist: {}", root.display());
    }
    Ok(())
}
