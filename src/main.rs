mod commands;
mod logging;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use calmirror_core::error::SyncError;
use clap::{Parser, Subcommand};
use tracing::error;

use commands::Context;

#[derive(Parser)]
#[command(name = "calmirror")]
#[command(about = "Mirror an exported calendar file into a remote calendar")]
struct Cli {
    /// Config file (defaults to ~/.config/calmirror/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Calendar export to read instead of the configured ics_path
    #[arg(long, global = true)]
    ics: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authenticate with a calendar provider
    Auth {
        /// Provider to authenticate with (e.g., "google")
        provider: String,
    },
    /// Show what a sync would change, without changing anything
    Status,
    /// Make the destination calendar match the export
    Sync {
        /// Only print the planned changes
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Auth { provider } => {
            logging::init(cli.verbose, None)?;
            commands::auth::run(&provider).await
        }
        Commands::Status => {
            let ctx = load_context(cli.config, cli.ics, cli.verbose)?;
            commands::status::run(&ctx, cli.verbose).await
        }
        Commands::Sync { dry_run } => {
            let ctx = load_context(cli.config, cli.ics, cli.verbose)?;
            commands::sync::run(&ctx, dry_run, cli.verbose).await
        }
    }
}

/// Load the config, then start logging with its log file.
fn load_context(config: Option<PathBuf>, ics: Option<PathBuf>, verbose: bool) -> Result<Context> {
    match Context::load(config.as_deref(), ics) {
        Ok(ctx) => {
            logging::init(verbose, ctx.config.log_file().as_deref())?;
            Ok(ctx)
        }
        Err(e) => {
            logging::init(verbose, None)?;
            Err(e)
        }
    }
}

/// Log the error that ended the run. Unreachable destinations get their own
/// message since the fix is usually on the network side.
fn report(e: &anyhow::Error) {
    match e.downcast_ref::<SyncError>() {
        Some(sync_error) if sync_error.is_connectivity() => {
            error!(error = %sync_error, "Connection to destination failed");
        }
        _ => error!("{e:#}"),
    }
}
