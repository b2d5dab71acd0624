// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! `TankGauge` CLI - propane tank monitoring from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Store portal credentials in the system keychain
//! tankgauge login --username user@example.com
//!
//! # List accounts visible to those credentials
//! tankgauge accounts
//!
//! # One refresh, printed as text or JSON
//! tankgauge refresh
//! tankgauge refresh --format json --pretty
//!
//! # Every sensor value for the configured account
//! tankgauge sensors
//!
//! # Poll on the configured interval until Ctrl+C
//! tankgauge watch
//!
//! # Change a setting
//! tankgauge config set low_propane_threshold 25
//! ```

mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tankgauge_core::CoreError;
use tankgauge_providers::FerrellgasError;
use tankgauge_store::{LogLevel, StoreError};
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{Session, accounts, config, login, refresh, sensors, watch};

// ============================================================================
// CLI Definition
// ============================================================================

/// `TankGauge` CLI - propane tank monitoring.
#[derive(Parser)]
#[command(name = "tankgauge")]
#[command(about = "Propane tank level and delivery monitoring for Ferrellgas accounts")]
#[command(long_about = r#"
TankGauge polls the Ferrellgas customer portal and reports tank levels,
estimated gallons and the cost of the last delivery.

Examples:
  tankgauge login                # Store credentials in the keychain
  tankgauge accounts             # List account ids
  tankgauge refresh              # Fetch one snapshot
  tankgauge sensors              # Show every sensor value
  tankgauge watch                # Poll until Ctrl+C
  tankgauge --format json refresh
"#)]
#[command(version)]
#[command(author = "TankGauge Contributors")]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Settings file to use instead of the default location.
    #[arg(long, global = true, env = "TANKGAUGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Verify and store portal credentials.
    Login(login::LoginArgs),

    /// Remove stored credentials.
    Logout,

    /// List account ids visible to the stored credentials.
    #[command(visible_alias = "a")]
    Accounts,

    /// Fetch a fresh snapshot once.
    #[command(visible_alias = "r")]
    Refresh(refresh::RefreshArgs),

    /// Show every sensor value for an account.
    #[command(visible_alias = "s")]
    Sensors(refresh::RefreshArgs),

    /// Refresh on a schedule until interrupted.
    #[command(visible_alias = "w")]
    Watch(watch::WatchArgs),

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// Credentials missing or rejected.
    AuthFailed = 2,
    /// Invalid settings or arguments.
    ConfigError = 3,
}

impl ExitCode {
    /// Picks the exit code for an error by walking its cause chain.
    pub fn for_error(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            if let Some(e) = cause.downcast_ref::<StoreError>() {
                if e.requires_reauth() {
                    return ExitCode::AuthFailed;
                }
                if matches!(e, StoreError::Config(_)) {
                    return ExitCode::ConfigError;
                }
            }
            if let Some(e) = cause.downcast_ref::<FerrellgasError>() {
                if e.is_auth() {
                    return ExitCode::AuthFailed;
                }
            }
            if let Some(e) = cause.downcast_ref::<CoreError>() {
                if e.requires_reauth() {
                    return ExitCode::AuthFailed;
                }
            }
        }
        ExitCode::Error
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool, level: LogLevel) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("tankgauge=debug,info")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("tankgauge={level}")))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let session = Session::open(&cli).await;
    let settings = session.settings();
    setup_logging(cli.verbose, cli.quiet, settings.get().await.log_level);
    if let Some(issue) = settings.load_issue() {
        warn!(path = %settings.path().display(), "{issue}, using defaults");
    }

    let result = match &cli.command {
        Commands::Login(args) => login::run(args, &cli, &session).await,
        Commands::Logout => login::logout(&cli, &session).await,
        Commands::Accounts => accounts::run(&cli, &session).await,
        Commands::Refresh(args) => refresh::run(args, &cli, &session).await,
        Commands::Sensors(args) => sensors::run(args, &cli, &session).await,
        Commands::Watch(args) => watch::run(args, &cli, &session).await,
        Commands::Config(args) => config::run(args, &cli, &session).await,
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(ExitCode::for_error(&e) as i32);
    }

    Ok(())
}
