//! Config command - manage configuration.

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use tankgauge_store::{LogLevel, Settings, StoreError, default_config_dir};
use tracing::info;

use super::Session;
use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Keys accepted by `config set` and `config unset`.
const KEYS: &[&str] = &[
    "account_id",
    "username",
    "scan_interval_minutes",
    "low_propane_threshold",
    "base_url",
    "log_level",
];

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration.
    Show,

    /// Show configuration paths.
    Path,

    /// Set a value.
    Set {
        /// Setting name.
        key: String,
        /// New value.
        value: String,
    },

    /// Clear an optional value or restore a default.
    Unset {
        /// Setting name.
        key: String,
    },

    /// Reset to defaults.
    Reset,
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli, session: &Session) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli, session).await,
        ConfigAction::Path => show_paths(cli, session),
        ConfigAction::Set { key, value } => set_value(session, key, Some(value)).await,
        ConfigAction::Unset { key } => set_value(session, key, None).await,
        ConfigAction::Reset => reset_config(session).await,
    }
}

async fn show_config(cli: &Cli, session: &Session) -> Result<()> {
    let settings = session.settings().get().await;

    match cli.format {
        OutputFormat::Text => {
            let or_unset = |v: &Option<String>| v.clone().unwrap_or_else(|| "(unset)".to_string());

            println!("TankGauge Configuration");
            println!("{}", "─".repeat(40));
            println!();
            println!("Account:           {}", or_unset(&settings.account_id));
            println!("Username:          {}", or_unset(&settings.username));
            println!("Scan interval:     {} min", settings.scan_interval_minutes);
            println!("Low propane below: {}%", settings.low_propane_threshold);
            println!("Base URL:          {}", or_unset(&settings.base_url));
            println!("Log level:         {}", settings.log_level);
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&settings)?);
        }
    }

    Ok(())
}

fn show_paths(cli: &Cli, session: &Session) -> Result<()> {
    let config_dir = default_config_dir();
    let settings_path = session.settings().path();

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config dir:    {}", config_dir.display());
            println!("Settings file: {}", settings_path.display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_dir": config_dir.display().to_string(),
                "settings_file": settings_path.display().to_string(),
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}

async fn set_value(session: &Session, key: &str, value: Option<&str>) -> Result<()> {
    let store = session.settings();
    let mut candidate = store.get().await;
    apply(&mut candidate, key, value)?;

    store.update(|s| *s = candidate).await?;
    store.save().await?;

    info!(key = %key, "Setting updated");
    match value {
        Some(value) => println!("{key} = {value}"),
        None => println!("{key} cleared"),
    }

    Ok(())
}

async fn reset_config(session: &Session) -> Result<()> {
    let store = session.settings();
    store.update(|s| *s = Settings::default()).await?;
    store.save().await?;

    info!(path = %store.path().display(), "Settings reset");
    println!("Configuration reset to defaults");

    Ok(())
}

/// Applies one `key = value` assignment. `None` clears the key.
fn apply(settings: &mut Settings, key: &str, value: Option<&str>) -> Result<()> {
    let defaults = Settings::default();
    let invalid = |e: &dyn std::fmt::Display| StoreError::Config(format!("invalid {key}: {e}"));

    match key {
        "account_id" => settings.account_id = value.map(str::to_string),
        "username" => settings.username = value.map(str::to_string),
        "base_url" => settings.base_url = value.map(|v| v.trim_end_matches('/').to_string()),
        "scan_interval_minutes" => {
            settings.scan_interval_minutes = match value {
                Some(v) => v.trim().parse().map_err(|e| invalid(&e))?,
                None => defaults.scan_interval_minutes,
            };
        }
        "low_propane_threshold" => {
            settings.low_propane_threshold = match value {
                Some(v) => v.trim().parse().map_err(|e| invalid(&e))?,
                None => defaults.low_propane_threshold,
            };
        }
        "log_level" => {
            settings.log_level = match value {
                Some(v) => v.parse::<LogLevel>()?,
                None => defaults.log_level,
            };
        }
        other => bail!(StoreError::Config(format!(
            "unknown setting {other}, expected one of: {}",
            KEYS.join(", ")
        ))),
    }

    Ok(())
}
