//! Watch command - scheduled refreshes until Ctrl+C.

use std::io::{Write, stdout};
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use tankgauge_store::{MAX_SCAN_INTERVAL_MINUTES, MIN_SCAN_INTERVAL_MINUTES, StoreError};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{info, warn};

use super::Session;
use crate::output::{JsonFormatter, RefreshOutput, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for watch command.
#[derive(Args)]
pub struct WatchArgs {
    /// Account to watch. Defaults to the configured account.
    #[arg(long, short)]
    pub account: Option<String>,

    /// Minutes between refreshes. Defaults to the configured scan interval.
    #[arg(long, short)]
    pub interval: Option<u32>,
}

/// Runs the watch command.
pub async fn run(args: &WatchArgs, cli: &Cli, session: &Session) -> Result<()> {
    if let Some(minutes) = args.interval {
        check_interval(minutes)?;
    }

    let ctx = session.fetch_context()?;
    let credentials = Session::credentials(&ctx).await?;
    let account_id = session.account_id(args.account.as_deref()).await?;
    let coordinator = session.coordinator(&ctx, account_id).await;

    let period = args.interval.map_or(coordinator.config().scan_interval, |m| {
        Duration::from_secs(u64::from(m) * 60)
    });
    let threshold = coordinator.config().low_propane_threshold;
    let store = coordinator.store();
    let formatter = TextFormatter::new(!cli.no_color);

    info!(
        account_id = coordinator.account_id(),
        interval_secs = period.as_secs(),
        "Starting watch mode"
    );

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {}
        }

        // Dropping the refresh future on Ctrl+C abandons the in-flight requests.
        let result = tokio::select! {
            _ = &mut shutdown => break,
            result = coordinator.refresh(&credentials) => result,
        };

        if let Err(e) = &result {
            warn!(error = %e, "Scheduled refresh failed");
        }

        let status = store.status().await;
        let snapshot = store.snapshot().await;

        match cli.format {
            OutputFormat::Text => {
                print!("\x1b[2J\x1b[H");
                stdout().flush()?;

                let now = chrono::Local::now();
                println!(
                    "TankGauge Watch - {} (every {} min)",
                    now.format("%H:%M:%S"),
                    period.as_secs() / 60
                );
                println!("{}", "─".repeat(50));
                println!(
                    "{}",
                    formatter.format_status(status, store.last_error().await.as_deref())
                );
                println!();
                if let Some(snapshot) = &snapshot {
                    println!("{}", formatter.format_account(snapshot, threshold));
                    println!();
                }
                println!("Press Ctrl+C to exit");
            }
            OutputFormat::Json => {
                // One compact object per line.
                let output = RefreshOutput::new(
                    coordinator.account_id(),
                    status,
                    snapshot.as_deref(),
                )
                .with_history(store.last_error().await, store.last_success().await);
                println!("{}", JsonFormatter::new(false).format(&output)?);
            }
        }

        // Rejected credentials end the watch.
        if let Err(e) = result {
            if e.requires_reauth() {
                return Err(e.into());
            }
        }
    }

    info!("Watch stopped");
    Ok(())
}

fn check_interval(minutes: u32) -> Result<()> {
    if !(MIN_SCAN_INTERVAL_MINUTES..=MAX_SCAN_INTERVAL_MINUTES).contains(&minutes) {
        return Err(StoreError::Config(format!(
            "interval must be between {MIN_SCAN_INTERVAL_MINUTES} and {MAX_SCAN_INTERVAL_MINUTES} minutes, got {minutes}"
        ))
        .into());
    }
    Ok(())
}
