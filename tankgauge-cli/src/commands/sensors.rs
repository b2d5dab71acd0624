//! Sensors command - evaluate every sensor for one account.

use anyhow::Result;

use super::Session;
use super::refresh::{RefreshArgs, refresh_once};
use crate::output::{JsonFormatter, RefreshOutput, TextFormatter, sensor_readings};
use crate::{Cli, OutputFormat};

/// Runs the sensors command.
pub async fn run(args: &RefreshArgs, cli: &Cli, session: &Session) -> Result<()> {
    let (coordinator, snapshot) = refresh_once(args, session).await?;
    let store = coordinator.store();
    let threshold = coordinator.config().low_propane_threshold;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            let readings = sensor_readings(&snapshot, threshold);
            println!("{}", formatter.format_sensors(&readings, cli.verbose));
        }
        OutputFormat::Json => {
            let output = RefreshOutput::new(
                coordinator.account_id(),
                store.status().await,
                Some(snapshot.as_ref()),
            )
            .with_sensors(threshold);
            println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);
        }
    }

    Ok(())
}
