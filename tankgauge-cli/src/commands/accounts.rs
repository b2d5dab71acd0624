//! Accounts command - list account ids for the stored credentials.

use anyhow::Result;
use tankgauge_core::SnapshotProvider;
use tracing::debug;

use super::Session;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Runs the accounts command.
pub async fn run(cli: &Cli, session: &Session) -> Result<()> {
    let ctx = session.fetch_context()?;
    let credentials = Session::credentials(&ctx).await?;
    let pipeline = session.pipeline(&ctx).await;

    let accounts = pipeline.accounts(&credentials).await?;
    let selected = session.settings().account_id().await;
    debug!(count = accounts.len(), "Listed accounts");

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_accounts(&accounts, selected.as_deref()));
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "accounts": accounts,
                "selected": selected,
            });
            println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);
        }
    }

    Ok(())
}
