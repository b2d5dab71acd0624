//! Refresh command - fetch one snapshot and print it.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use tankgauge_core::AccountSnapshot;
use tankgauge_providers::FerrellgasPipeline;
use tankgauge_store::RefreshCoordinator;

use super::Session;
use crate::output::{JsonFormatter, RefreshOutput, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments shared by the refresh and sensors commands.
#[derive(Args)]
pub struct RefreshArgs {
    /// Account to refresh. Defaults to the configured account.
    #[arg(long, short)]
    pub account: Option<String>,
}

/// Runs the refresh command.
pub async fn run(args: &RefreshArgs, cli: &Cli, session: &Session) -> Result<()> {
    let (coordinator, snapshot) = refresh_once(args, session).await?;
    let store = coordinator.store();
    let threshold = coordinator.config().low_propane_threshold;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_account(&snapshot, threshold));
        }
        OutputFormat::Json => {
            let output = RefreshOutput::new(
                coordinator.account_id(),
                store.status().await,
                Some(snapshot.as_ref()),
            )
            .with_history(store.last_error().await, store.last_success().await);
            println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);
        }
    }

    Ok(())
}

/// Loads credentials, builds a coordinator and runs a single refresh.
pub(crate) async fn refresh_once(
    args: &RefreshArgs,
    session: &Session,
) -> Result<(RefreshCoordinator<FerrellgasPipeline>, Arc<AccountSnapshot>)> {
    let ctx = session.fetch_context()?;
    let credentials = Session::credentials(&ctx).await?;
    let account_id = session.account_id(args.account.as_deref()).await?;

    let coordinator = session.coordinator(&ctx, account_id).await;
    let snapshot = coordinator.refresh(&credentials).await?;
    Ok((coordinator, snapshot))
}
