//! Login and logout commands - manage stored credentials.

use std::io::{BufRead, Write};

use anyhow::{Context, Result, bail};
use clap::Args;
use tankgauge_core::{Credentials, SnapshotProvider};
use tracing::info;

use super::Session;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the login command.
#[derive(Args)]
pub struct LoginArgs {
    /// Portal username (email address).
    #[arg(long, short)]
    pub username: Option<String>,

    /// Portal password. Prompted for without echo when omitted.
    #[arg(long, env = "TANKGAUGE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Account to select after login.
    #[arg(long, short)]
    pub account: Option<String>,

    /// Store the credentials without checking them against the portal.
    #[arg(long)]
    pub no_verify: bool,
}

/// Runs the login command.
pub async fn run(args: &LoginArgs, cli: &Cli, session: &Session) -> Result<()> {
    let username = match &args.username {
        Some(username) => username.clone(),
        None => match session.settings().get().await.username {
            Some(username) => username,
            None => prompt("Username: ")?,
        },
    };
    let password = match &args.password {
        Some(password) => password.clone(),
        None => rpassword::prompt_password("Password: ").context("Failed to read password")?,
    };
    if username.is_empty() || password.is_empty() {
        bail!("Username and password must not be empty");
    }
    let credentials = Credentials::new(username, password);

    let ctx = session.fetch_context()?;

    let accounts = if args.no_verify {
        Vec::new()
    } else {
        session
            .pipeline(&ctx)
            .await
            .accounts(&credentials)
            .await
            .context("Login failed")?
    };

    let selected = choose_account(args.account.as_deref(), &accounts, args.no_verify)?;

    Session::credential_store(&ctx)
        .save(&credentials)
        .await
        .context("Failed to store credentials")?;

    let settings = session.settings();
    settings
        .update(|s| {
            s.username = Some(credentials.username.clone());
            if selected.is_some() {
                s.account_id.clone_from(&selected);
            }
        })
        .await?;
    settings.save().await?;

    info!(accounts = accounts.len(), "Credentials stored");

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("Logged in as {}", credentials.username);
            if !accounts.is_empty() {
                println!();
                println!("{}", formatter.format_accounts(&accounts, selected.as_deref()));
            }
            if selected.is_none() && accounts.len() > 1 {
                println!();
                println!("Select an account with `tankgauge config set account_id <id>`");
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "username": credentials.username,
                "verified": !args.no_verify,
                "accounts": accounts,
                "selected": selected,
            });
            println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);
        }
    }

    Ok(())
}

/// Removes stored credentials.
pub async fn logout(cli: &Cli, session: &Session) -> Result<()> {
    let ctx = session.fetch_context()?;
    Session::credential_store(&ctx)
        .clear()
        .await
        .context("Failed to remove credentials")?;

    info!("Credentials removed");
    if cli.format == OutputFormat::Text {
        println!("Credentials removed");
    }
    Ok(())
}

/// Picks the account to select after login.
///
/// An explicit account must be one of the verified accounts. Without one,
/// a single verified account is selected automatically.
fn choose_account(
    requested: Option<&str>,
    accounts: &[String],
    skip_check: bool,
) -> Result<Option<String>> {
    match requested {
        Some(id) if skip_check || accounts.iter().any(|a| a == id) => Ok(Some(id.to_string())),
        Some(id) => bail!("Account {id} is not visible to these credentials"),
        None if accounts.len() == 1 => Ok(accounts.first().cloned()),
        None => Ok(None),
    }
}

fn prompt(label: &str) -> Result<String> {
    let mut stderr = std::io::stderr();
    write!(stderr, "{label}")?;
    stderr.flush()?;

    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
