//! CLI command implementations.

pub mod accounts;
pub mod config;
pub mod login;
pub mod refresh;
pub mod sensors;
pub mod watch;

use std::sync::Arc;

use anyhow::{Context, Result};
use tankgauge_core::Credentials;
use tankgauge_fetch::FetchContext;
use tankgauge_providers::{FerrellgasCredentialStore, FerrellgasPipeline};
use tankgauge_store::{RefreshConfig, RefreshCoordinator, SettingsStore};

use crate::Cli;

/// Settings plus lazily built network state shared by every command.
pub struct Session {
    settings: SettingsStore,
}

impl Session {
    /// Loads settings from `--config` or the default location.
    pub async fn open(cli: &Cli) -> Self {
        let settings = match &cli.config {
            Some(path) => SettingsStore::load(path.clone()).await,
            None => SettingsStore::load_default().await,
        };
        Self { settings }
    }

    /// Returns the settings store.
    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// Builds a fetch context with the system keychain.
    pub fn fetch_context(&self) -> Result<FetchContext> {
        FetchContext::new().context("Failed to initialize HTTP client")
    }

    /// Builds the provider pipeline, honoring a `base_url` override.
    pub async fn pipeline(&self, ctx: &FetchContext) -> FerrellgasPipeline {
        match self.settings.get().await.base_url {
            Some(base_url) => FerrellgasPipeline::with_base_url(Arc::clone(&ctx.http), base_url),
            None => FerrellgasPipeline::new(ctx),
        }
    }

    /// Builds the credential store over the context's keychain.
    pub fn credential_store(ctx: &FetchContext) -> FerrellgasCredentialStore {
        FerrellgasCredentialStore::new(Arc::clone(&ctx.keychain))
    }

    /// Loads stored credentials.
    pub async fn credentials(ctx: &FetchContext) -> Result<Credentials> {
        Self::credential_store(ctx)
            .load()
            .await
            .context("No usable credentials, run `tankgauge login` first")
    }

    /// Resolves the account to refresh: an explicit id wins over settings.
    pub async fn account_id(&self, explicit: Option<&str>) -> Result<String> {
        if let Some(id) = explicit {
            return Ok(id.to_string());
        }
        self.settings.account_id().await.context(
            "No account selected, pass --account or run `tankgauge config set account_id <id>`",
        )
    }

    /// Builds a coordinator for one account using the current settings.
    pub async fn coordinator(
        &self,
        ctx: &FetchContext,
        account_id: String,
    ) -> RefreshCoordinator<FerrellgasPipeline> {
        let config = RefreshConfig::from(&self.settings.get().await);
        RefreshCoordinator::new(self.pipeline(ctx).await, account_id, config)
    }
}
