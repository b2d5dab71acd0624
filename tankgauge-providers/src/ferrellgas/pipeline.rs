//! Ferrellgas refresh pipeline.
//!
//! One refresh is: login, account summary, per-tank enrichment. Nothing is
//! carried between refreshes.

use std::sync::Arc;

use tankgauge_core::{AccountSnapshot, CoreError, Credentials, SnapshotProvider};
use tankgauge_fetch::{FetchContext, HttpClient};
use tracing::{debug, info, instrument};

use super::api::FerrellgasApiClient;
use super::enricher::enrich_tanks;
use super::error::FerrellgasError;
use super::parser::parse_account_summary;

/// Builds [`AccountSnapshot`]s from the Ferrellgas portal.
#[derive(Debug, Clone)]
pub struct FerrellgasPipeline {
    client: FerrellgasApiClient,
}

impl FerrellgasPipeline {
    /// Creates a pipeline against the production API.
    pub fn new(ctx: &FetchContext) -> Self {
        Self::from_client(FerrellgasApiClient::new(Arc::clone(&ctx.http)))
    }

    /// Creates a pipeline against a custom base URL.
    pub fn with_base_url(http: Arc<HttpClient>, base_url: impl Into<String>) -> Self {
        Self::from_client(FerrellgasApiClient::with_base_url(http, base_url))
    }

    /// Wraps an existing API client.
    pub fn from_client(client: FerrellgasApiClient) -> Self {
        Self { client }
    }

    /// Logs in and lists the account ids for these credentials.
    #[instrument(skip(self, credentials))]
    pub async fn fetch_account_ids(
        &self,
        credentials: &Credentials,
    ) -> Result<Vec<String>, FerrellgasError> {
        let token = self.client.login(credentials).await?;
        let accounts = self.client.account_ids(&token).await?;
        debug!(count = accounts.len(), "Fetched account ids");
        Ok(accounts)
    }

    /// Logs in and builds a fresh snapshot for one account.
    #[instrument(skip(self, credentials))]
    pub async fn fetch_snapshot(
        &self,
        credentials: &Credentials,
        account_id: &str,
    ) -> Result<AccountSnapshot, FerrellgasError> {
        let token = self.client.login(credentials).await?;

        let payload = self.client.account_summary(&token, account_id).await?;
        let mut snapshot = parse_account_summary(account_id, &payload);

        let tanks = std::mem::take(&mut snapshot.tanks);
        snapshot.tanks = enrich_tanks(&self.client, &token, tanks).await;

        info!(
            tanks = snapshot.tanks.len(),
            with_delivery = snapshot
                .tanks
                .iter()
                .filter(|t| t.last_delivery.is_some())
                .count(),
            "Refreshed account"
        );

        Ok(snapshot)
    }
}

impl SnapshotProvider for FerrellgasPipeline {
    fn name(&self) -> &str {
        "Ferrellgas"
    }

    async fn accounts(&self, credentials: &Credentials) -> Result<Vec<String>, CoreError> {
        Ok(self.fetch_account_ids(credentials).await?)
    }

    async fn refresh(
        &self,
        credentials: &Credentials,
        account_id: &str,
    ) -> Result<AccountSnapshot, CoreError> {
        Ok(self.fetch_snapshot(credentials, account_id).await?)
    }
}
