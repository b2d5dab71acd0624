//! Refresh coordination.
//!
//! [`RefreshCoordinator`] owns one provider and one account. It allows a
//! single refresh at a time and translates provider errors into a
//! [`RefreshStatus`] on its [`SnapshotStore`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tankgauge_core::derive::DEFAULT_LOW_PROPANE_THRESHOLD;
use tankgauge_core::{AccountSnapshot, Credentials, SnapshotProvider};
use tracing::{info, instrument};

use crate::error::StoreError;
use crate::settings_store::{DEFAULT_SCAN_INTERVAL_MINUTES, Settings};
use crate::snapshot_store::{RefreshStatus, SnapshotStore};

// ============================================================================
// Refresh Config
// ============================================================================

/// Host-side refresh parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshConfig {
    /// Time between scheduled refreshes.
    pub scan_interval: Duration,
    /// Low-propane sensor threshold, in percent.
    pub low_propane_threshold: u8,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            scan_interval: Duration::from_secs(u64::from(DEFAULT_SCAN_INTERVAL_MINUTES) * 60),
            low_propane_threshold: DEFAULT_LOW_PROPANE_THRESHOLD,
        }
    }
}

impl From<&Settings> for RefreshConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            scan_interval: settings.scan_interval(),
            low_propane_threshold: settings.low_propane_threshold,
        }
    }
}

// ============================================================================
// In-Flight Guard
// ============================================================================

/// Clears the in-flight flag on drop, including when the refresh future is
/// cancelled.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// ============================================================================
// Coordinator
// ============================================================================

/// Runs refreshes for one account, one at a time.
#[derive(Debug)]
pub struct RefreshCoordinator<P> {
    provider: P,
    account_id: String,
    config: RefreshConfig,
    store: SnapshotStore,
    in_flight: AtomicBool,
}

impl<P: SnapshotProvider> RefreshCoordinator<P> {
    /// Creates a coordinator with an empty snapshot store.
    pub fn new(provider: P, account_id: impl Into<String>, config: RefreshConfig) -> Self {
        Self {
            provider,
            account_id: account_id.into(),
            config,
            store: SnapshotStore::new(),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Returns the account this coordinator refreshes.
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// Returns the refresh parameters.
    pub fn config(&self) -> RefreshConfig {
        self.config
    }

    /// Returns the snapshot store.
    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Returns true while a refresh is running.
    pub fn is_refreshing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Runs one refresh.
    ///
    /// On success the new snapshot replaces the old one. On failure the old
    /// snapshot is kept and the store's status becomes
    /// [`RefreshStatus::ReauthRequired`] or [`RefreshStatus::Stale`].
    #[instrument(skip(self, credentials), fields(account_id = %self.account_id))]
    pub async fn refresh(
        &self,
        credentials: &Credentials,
    ) -> Result<Arc<AccountSnapshot>, StoreError> {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            return Err(StoreError::RefreshInProgress(self.account_id.clone()));
        };

        match self.provider.refresh(credentials, &self.account_id).await {
            Ok(snapshot) => {
                info!(
                    provider = self.provider.name(),
                    tanks = snapshot.tanks.len(),
                    "Refresh complete"
                );
                Ok(self.store.set_snapshot(snapshot).await)
            }
            Err(e) => {
                let status = if e.requires_reauth() {
                    RefreshStatus::ReauthRequired
                } else {
                    RefreshStatus::Stale
                };
                self.store.mark_failed(status, e.to_string()).await;
                Err(StoreError::Refresh(e))
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
