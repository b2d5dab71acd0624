//! Process-lifetime snapshot cache.
//!
//! Holds the latest good [`AccountSnapshot`] together with the outcome of
//! the most recent refresh. Nothing here is written to disk.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tankgauge_core::AccountSnapshot;
use tokio::sync::{RwLock, watch};
use tracing::{debug, warn};

// ============================================================================
// Refresh Status
// ============================================================================

/// Outcome of the most recent refresh, as seen by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshStatus {
    /// No refresh has completed yet.
    #[default]
    Pending,
    /// The last refresh succeeded.
    Fresh,
    /// The last refresh hit a connection or API failure. The previous
    /// snapshot, if any, is still served.
    Stale,
    /// The last refresh was rejected for bad or missing credentials.
    ReauthRequired,
}

impl std::fmt::Display for RefreshStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefreshStatus::Pending => write!(f, "pending"),
            RefreshStatus::Fresh => write!(f, "fresh"),
            RefreshStatus::Stale => write!(f, "stale"),
            RefreshStatus::ReauthRequired => write!(f, "reauth required"),
        }
    }
}

// ============================================================================
// Inner State
// ============================================================================

#[derive(Debug, Default)]
struct SnapshotStoreInner {
    snapshot: Option<Arc<AccountSnapshot>>,
    status: RefreshStatus,
    last_error: Option<String>,
    last_attempt: Option<DateTime<Utc>>,
    last_success: Option<DateTime<Utc>>,
}

// ============================================================================
// Snapshot Store
// ============================================================================

/// Latest snapshot plus refresh status, observable via a watch channel.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    inner: Arc<RwLock<SnapshotStoreInner>>,
    notify: watch::Sender<u64>,
    version: Arc<RwLock<u64>>,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            inner: Arc::new(RwLock::new(SnapshotStoreInner::default())),
            notify,
            version: Arc::new(RwLock::new(0)),
        }
    }

    /// Gets the latest good snapshot.
    pub async fn snapshot(&self) -> Option<Arc<AccountSnapshot>> {
        self.inner.read().await.snapshot.clone()
    }

    /// Gets the status of the last refresh.
    pub async fn status(&self) -> RefreshStatus {
        self.inner.read().await.status
    }

    /// Gets the error message of the last failed refresh.
    pub async fn last_error(&self) -> Option<String> {
        self.inner.read().await.last_error.clone()
    }

    /// Gets when the last refresh finished, successful or not.
    pub async fn last_attempt(&self) -> Option<DateTime<Utc>> {
        self.inner.read().await.last_attempt
    }

    /// Gets when the last successful refresh finished.
    pub async fn last_success(&self) -> Option<DateTime<Utc>> {
        self.inner.read().await.last_success
    }

    /// Replaces the snapshot wholesale and marks the data fresh.
    pub async fn set_snapshot(&self, snapshot: AccountSnapshot) -> Arc<AccountSnapshot> {
        let snapshot = Arc::new(snapshot);
        {
            let mut inner = self.inner.write().await;
            let now = Utc::now();
            inner.snapshot = Some(Arc::clone(&snapshot));
            inner.status = RefreshStatus::Fresh;
            inner.last_error = None;
            inner.last_attempt = Some(now);
            inner.last_success = Some(now);
        }
        self.notify_change().await;
        debug!(account_id = %snapshot.account_id, "Snapshot updated");
        snapshot
    }

    /// Records a failed refresh. The previous snapshot is kept.
    pub async fn mark_failed(&self, status: RefreshStatus, error: String) {
        {
            let mut inner = self.inner.write().await;
            inner.status = status;
            inner.last_error = Some(error);
            inner.last_attempt = Some(Utc::now());
        }
        self.notify_change().await;
        warn!(status = %status, "Refresh failed");
    }

    /// Subscribes to store changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notify.subscribe()
    }

    async fn notify_change(&self) {
        let mut version = self.version.write().await;
        *version += 1;
        let _ = self.notify.send(*version);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_new_store() {
        let store = SnapshotStore::new();
        assert!(store.snapshot().await.is_none());
        assert_eq!(store.status().await, RefreshStatus::Pending);
        assert!(store.last_success().await.is_none());
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_snapshot() {
        let store = SnapshotStore::new();
        store.set_snapshot(AccountSnapshot::new("A1", "Jane")).await;
        assert_eq!(store.status().await, RefreshStatus::Fresh);
        assert!(store.last_success().await.is_some());

        store
            .mark_failed(RefreshStatus::Stale, "HTTP 500".to_string())
            .await;

        assert_eq!(store.status().await, RefreshStatus::Stale);
        assert_eq!(store.last_error().await.as_deref(), Some("HTTP 500"));
        assert_eq!(store.snapshot().await.unwrap().account_id, "A1");
    }

    #[tokio::test]
    async fn test_success_clears_error() {
        let store = SnapshotStore::new();
        store
            .mark_failed(RefreshStatus::ReauthRequired, "bad creds".to_string())
            .await;
        assert!(store.last_success().await.is_none());
        assert!(store.last_attempt().await.is_some());

        store.set_snapshot(AccountSnapshot::new("A1", "Jane")).await;
        assert!(store.last_error().await.is_none());
        assert_eq!(store.status().await, RefreshStatus::Fresh);
    }

    #[tokio::test]
    async fn test_subscribe_sees_changes() {
        let store = SnapshotStore::new();
        let mut rx = store.subscribe();

        store.set_snapshot(AccountSnapshot::new("A1", "Jane")).await;
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        store
            .mark_failed(RefreshStatus::Stale, "timeout".to_string())
            .await;
        assert!(rx.has_changed().unwrap());
    }
}
