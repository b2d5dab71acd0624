//! User preferences store.
//!
//! Manages user settings with persistence and change notification.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tankgauge_core::derive::DEFAULT_LOW_PROPANE_THRESHOLD;
use tokio::sync::{RwLock, watch};
use tracing::{debug, info};
use url::Url;

use crate::error::StoreError;
use crate::persistence::{default_settings_path, read_settings, write_settings};

/// Default polling interval.
pub const DEFAULT_SCAN_INTERVAL_MINUTES: u32 = 60;

/// Shortest allowed polling interval.
pub const MIN_SCAN_INTERVAL_MINUTES: u32 = 5;

/// Longest allowed polling interval (one day).
pub const MAX_SCAN_INTERVAL_MINUTES: u32 = 1440;

/// Lowest allowed low-propane threshold.
pub const MIN_LOW_PROPANE_THRESHOLD: u8 = 1;

/// Highest allowed low-propane threshold.
pub const MAX_LOW_PROPANE_THRESHOLD: u8 = 100;

// ============================================================================
// Settings Types
// ============================================================================

/// User preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Account polled by `refresh` and `watch`.
    pub account_id: Option<String>,

    /// Portal username. The password lives in the keychain.
    pub username: Option<String>,

    /// Minutes between scheduled refreshes.
    pub scan_interval_minutes: u32,

    /// Tank percentage below which the low-propane sensor is on.
    pub low_propane_threshold: u8,

    /// API base URL override.
    pub base_url: Option<String>,

    /// Log level.
    pub log_level: LogLevel,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            account_id: None,
            username: None,
            scan_interval_minutes: DEFAULT_SCAN_INTERVAL_MINUTES,
            low_propane_threshold: DEFAULT_LOW_PROPANE_THRESHOLD,
            base_url: None,
            log_level: LogLevel::default(),
        }
    }
}

impl Settings {
    /// Checks every field against its allowed range.
    pub fn validate(&self) -> Result<(), StoreError> {
        if !(MIN_SCAN_INTERVAL_MINUTES..=MAX_SCAN_INTERVAL_MINUTES)
            .contains(&self.scan_interval_minutes)
        {
            return Err(StoreError::Config(format!(
                "scan_interval_minutes must be between {MIN_SCAN_INTERVAL_MINUTES} and {MAX_SCAN_INTERVAL_MINUTES}, got {}",
                self.scan_interval_minutes
            )));
        }

        if !(MIN_LOW_PROPANE_THRESHOLD..=MAX_LOW_PROPANE_THRESHOLD)
            .contains(&self.low_propane_threshold)
        {
            return Err(StoreError::Config(format!(
                "low_propane_threshold must be between {MIN_LOW_PROPANE_THRESHOLD} and {MAX_LOW_PROPANE_THRESHOLD}, got {}",
                self.low_propane_threshold
            )));
        }

        if let Some(base_url) = &self.base_url {
            let parsed = Url::parse(base_url)
                .map_err(|e| StoreError::Config(format!("base_url is invalid: {e}")))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(StoreError::Config(format!(
                    "base_url must use http or https, got {}",
                    parsed.scheme()
                )));
            }
        }

        if self.account_id.as_deref().is_some_and(|id| id.trim().is_empty()) {
            return Err(StoreError::Config("account_id must not be empty".to_string()));
        }

        Ok(())
    }

    /// Returns the polling interval.
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.scan_interval_minutes) * 60)
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Error level logging.
    Error,
    /// Warning level logging.
    #[default]
    Warn,
    /// Info level logging.
    Info,
    /// Debug level logging.
    Debug,
    /// Trace level logging.
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(StoreError::Config(format!("unknown log level: {other}"))),
        }
    }
}

// ============================================================================
// Settings Store
// ============================================================================

/// Settings store with persistence.
#[derive(Debug)]
pub struct SettingsStore {
    settings: Arc<RwLock<Settings>>,
    path: PathBuf,
    notify: watch::Sender<u64>,
    version: Arc<RwLock<u64>>,
    load_issue: Option<String>,
}

impl SettingsStore {
    /// Creates a new settings store with defaults.
    pub fn new(path: PathBuf) -> Self {
        Self::with_settings(path, Settings::default())
    }

    fn with_settings(path: PathBuf, settings: Settings) -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            settings: Arc::new(RwLock::new(settings)),
            path,
            notify,
            version: Arc::new(RwLock::new(0)),
            load_issue: None,
        }
    }

    /// Loads settings from the default path.
    pub async fn load_default() -> Self {
        Self::load(default_settings_path()).await
    }

    /// Loads settings from a path.
    ///
    /// A missing, unreadable or out-of-range file yields defaults. Why a file
    /// was discarded is available from [`Self::load_issue`].
    pub async fn load(path: PathBuf) -> Self {
        if !path.exists() {
            debug!(path = %path.display(), "Settings file not found, using defaults");
            return Self::new(path);
        }

        let loaded = read_settings(&path)
            .await
            .map_err(|e| format!("failed to read settings: {e}"))
            .and_then(|settings| {
                settings
                    .validate()
                    .map(|()| settings)
                    .map_err(|e| format!("invalid settings: {e}"))
            });

        match loaded {
            Ok(settings) => {
                debug!(path = %path.display(), "Settings loaded");
                Self::with_settings(path, settings)
            }
            Err(issue) => Self {
                load_issue: Some(issue),
                ..Self::new(path)
            },
        }
    }

    /// Why the settings file was replaced by defaults, if it was.
    pub fn load_issue(&self) -> Option<&str> {
        self.load_issue.as_deref()
    }

    /// Returns the settings file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets a copy of the current settings.
    pub async fn get(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Applies `f` to a copy of the settings and keeps the result only if it
    /// validates.
    pub async fn update<F>(&self, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Settings),
    {
        {
            let mut settings = self.settings.write().await;
            let mut candidate = settings.clone();
            f(&mut candidate);
            candidate.validate()?;
            *settings = candidate;
        }
        self.notify_change().await;
        Ok(())
    }

    /// Saves settings to disk.
    pub async fn save(&self) -> Result<(), StoreError> {
        let settings = self.settings.read().await;
        settings.validate()?;
        write_settings(&self.path, &settings).await?;
        info!(path = %self.path.display(), "Settings saved");
        Ok(())
    }

    /// Subscribes to settings changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notify.subscribe()
    }

    async fn notify_change(&self) {
        let mut version = self.version.write().await;
        *version += 1;
        let _ = self.notify.send(*version);
    }

    // ========================================================================
    // Convenience Methods
    // ========================================================================

    /// Gets the configured account id.
    pub async fn account_id(&self) -> Option<String> {
        self.settings.read().await.account_id.clone()
    }

    /// Gets the polling interval.
    pub async fn scan_interval(&self) -> Duration {
        self.settings.read().await.scan_interval()
    }

    /// Gets the low-propane threshold.
    pub async fn low_propane_threshold(&self) -> u8 {
        self.settings.read().await.low_propane_threshold
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.scan_interval_minutes, 60);
        assert_eq!(settings.low_propane_threshold, 20);
        assert_eq!(settings.scan_interval(), Duration::from_secs(3600));
        assert_eq!(settings.log_level, LogLevel::Warn);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_scan_interval_bounds() {
        let mut settings = Settings::default();

        settings.scan_interval_minutes = 5;
        assert!(settings.validate().is_ok());
        settings.scan_interval_minutes = 1440;
        assert!(settings.validate().is_ok());

        settings.scan_interval_minutes = 4;
        assert!(matches!(settings.validate(), Err(StoreError::Config(_))));
        settings.scan_interval_minutes = 1441;
        assert!(matches!(settings.validate(), Err(StoreError::Config(_))));
    }

    #[test]
    fn test_threshold_bounds() {
        let mut settings = Settings::default();

        settings.low_propane_threshold = 1;
        assert!(settings.validate().is_ok());
        settings.low_propane_threshold = 100;
        assert!(settings.validate().is_ok());

        settings.low_propane_threshold = 0;
        assert!(settings.validate().is_err());
        settings.low_propane_threshold = 101;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_base_url_validation() {
        let mut settings = Settings::default();

        settings.base_url = Some("http://localhost:8080".to_string());
        assert!(settings.validate().is_ok());

        settings.base_url = Some("not a url".to_string());
        assert!(settings.validate().is_err());

        settings.base_url = Some("ftp://example.com".to_string());
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_empty_account_id_rejected() {
        let settings = Settings {
            account_id: Some("  ".to_string()),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
        assert_eq!(LogLevel::Trace.to_string(), "trace");
    }

    #[tokio::test]
    async fn test_update_rejects_invalid() {
        let store = SettingsStore::new(PathBuf::from("unused.json"));

        store
            .update(|s| s.account_id = Some("A1".to_string()))
            .await
            .unwrap();
        assert_eq!(store.account_id().await.as_deref(), Some("A1"));

        let err = store.update(|s| s.scan_interval_minutes = 1).await;
        assert!(err.is_err());
        assert_eq!(store.get().await.scan_interval_minutes, 60);
    }

    #[tokio::test]
    async fn test_update_notifies() {
        let store = SettingsStore::new(PathBuf::from("unused.json"));
        let mut rx = store.subscribe();

        store.update(|s| s.low_propane_threshold = 30).await.unwrap();

        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), 1);
        assert_eq!(store.low_propane_threshold().await, 30);
    }
}
