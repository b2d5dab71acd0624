//! Settings file location and owner-only JSON I/O.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::StoreError;
use crate::settings_store::Settings;

/// Returns the directory holding `settings.json`.
///
/// - macOS: `~/Library/Application Support/TankGauge`
/// - elsewhere: `<config dir>/tankgauge`, or `.` when no home is known
pub fn default_config_dir() -> PathBuf {
    let base = if cfg!(target_os = "macos") {
        dirs::home_dir().map(|h| h.join("Library").join("Application Support").join("TankGauge"))
    } else {
        dirs::config_dir().map(|c| c.join("tankgauge"))
    };
    base.unwrap_or_else(|| PathBuf::from("."))
}

/// Returns the default settings file path.
pub fn default_settings_path() -> PathBuf {
    default_config_dir().join("settings.json")
}

/// Reads and deserializes a settings file. Range checks are left to the caller.
pub(crate) async fn read_settings(path: &Path) -> Result<Settings, StoreError> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

/// Writes settings through a sibling temp file, then renames it into place.
///
/// A missing parent directory is created with mode 0700 and the file ends up
/// 0600 on Unix.
pub(crate) async fn write_settings(path: &Path, settings: &Settings) -> Result<(), StoreError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty() && !d.exists()) {
        tokio::fs::create_dir_all(dir).await?;
        owner_only(dir, 0o700).await?;
    }

    let staged = path.with_extension("json.tmp");
    tokio::fs::write(&staged, serde_json::to_string_pretty(settings)?).await?;
    tokio::fs::rename(&staged, path).await?;
    owner_only(path, 0o600).await?;

    debug!(path = %path.display(), "Settings file written");
    Ok(())
}

#[cfg(unix)]
async fn owner_only(path: &Path, mode: u32) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;

    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn owner_only(_path: &Path, _mode: u32) -> Result<(), StoreError> {
    Ok(())
}
