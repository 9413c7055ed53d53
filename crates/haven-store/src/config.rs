//! # Store Configuration
//!
//! Configuration for the persistence and synchronization layer.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     HAVEN_DATABASE_URL=https://...firebasedatabase.app                 │
//! │     HAVEN_STORAGE_DIR=/var/lib/haven                                   │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/designhaven/haven.toml (Linux)                           │
//! │     ~/Library/Application Support/com.designhaven.haven/haven.toml     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     no remote, platform data dir, 1s refresh interval                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # haven.toml
//! [remote]
//! database_url = "https://designhaven-dcda4-default-rtdb.asia-southeast1.firebasedatabase.app"
//! api_key = "AIzaSyCQ-..."
//! project_id = "designhaven-dcda4"
//!
//! [storage]
//! dir = "/var/lib/haven/storage"
//!
//! [refresh]
//! poll_interval_secs = 1
//! ```
//!
//! The `[remote]` section doubles as the capability probe: a configuration
//! without a non-empty `database_url` means the session runs local-only
//! from the start.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{StoreError, StoreResult};

// =============================================================================
// Remote Settings
// =============================================================================

/// Connection settings for the remote document store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteSettings {
    /// Base URL of the realtime database. Empty or absent means no remote.
    #[serde(default)]
    pub database_url: Option<String>,

    /// API key appended as the `auth` query parameter when present.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Project identifier, used only for diagnostics.
    #[serde(default)]
    pub project_id: Option<String>,
}

impl RemoteSettings {
    /// The capability probe: remote mode requires at minimum a non-empty
    /// database URL.
    pub fn is_configured(&self) -> bool {
        self.database_url
            .as_deref()
            .map(|url| !url.trim().is_empty())
            .unwrap_or(false)
    }
}

// =============================================================================
// Storage Settings
// =============================================================================

/// Local key-value storage settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Directory holding one JSON file per persisted key.
    /// Defaults to the platform data directory.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl StorageSettings {
    /// Resolves the storage directory, falling back to the platform
    /// data dir (`~/.local/share/designhaven/storage` on Linux).
    pub fn resolve_dir(&self) -> StoreResult<PathBuf> {
        if let Some(dir) = &self.dir {
            return Ok(dir.clone());
        }

        let dirs = ProjectDirs::from("com", "designhaven", "haven").ok_or_else(|| {
            StoreError::InvalidConfig("cannot determine a platform data directory".to_string())
        })?;
        Ok(dirs.data_dir().join("storage"))
    }
}

// =============================================================================
// Refresh Settings
// =============================================================================

/// Refresh task settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshSettings {
    /// Interval between reload cycles (seconds).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

fn default_poll_interval() -> u64 {
    1
}

impl Default for RefreshSettings {
    fn default() -> Self {
        RefreshSettings {
            poll_interval_secs: default_poll_interval(),
        }
    }
}

// =============================================================================
// Store Configuration
// =============================================================================

/// Complete configuration for the store layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub remote: RemoteSettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub refresh: RefreshSettings,
}

impl StoreConfig {
    /// Default config file path (`haven.toml` in the platform config dir).
    pub fn default_path() -> StoreResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "designhaven", "haven").ok_or_else(|| {
            StoreError::InvalidConfig("cannot determine a platform config directory".to_string())
        })?;
        Ok(dirs.config_dir().join("haven.toml"))
    }

    /// Loads configuration: file (if present) + environment overrides.
    /// A missing file is not an error; defaults apply.
    pub fn load() -> StoreResult<Self> {
        let path = Self::default_path()?;
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            StoreConfig::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Loads configuration from a specific TOML file.
    pub fn load_from(path: &Path) -> StoreResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| StoreError::ConfigLoadFailed(format!("{}: {}", path.display(), e)))?;
        let config: StoreConfig = toml::from_str(&raw)?;
        Ok(config)
    }

    /// Writes the configuration back to a TOML file.
    pub fn save_to(&self, path: &Path) -> StoreResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::ConfigSaveFailed(e.to_string()))?;
        }
        let raw = toml::to_string_pretty(self)?;
        std::fs::write(path, raw).map_err(|e| StoreError::ConfigSaveFailed(e.to_string()))?;
        Ok(())
    }

    /// Applies `HAVEN_*` environment variable overrides.
    ///
    /// Recognized variables:
    /// - `HAVEN_DATABASE_URL`
    /// - `HAVEN_API_KEY`
    /// - `HAVEN_PROJECT_ID`
    /// - `HAVEN_STORAGE_DIR`
    /// - `HAVEN_POLL_INTERVAL_SECS`
    pub fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("HAVEN_DATABASE_URL") {
            self.remote.database_url = Some(value);
        }
        if let Ok(value) = std::env::var("HAVEN_API_KEY") {
            self.remote.api_key = Some(value);
        }
        if let Ok(value) = std::env::var("HAVEN_PROJECT_ID") {
            self.remote.project_id = Some(value);
        }
        if let Ok(value) = std::env::var("HAVEN_STORAGE_DIR") {
            self.storage.dir = Some(PathBuf::from(value));
        }
        if let Ok(value) = std::env::var("HAVEN_POLL_INTERVAL_SECS") {
            if let Ok(secs) = value.parse() {
                self.refresh.poll_interval_secs = secs;
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
