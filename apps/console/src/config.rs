//! Console configuration management.
//!
//! Stored as JSON in `~/.config/gallerydesk/config.json`. Missing files and
//! missing fields fall back to defaults; `GALLERYDESK_API_URL` overrides the
//! API base URL.

use std::path::{Path, PathBuf};
use std::time::Duration;

use gallerydesk_upload::{RetryPolicy, SchedulerConfig};
use serde::{Deserialize, Serialize};

/// Environment variable overriding [`ConsoleConfig::api_base_url`].
pub const API_URL_ENV: &str = "GALLERYDESK_API_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Base URL of the content-management API.
    pub api_base_url: String,

    /// Public site used for gallery edit and view links.
    pub site_base_url: String,

    pub max_parallel_files: usize,
    pub chunk_batch_size: usize,

    /// Attempts per request, including the first.
    pub max_retries: u32,

    pub request_timeout_secs: u64,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        let scheduler = SchedulerConfig::default();
        Self {
            api_base_url: "http://localhost:3000".into(),
            site_base_url: "https://my.liquidandgrit.com".into(),
            max_parallel_files: scheduler.max_parallel_files,
            chunk_batch_size: scheduler.chunk_batch_size,
            max_retries: scheduler.retry.max_attempts,
            request_timeout_secs: gallerydesk_api::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl ConsoleConfig {
    /// Loads the configuration from the default path and applies the
    /// environment override.
    pub fn load() -> anyhow::Result<Self> {
        let mut config = Self::load_from(&config_path()?)?;
        config.apply_env_override(std::env::var(API_URL_ENV).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        match serde_json::from_str(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse console config, using defaults"
                );
                Ok(Self::default())
            }
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        set_permissions_0600(path);

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    fn apply_env_override(&mut self, api_url: Option<String>) {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Scheduler settings derived from this configuration.
    pub fn scheduler_config(&self) -> SchedulerConfig {
        let defaults = SchedulerConfig::default();
        SchedulerConfig {
            max_parallel_files: self.max_parallel_files.max(1),
            chunk_batch_size: self.chunk_batch_size.max(1),
            retry: RetryPolicy {
                max_attempts: self.max_retries.max(1),
                ..defaults.retry
            },
            ..defaults
        }
    }
}

fn set_permissions_0600(path: &Path) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600));
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
}

pub fn config_path() -> anyhow::Result<PathBuf> {
    Ok(config_base_dir()?.join("gallerydesk").join("config.json"))
}

fn config_base_dir() -> anyhow::Result<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        Ok(PathBuf::from(appdata))
    }

    #[cfg(not(target_os = "windows"))]
    {
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            if !xdg.is_empty() {
                return Ok(PathBuf::from(xdg));
            }
        }
        let home = std::env::var("HOME")
            .map_err(|_| anyhow::anyhow!("HOME is not set"))?;
        Ok(PathBuf::from(home).join(".config"))
    }
}
