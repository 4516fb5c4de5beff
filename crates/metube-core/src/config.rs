//! Application configuration management.
//!
//! Configuration holds the API key, the channel whose subscriptions are
//! mirrored, and optional overrides for the cache path and API endpoint.
//!
//! It is read from `~/.config/metube/config.json` (or an explicit path),
//! then overridden by `METUBE_*` environment variables.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::{ApiConfig, DEFAULT_API_BASE_URL};
use crate::utils::expand_home;

/// Application name used for config directory paths
const APP_NAME: &str = "metube";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Cache location relative to the home directory
const DEFAULT_CACHE_FILE: &str = "dev/metube/subs.csv";

const ENV_API_KEY: &str = "METUBE_API_KEY";
const ENV_MY_CHANNEL: &str = "METUBE_MY_CHANNEL";
const ENV_CACHE_FILE: &str = "METUBE_CACHE_FILE";
const ENV_API_BASE_URL: &str = "METUBE_API_BASE_URL";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_key: Option<String>,
    pub my_channel: Option<String>,
    pub cache_file: Option<PathBuf>,
    pub api_base_url: Option<String>,
    pub max_pages: Option<usize>,
}

/// Fully resolved settings. Required values are present.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub my_channel: String,
    pub cache_file: PathBuf,
    pub api_base_url: String,
    pub max_pages: Option<usize>,
}

impl Settings {
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::new(self.api_key.clone())
            .with_base_url(self.api_base_url.clone())
            .with_max_pages(self.max_pages)
    }
}

impl Config {
    /// Load from the default location. A missing file yields an empty config.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_optional(&path)
    }

    /// Load from an explicit path, which must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn load_optional(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Apply `METUBE_*` environment variables on top of the file values.
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = lookup(ENV_API_KEY) {
            self.api_key = Some(v);
        }
        if let Some(v) = lookup(ENV_MY_CHANNEL) {
            self.my_channel = Some(v);
        }
        if let Some(v) = lookup(ENV_CACHE_FILE) {
            self.cache_file = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup(ENV_API_BASE_URL) {
            self.api_base_url = Some(v);
        }
        self
    }

    /// Check required values and fill in defaults.
    pub fn resolve(self) -> Result<Settings> {
        let api_key = self
            .api_key
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("No API key configured: set api_key in {} or {}", CONFIG_FILE, ENV_API_KEY))?;
        let my_channel = self
            .my_channel
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("No channel configured: set my_channel in {} or {}", CONFIG_FILE, ENV_MY_CHANNEL))?;

        let cache_file = match self.cache_file {
            Some(path) => expand_home(&path),
            None => dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?
                .join(DEFAULT_CACHE_FILE),
        };

        Ok(Settings {
            api_key,
            my_channel,
            cache_file,
            api_base_url: self
                .api_base_url
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            max_pages: self.max_pages,
        })
    }
}
