//! Configuration management for the repository viewer CLI.
//!
//! The configuration is stored in TOML format. Every section is optional;
//! missing values take their defaults, and running without any configuration
//! file is supported.
//!
//! # Example TOML Configuration
//!
//! ```toml
//! [github]
//! api_base_url = "https://api.github.com"
//! token = "ghp_example"
//!
//! [timeouts]
//! metadata_secs = 10
//! content_secs = 30
//! archive_secs = 60
//!
//! [download]
//! concurrency = 5
//! store_threshold = 10485760
//! output_dir = "./downloads"
//!
//! [cache]
//! release_ttl_secs = 600
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use github_client::ClientConfig;
use repo_viewer_core::{DownloadConfig, DEFAULT_RELEASE_TTL};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::Error;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "repo-viewer.toml";

/// Environment variable that overrides the configured token
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// Main configuration structure for the repository viewer CLI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub timeouts: TimeoutConfig,

    #[serde(default)]
    pub download: DownloadSettings,

    #[serde(default)]
    pub cache: CacheConfig,
}

impl AppConfig {
    /// Loads configuration from a TOML file at the specified path.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the file does not exist, cannot be read, or
    /// does not parse.
    pub fn load(path: &Path) -> Result<Self, Error> {
        debug!("Loading configuration from {:?}", path);

        if !path.exists() {
            return Err(Error::Config(format!(
                "Configuration file not found: {:?}",
                path
            )));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read configuration file: {}", e)))?;

        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse configuration file: {}", e)))?;

        Ok(config)
    }

    /// Loads the configuration for a run.
    ///
    /// An explicitly given path must exist. Without one, the default file in
    /// the current directory is used when present, and defaults otherwise.
    pub fn load_or_default(explicit: Option<&str>) -> Result<Self, Error> {
        let path = get_config_path(explicit);
        if explicit.is_none() && !path.exists() {
            debug!("No configuration file found; using defaults");
            return Ok(Self::default());
        }
        Self::load(&path)
    }

    /// Saves the configuration to a TOML file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        debug!("Saving configuration to {:?}", path);

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize configuration: {}", e)))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create directory: {}", e)))?;
        }

        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write configuration file: {}", e)))?;

        info!("Configuration saved to {:?}", path);
        Ok(())
    }

    /// The token to use: `env_token` when set and non-blank, else the configured one.
    pub fn resolve_token(&self, env_token: Option<String>) -> Option<String> {
        env_token
            .filter(|t| !t.trim().is_empty())
            .or_else(|| self.github.token.clone())
            .filter(|t| !t.trim().is_empty())
    }

    /// Client settings derived from the `[github]` and `[timeouts]` sections.
    pub fn client_config(&self) -> ClientConfig {
        let defaults = ClientConfig::default();
        ClientConfig {
            api_base_url: self
                .github
                .api_base_url
                .clone()
                .unwrap_or(defaults.api_base_url),
            raw_base_url: self
                .github
                .raw_base_url
                .clone()
                .unwrap_or(defaults.raw_base_url),
            user_agent: defaults.user_agent,
            metadata_timeout: Duration::from_secs(self.timeouts.metadata_secs),
            content_timeout: Duration::from_secs(self.timeouts.content_secs),
            archive_timeout: Duration::from_secs(self.timeouts.archive_secs),
        }
    }

    pub fn download_config(&self) -> DownloadConfig {
        DownloadConfig {
            concurrency: self.download.concurrency,
            store_threshold: self.download.store_threshold,
        }
    }

    /// Location of the persistent cache and history file.
    pub fn store_path(&self) -> PathBuf {
        self.cache.store_path.clone().unwrap_or_else(default_store_path)
    }

    pub fn release_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.release_ttl_secs)
    }
}

/// `[github]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_base_url: Option<String>,

    /// Personal access token; `GITHUB_TOKEN` takes precedence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// `[timeouts]` section, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub metadata_secs: u64,
    pub content_secs: u64,
    pub archive_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        let defaults = ClientConfig::default();
        Self {
            metadata_secs: defaults.metadata_timeout.as_secs(),
            content_secs: defaults.content_timeout.as_secs(),
            archive_secs: defaults.archive_timeout.as_secs(),
        }
    }
}

/// `[download]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    pub concurrency: usize,
    pub store_threshold: u64,
    /// Directory archives are written to
    pub output_dir: PathBuf,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        let defaults = DownloadConfig::default();
        Self {
            concurrency: defaults.concurrency,
            store_threshold: defaults.store_threshold,
            output_dir: PathBuf::from("."),
        }
    }
}

/// `[cache]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
    pub release_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            store_path: None,
            release_ttl_secs: DEFAULT_RELEASE_TTL.as_secs(),
        }
    }
}

/// Resolves the path to the configuration file.
///
/// Uses `config_path` when given, otherwise `repo-viewer.toml` in the current
/// directory.
pub fn get_config_path(config_path: Option<&str>) -> PathBuf {
    if let Some(path) = config_path {
        PathBuf::from(path)
    } else {
        let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        current_dir.join(DEFAULT_CONFIG_FILENAME)
    }
}

fn default_store_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("repo-viewer")
        .join("store.json")
}
