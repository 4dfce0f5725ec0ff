//! TOML configuration for the MediaWiki client tools.
//!
//! Every section and key is optional; missing ones take the defaults below.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Top-level configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Data directory settings
    #[serde(default)]
    pub data: DataConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// MediaWiki API settings
    #[serde(default)]
    pub mediawiki: MediaWikiConfig,
}

/// Data directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Root data directory path
    pub root_dir: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log directory path (relative to data directory or absolute)
    pub log_dir: String,

    /// Default log level (trace, debug, info, warn, error)
    pub default_level: String,

    /// Enable console output
    pub console: bool,

    /// Enable file output
    pub file: bool,

    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

/// MediaWiki API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaWikiConfig {
    /// API URL; `{lang}` is replaced with the language code
    pub url: String,

    /// Language code of the wiki
    pub lang: String,

    /// Request timeout in seconds (None = no timeout)
    pub timeout_secs: Option<f64>,

    /// Enable client-side rate limiting
    pub rate_limit: bool,

    /// Minimum wait between requests when rate limiting, in milliseconds
    pub rate_limit_wait_ms: u64,

    /// Category namespace prefix used by the wiki
    pub category_prefix: String,

    /// User agent override
    pub user_agent: Option<String>,

    /// Login credentials
    pub username: Option<String>,
    pub password: Option<String>,

    /// Proxy URL per scheme (`http`, `https`)
    pub proxies: BTreeMap<String, String>,

    /// Verify TLS certificates
    pub verify_ssl: bool,

    /// PEM bundle to trust in addition to the system roots
    pub ca_bundle: Option<String>,

    /// Memoize API results
    pub use_cache: bool,

    /// Cache refresh interval in seconds (None = never refresh)
    pub refresh_interval_secs: Option<u64>,

    /// Delay between category tree retries in milliseconds
    pub tree_retry_delay_ms: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            root_dir: "data".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            default_level: "info".to_string(),
            console: true,
            file: true,
            json_format: false,
        }
    }
}

impl Default for MediaWikiConfig {
    fn default() -> Self {
        Self {
            url: "https://{lang}.wikipedia.org/w/api.php".to_string(),
            lang: "en".to_string(),
            timeout_secs: Some(15.0),
            rate_limit: false,
            rate_limit_wait_ms: 50,
            category_prefix: "Category".to_string(),
            user_agent: None,
            username: None,
            password: None,
            proxies: BTreeMap::new(),
            verify_ssl: true,
            ca_bundle: None,
            use_cache: true,
            refresh_interval_secs: None,
            tree_retry_delay_ms: 1000,
        }
    }
}

impl Config {
    /// Load a TOML file; a missing file yields the defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Write the configuration as pretty TOML
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = toml::to_string_pretty(self)
            .context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration saved successfully"
        );

        Ok(())
    }

    /// Root data directory
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data.root_dir)
    }

    /// Log directory, resolved against the data directory when relative
    pub fn log_dir(&self) -> PathBuf {
        let log_path = Path::new(&self.logging.log_dir);
        if log_path.is_absolute() {
            log_path.to_path_buf()
        } else {
            self.data_dir().join(log_path)
        }
    }
}
