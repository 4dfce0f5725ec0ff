//! Client configuration.

use crate::error::{MediaWikiError, Result};
use shared::MediaWikiConfig;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Default API URL; `{lang}` is substituted with the language code
pub const DEFAULT_API_URL: &str = "https://{lang}.wikipedia.org/w/api.php";

/// Library version reported in the default user agent
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// How TLS certificates are verified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsVerification {
    /// Verify against the system roots
    Enabled,
    /// Accept any certificate
    Disabled,
    /// Verify against the system roots plus the PEM bundle at this path
    CaBundle(PathBuf),
}

/// Settings used to construct a [`crate::MediaWiki`] client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API URL template
    pub url: String,
    /// Language code substituted into `url`
    pub lang: String,
    /// Per-request timeout (None = no timeout)
    pub timeout: Option<Duration>,
    /// Enforce `rate_limit_wait` between requests
    pub rate_limit: bool,
    pub rate_limit_wait: Duration,
    /// Category namespace name, without the trailing colon
    pub category_prefix: String,
    pub user_agent: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Proxy URL per scheme (`http`, `https`)
    pub proxies: Option<BTreeMap<String, String>>,
    pub verify_ssl: TlsVerification,
    /// Memoize API results
    pub use_cache: bool,
    /// Recompute memoized results older than this
    pub refresh_interval: Option<Duration>,
    /// Pause between category tree retries
    pub tree_retry_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_API_URL.to_string(),
            lang: "en".to_string(),
            timeout: Some(Duration::from_secs(15)),
            rate_limit: false,
            rate_limit_wait: Duration::from_millis(50),
            category_prefix: "Category".to_string(),
            user_agent: default_user_agent(),
            username: None,
            password: None,
            proxies: None,
            verify_ssl: TlsVerification::Enabled,
            use_cache: true,
            refresh_interval: None,
            tree_retry_delay: Duration::from_secs(1),
        }
    }
}

impl ClientConfig {
    /// Configuration for the given API URL template and language
    pub fn new(url: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            lang: lang.into(),
            ..Default::default()
        }
    }

    /// The API URL with the language substituted
    pub fn api_url(&self) -> String {
        format_api_url(&self.url, &self.lang)
    }
}

impl TryFrom<&MediaWikiConfig> for ClientConfig {
    type Error = MediaWikiError;

    fn try_from(config: &MediaWikiConfig) -> Result<Self> {
        let verify_ssl = match (&config.ca_bundle, config.verify_ssl) {
            (Some(path), _) => TlsVerification::CaBundle(PathBuf::from(path)),
            (None, true) => TlsVerification::Enabled,
            (None, false) => TlsVerification::Disabled,
        };

        Ok(Self {
            url: config.url.clone(),
            lang: config.lang.clone(),
            timeout: timeout_from_secs(config.timeout_secs)?,
            rate_limit: config.rate_limit,
            rate_limit_wait: Duration::from_millis(config.rate_limit_wait_ms),
            category_prefix: normalize_category_prefix(&config.category_prefix),
            user_agent: config.user_agent.clone().unwrap_or_else(default_user_agent),
            username: config.username.clone(),
            password: config.password.clone(),
            proxies: (!config.proxies.is_empty()).then(|| config.proxies.clone()),
            verify_ssl,
            use_cache: config.use_cache,
            refresh_interval: config.refresh_interval_secs.map(Duration::from_secs),
            tree_retry_delay: Duration::from_millis(config.tree_retry_delay_ms),
        })
    }
}

/// Request timeout from a seconds value; zero means no timeout
pub fn timeout_from_secs(secs: Option<f64>) -> Result<Option<Duration>> {
    match secs {
        None => Ok(None),
        Some(secs) if secs == 0.0 => Ok(None),
        Some(secs) => Duration::try_from_secs_f64(secs).map(Some).map_err(|e| {
            MediaWikiError::Config(format!("timeout_secs = {}: {}", secs, e))
        }),
    }
}

/// User agent sent when none is configured
pub fn default_user_agent() -> String {
    format!("mediawiki-client/VERSION-{}/BOT", VERSION)
}

/// Substitute the (lowercased) language into an API URL template
pub fn format_api_url(template: &str, lang: &str) -> String {
    template.replace("{lang}", &lang.to_lowercase())
}

/// Strip a trailing colon from a category prefix
pub fn normalize_category_prefix(prefix: &str) -> String {
    prefix.strip_suffix(':').unwrap_or(prefix).to_string()
}
