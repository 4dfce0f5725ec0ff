//! Request executor: one rate-limited API call per invocation.

use super::pagination::MAX_PAGINATION_REQUESTS;
use super::rate_limiter::RateLimiter;
use super::types::Params;
use crate::config::{ClientConfig, TlsVerification};
use crate::error::{MediaWikiError, Result};
use reqwest::{Certificate, Client, Method, Proxy};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;

/// Issues API requests through a shared HTTP session
pub struct RequestExecutor {
    /// HTTP session (cookies, user agent, proxies, TLS settings)
    client: Client,
    /// Endpoint every request is sent to
    api_url: String,
    /// Per-request timeout
    timeout: Option<Duration>,
    rate_limiter: RateLimiter,
    /// Most requests a single pagination run may issue
    pub(crate) pagination_cap: usize,
}

impl RequestExecutor {
    /// Create an executor from the client configuration
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            client: build_session(config)?,
            api_url: config.api_url(),
            timeout: config.timeout,
            rate_limiter: RateLimiter::new(config.rate_limit, config.rate_limit_wait),
            pagination_cap: MAX_PAGINATION_REQUESTS,
        })
    }

    /// Replace the HTTP session; cookies (and so any login) are dropped
    pub fn reset_session(&mut self, config: &ClientConfig) -> Result<()> {
        self.client = build_session(config)?;
        debug!(user_agent = %config.user_agent, "HTTP session recreated");
        Ok(())
    }

    /// Perform one API call.
    ///
    /// `format=json` is always sent and `action=query` is added when the
    /// caller did not pick an action. A body that is not JSON decodes to an
    /// empty object.
    pub async fn execute(&mut self, mut params: Params, method: Method) -> Result<Value> {
        params.insert("format", "json");
        if !params.contains_key("action") {
            params.insert("action", "query");
        }

        self.rate_limiter.throttle().await;

        debug!(
            url = %self.api_url,
            method = %method,
            action = params.get("action").unwrap_or_default(),
            list = params.get("list").unwrap_or_default(),
            "Making API request"
        );

        let mut request = if method == Method::POST {
            self.client.post(&self.api_url).form(&params)
        } else {
            self.client.get(&self.api_url).query(&params)
        };
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        self.rate_limiter.record_call();

        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(e) => {
                debug!(status = %status, error = %e, "Response was not JSON");
                Ok(Value::Object(Map::new()))
            }
        }
    }

    pub async fn get(&mut self, params: Params) -> Result<Value> {
        self.execute(params, Method::GET).await
    }

    pub async fn post(&mut self, params: Params) -> Result<Value> {
        self.execute(params, Method::POST).await
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn set_api_url(&mut self, api_url: String) {
        self.api_url = api_url;
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    pub fn rate_limiter_mut(&mut self) -> &mut RateLimiter {
        &mut self.rate_limiter
    }
}

/// Build a reqwest client with the session-level settings applied
fn build_session(config: &ClientConfig) -> Result<Client> {
    let mut builder = Client::builder()
        .user_agent(config.user_agent.as_str())
        .cookie_store(true);

    if let Some(proxies) = &config.proxies {
        for (scheme, url) in proxies {
            let proxy = match scheme.as_str() {
                "http" => Proxy::http(url.as_str())?,
                "https" => Proxy::https(url.as_str())?,
                "all" => Proxy::all(url.as_str())?,
                other => {
                    return Err(MediaWikiError::Config(format!(
                        "unsupported proxy scheme: {}",
                        other
                    )))
                }
            };
            builder = builder.proxy(proxy);
        }
    }

    builder = match &config.verify_ssl {
        TlsVerification::Enabled => builder,
        TlsVerification::Disabled => builder.danger_accept_invalid_certs(true),
        TlsVerification::CaBundle(path) => {
            let pem = std::fs::read(path).map_err(|e| {
                MediaWikiError::Config(format!(
                    "failed to read CA bundle {}: {}",
                    path.display(),
                    e
                ))
            })?;
            builder.add_root_certificate(Certificate::from_pem(&pem)?)
        }
    };

    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_executor_creation() {
        let executor = RequestExecutor::new(&ClientConfig::default());
        assert!(executor.is_ok());
        let executor = executor.unwrap();
        assert_eq!(executor.api_url(), "https://en.wikipedia.org/w/api.php");
        assert_eq!(executor.timeout(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_unknown_proxy_scheme_rejected() {
        let mut proxies = BTreeMap::new();
        proxies.insert("gopher".to_string(), "http://127.0.0.1:70".to_string());
        let config = ClientConfig {
            proxies: Some(proxies),
            ..Default::default()
        };

        assert!(matches!(
            RequestExecutor::new(&config),
            Err(MediaWikiError::Config(_))
        ));
    }

    #[test]
    fn test_missing_ca_bundle_rejected() {
        let config = ClientConfig {
            verify_ssl: TlsVerification::CaBundle("/nonexistent/bundle.pem".into()),
            ..Default::default()
        };

        assert!(matches!(
            RequestExecutor::new(&config),
            Err(MediaWikiError::Config(_))
        ));
    }
}
