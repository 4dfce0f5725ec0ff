//! Site metadata: MediaWiki version, base URL and installed extensions.

use crate::api::{Params, RequestExecutor};
use crate::error::{MediaWikiError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::info;

/// Metadata describing the wiki behind the API endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteInfo {
    /// MediaWiki version, e.g. `[1, 43, 0]`
    pub api_version: Vec<u32>,
    /// Dot-joined `api_version`
    pub api_version_str: String,
    pub base_url: String,
    /// Sorted, de-duplicated extension names
    pub extensions: Vec<String>,
}

/// Fetch and parse the site info from the endpoint
pub async fn resolve(executor: &mut RequestExecutor) -> Result<SiteInfo> {
    let params = Params::new()
        .with("meta", "siteinfo")
        .with("siprop", "extensions|general");
    let response = executor.get(params).await?;
    let site_info = parse(&response)?;

    info!(
        api_url = %executor.api_url(),
        api_version = %site_info.api_version_str,
        base_url = %site_info.base_url,
        extensions = site_info.extensions.len(),
        "Resolved site info"
    );

    Ok(site_info)
}

/// Parse a `meta=siteinfo&siprop=extensions|general` response
pub fn parse(response: &Value) -> Result<SiteInfo> {
    let query = response
        .get("query")
        .ok_or_else(|| MediaWikiError::Api("Missing query in response".to_string()))?;
    let general = query
        .get("general")
        .ok_or_else(|| MediaWikiError::Api("Missing query in response".to_string()))?;

    let generator = general
        .get("generator")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let api_version = parse_generator(generator)?;
    let api_version_str = api_version
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(".");

    let server = general
        .get("server")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let base = general
        .get("base")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let base_url = derive_base_url(server, base)?;

    let extensions: BTreeSet<String> = query
        .get("extensions")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(|ext| ext.get("name").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(SiteInfo {
        api_version,
        api_version_str,
        base_url,
        extensions: extensions.into_iter().collect(),
    })
}

/// `"MediaWiki 1.43.0-wmf.12"` -> `[1, 43, 0]`
pub fn parse_generator(generator: &str) -> Result<Vec<u32>> {
    let invalid = || MediaWikiError::Api(format!("Unable to parse generator: {:?}", generator));

    let version = generator
        .split_whitespace()
        .nth(1)
        .and_then(|v| v.split('-').next())
        .ok_or_else(invalid)?;

    version
        .split('.')
        .map(|part| part.parse::<u32>().map_err(|_| invalid()))
        .collect()
}

/// Use `server` as-is when it has a scheme, otherwise borrow the scheme of
/// the `base` page URL
pub fn derive_base_url(server: &str, base: &str) -> Result<String> {
    if server.is_empty() {
        return Err(MediaWikiError::Api("Unable to parse base url".to_string()));
    }
    if server.starts_with("http://") || server.starts_with("https://") {
        return Ok(server.to_string());
    }
    if base.starts_with("https:") {
        Ok(format!("https:{}", server))
    } else {
        Ok(format!("http:{}", server))
    }
}
