//! Error types for the MediaWiki client.
//!
//! API-reported errors arrive as `{"error": {"info": "..."}}` payloads and are
//! classified by their message text; see [`check_error_response`].

use serde_json::Value;
use thiserror::Error;

/// Messages the API uses when the backend timed out or is saturated
const HTTP_TIMEOUT_MESSAGES: [&str; 2] = ["HTTP request timed out.", "Pool queue is full"];

/// Messages the geosearch module uses for bad or missing coordinates
const GEO_COORD_MESSAGES: [&str; 3] = [
    "Page coordinates unknown.",
    "One of the parameters gscoord, gspage, gsbbox is required",
    "Invalid coordinate provided",
];

/// Main error type for MediaWiki client operations
#[derive(Debug, Error)]
pub enum MediaWikiError {
    #[error("{0} is not a valid MediaWiki API URL")]
    ApiUrl(String),

    #[error("Invalid client configuration: {0}")]
    Config(String),

    #[error("Searching for \"{0}\" resulted in a timeout; try again with a smaller query or a different server")]
    HttpTimeout(String),

    #[error("Geosearch error: {0}")]
    GeoCoord(String),

    #[error("MediaWiki API error: {0}")]
    Api(String),

    #[error("\"{0}\" does not match any pages; try another query")]
    PageNotFound(String),

    #[error("\"{0}\" resulted in a redirect and redirects are disabled")]
    Redirect(String),

    #[error("Category tree for \"{0}\" could not be completed: too many failed requests")]
    CategoryTree(String),

    #[error("MediaWiki login failure: {0}")]
    Login(String),

    #[error("{0}")]
    Validation(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response data: {0}")]
    Json(#[from] serde_json::Error),
}

impl MediaWikiError {
    /// Whether the category tree builder may retry after this error.
    ///
    /// Only a missing page is final.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, MediaWikiError::PageNotFound(_))
    }

    /// True for transport timeouts and API-reported backend timeouts
    pub fn is_timeout(&self) -> bool {
        match self {
            MediaWikiError::HttpTimeout(_) => true,
            MediaWikiError::Http(e) => e.is_timeout(),
            _ => false,
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, MediaWikiError>;

/// Map an `error` object in an API response to the matching error variant.
///
/// `query` is the user-facing value the request was made for; it is carried
/// by the timeout variant.
pub fn check_error_response(response: &Value, query: &str) -> Result<()> {
    let Some(error) = response.get("error") else {
        return Ok(());
    };

    let info = error
        .get("info")
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string();

    if HTTP_TIMEOUT_MESSAGES.contains(&info.as_str()) {
        return Err(MediaWikiError::HttpTimeout(query.to_string()));
    }
    if GEO_COORD_MESSAGES.contains(&info.as_str()) {
        return Err(MediaWikiError::GeoCoord(info));
    }
    Err(MediaWikiError::Api(info))
}

/// Reject blank or whitespace-only query values before any request is made
pub fn check_query(value: &str, message: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(MediaWikiError::Validation(message.to_string()));
    }
    Ok(())
}
