//! MediaWiki API client library.
//!
//! This library wraps the MediaWiki action API: searching, listing and
//! summarizing pages, walking category trees, and issuing raw requests. API
//! results are memoized per operation and requests can be rate limited.

pub mod api;
pub mod cache;
pub mod category_tree;
pub mod client;
pub mod config;
pub mod error;
pub mod page;
pub mod site_info;

pub use api::{
    CategoryMembers, GeoQuery, OpenSearchResult, Params, RateLimiter, RequestExecutor,
    SearchResults,
};
pub use cache::{CacheStats, ResponseCache};
pub use category_tree::{Categories, CategoryTree, CategoryTreeNode};
pub use client::MediaWiki;
pub use config::{ClientConfig, TlsVerification};
pub use error::{MediaWikiError, Result};
pub use page::{PageRef, WikiPage};
pub use site_info::SiteInfo;
