//! MediaWiki API plumbing.
//!
//! This module provides the rate-limited request executor, the pagination
//! driver built on it, and the request/response types they exchange.

pub mod executor;
pub mod pagination;
pub mod rate_limiter;
pub mod types;

pub use executor::RequestExecutor;
pub use pagination::{MAX_PAGINATION_REQUESTS, MAX_PULL};
pub use rate_limiter::RateLimiter;
pub use types::*;
