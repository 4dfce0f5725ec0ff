//! Response cache for memoized API operations.
//!
//! Results are kept in memory per operation, keyed by the call signature:
//! positional arguments in order, then every named parameter of the
//! operation (declared defaults included) sorted by name. Entries live until
//! [`ResponseCache::clear`] or, when a refresh interval is set, until they
//! are older than it.

use crate::error::Result;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// A memoizable operation and the defaults of its named parameters
#[derive(Debug, Clone, Copy)]
pub struct Operation {
    pub name: &'static str,
    pub defaults: &'static [(&'static str, &'static str)],
}

/// Arguments of a single call, used to build its cache key
#[derive(Debug, Clone, Default)]
pub struct CallArgs {
    positional: Vec<String>,
    named: BTreeMap<String, String>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument
    pub fn arg(mut self, value: impl Display) -> Self {
        self.positional.push(value.to_string());
        self
    }

    /// Set a named argument, overriding the operation default
    pub fn named(mut self, name: &str, value: impl Display) -> Self {
        self.named.insert(name.to_string(), value.to_string());
        self
    }
}

/// Render an optional argument the way it appears in cache keys
pub fn optional<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| "None".to_string(), |v| v.to_string())
}

/// Build the cache key for a call.
///
/// `defaults` is overlaid with `named`, then the key is the positional
/// values followed by `(name: value)` for every parameter in name order,
/// joined with `" - "`.
pub fn cache_key(
    positional: &[String],
    defaults: &BTreeMap<String, String>,
    named: &BTreeMap<String, String>,
) -> String {
    let mut merged = defaults.clone();
    for (name, value) in named {
        merged.insert(name.clone(), value.clone());
    }

    let mut parts: Vec<String> = positional.to_vec();
    parts.extend(
        merged
            .iter()
            .map(|(name, value)| format!("({}: {})", name, value)),
    );
    parts.join(" - ")
}

/// Cached value with the time it was computed
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub timestamp: Instant,
    pub value: Value,
}

/// In-memory memoization store
#[derive(Debug)]
pub struct ResponseCache {
    /// Whether results are stored and reused at all
    enabled: bool,
    /// Maximum age of a reusable entry (None = forever)
    refresh_interval: Option<Duration>,
    /// One partition per operation name
    partitions: HashMap<&'static str, HashMap<String, CacheEntry>>,
    /// Default arguments per operation, captured on first use
    defaults: HashMap<&'static str, BTreeMap<String, String>>,
}

impl ResponseCache {
    /// Create a new cache
    pub fn new(enabled: bool, refresh_interval: Option<Duration>) -> Self {
        Self {
            enabled,
            refresh_interval,
            partitions: HashMap::new(),
            defaults: HashMap::new(),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn refresh_interval(&self) -> Option<Duration> {
        self.refresh_interval
    }

    /// Set the refresh interval; a zero interval disables refreshing
    pub fn set_refresh_interval(&mut self, refresh_interval: Option<Duration>) {
        self.refresh_interval = refresh_interval.filter(|d| !d.is_zero());
    }

    /// Cache key for a call, capturing the operation defaults on first use
    pub fn key_for(&mut self, operation: &Operation, args: &CallArgs) -> String {
        let defaults = self.defaults.entry(operation.name).or_insert_with(|| {
            operation
                .defaults
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect()
        });
        cache_key(&args.positional, defaults, &args.named)
    }

    /// Get a cached result if it exists and is fresh
    pub fn lookup<T: DeserializeOwned>(
        &mut self,
        operation: &Operation,
        args: &CallArgs,
    ) -> Result<Option<T>> {
        if !self.enabled {
            return Ok(None);
        }

        let key = self.key_for(operation, args);
        let Some(entry) = self
            .partitions
            .get(operation.name)
            .and_then(|partition| partition.get(&key))
        else {
            debug!(operation = operation.name, key = %key, "Cache miss");
            return Ok(None);
        };

        if let Some(refresh) = self.refresh_interval {
            if entry.timestamp.elapsed() > refresh {
                debug!(operation = operation.name, key = %key, "Cache entry stale");
                return Ok(None);
            }
        }

        debug!(operation = operation.name, key = %key, "Cache hit");
        Ok(Some(serde_json::from_value(entry.value.clone())?))
    }

    /// Store a result
    pub fn store<T: Serialize>(
        &mut self,
        operation: &Operation,
        args: &CallArgs,
        value: &T,
    ) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let key = self.key_for(operation, args);
        let entry = CacheEntry {
            timestamp: Instant::now(),
            value: serde_json::to_value(value)?,
        };
        self.partitions
            .entry(operation.name)
            .or_default()
            .insert(key, entry);
        Ok(())
    }

    /// Return the cached result for the call or await `compute` and cache it.
    ///
    /// `compute` is only polled on a miss.
    pub async fn get_or_compute<T, Fut>(
        &mut self,
        operation: &Operation,
        args: &CallArgs,
        compute: Fut,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(cached) = self.lookup(operation, args)? {
            return Ok(cached);
        }

        let value = compute.await?;
        self.store(operation, args, &value)?;
        Ok(value)
    }

    /// Clear all cached results
    pub fn clear(&mut self) {
        if !self.partitions.is_empty() {
            info!("Cache cleared");
        }
        self.partitions.clear();
        self.defaults.clear();
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            operations: self.partitions.len(),
            entries: self.partitions.values().map(HashMap::len).sum(),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub operations: usize,
    pub entries: usize,
}
