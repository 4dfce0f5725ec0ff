//! Continuation-token pagination over list queries.

use super::executor::RequestExecutor;
use super::types::Params;
use crate::error::Result;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Largest page most list modules hand out per request
pub const MAX_PULL: usize = 500;

/// Default hard stop for tokens that cycle without ever repeating back-to-back
pub const MAX_PAGINATION_REQUESTS: usize = 10_000;

/// Per-request limit for a result target
pub fn pull_limit(target: Option<usize>) -> usize {
    target.map_or(MAX_PULL, |t| t.min(MAX_PULL))
}

/// Continuation object of a response, if the listing has more to give.
///
/// `query-continue.<key>` (legacy format) wins over the top-level `continue`.
pub fn continuation(response: &Value, key: &str) -> Option<Map<String, Value>> {
    let legacy = response
        .get("query-continue")
        .and_then(|c| c.get(key))
        .and_then(Value::as_object);

    legacy
        .or_else(|| response.get("continue").and_then(Value::as_object))
        .cloned()
}

impl RequestExecutor {
    /// Change the per-run request cap
    pub fn set_pagination_cap(&mut self, cap: usize) {
        self.pagination_cap = cap.max(1);
    }

    /// Run a list query across as many requests as needed.
    ///
    /// `extract` turns one response into its items (and is where API errors
    /// are raised). Stops when the API stops handing out continuation tokens,
    /// hands out the same token twice in a row, or `target` items have been
    /// collected. `limit_param` is lowered for the last request so no more
    /// than `target` items come back.
    pub async fn paginate<T, F>(
        &mut self,
        mut base_params: Params,
        continuation_key: &str,
        limit_param: &str,
        target: Option<usize>,
        mut extract: F,
    ) -> Result<Vec<T>>
    where
        F: FnMut(&Value) -> Result<Vec<T>>,
    {
        let mut items = Vec::new();
        let mut last_continuation: Option<Map<String, Value>> = None;
        let mut returned = 0;
        let mut requests = 0;

        loop {
            if requests >= self.pagination_cap {
                warn!(
                    continuation_key = continuation_key,
                    requests = requests,
                    "Reached pagination request cap"
                );
                break;
            }

            let mut params = base_params.clone();
            if let Some(cont) = &last_continuation {
                params.merge_continuation(cont);
            }

            let response = self.get(params).await?;
            requests += 1;

            let batch = extract(&response)?;
            let pulled = batch.len();
            items.extend(batch);

            let Some(cont) = continuation(&response, continuation_key) else {
                break;
            };
            if last_continuation.as_ref() == Some(&cont) {
                debug!(
                    continuation_key = continuation_key,
                    "Continuation token repeated, stopping"
                );
                break;
            }

            returned += pulled;
            if let Some(target) = target {
                if returned >= target {
                    break;
                }
                let remaining = target - returned;
                if remaining < MAX_PULL {
                    base_params.insert(limit_param, remaining);
                }
            }
            last_continuation = Some(cont);
        }

        if let Some(target) = target {
            items.truncate(target);
        }

        debug!(
            continuation_key = continuation_key,
            requests = requests,
            items = items.len(),
            "Pagination complete"
        );

        Ok(items)
    }
}
