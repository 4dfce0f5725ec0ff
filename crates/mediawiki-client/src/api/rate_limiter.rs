//! Rate limiter enforcing a minimum spacing between API requests.

use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Minimum-interval rate limiter
#[derive(Debug)]
pub struct RateLimiter {
    /// Whether limiting is applied at all
    enabled: bool,
    /// Minimum time between the end of one request and the start of the next
    min_wait: Duration,
    /// Completion time of the last request
    last_call: Option<Instant>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(enabled: bool, min_wait: Duration) -> Self {
        Self {
            enabled,
            min_wait,
            last_call: None,
        }
    }

    /// Wait until a request may be made
    pub async fn throttle(&self) {
        if !self.enabled {
            return;
        }
        let Some(last) = self.last_call else {
            return;
        };

        let ready_at = last + self.min_wait;
        let now = Instant::now();
        if ready_at > now {
            let wait_time = ready_at - now;
            tracing::debug!(
                wait_ms = wait_time.as_millis(),
                "Rate limit: waiting before next request"
            );
            sleep(wait_time).await;
        }
    }

    /// Record that a request just completed
    pub fn record_call(&mut self) {
        if self.enabled {
            self.last_call = Some(Instant::now());
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn min_wait(&self) -> Duration {
        self.min_wait
    }

    /// Toggle limiting; forgets the last call
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.last_call = None;
    }

    /// Change the minimum wait; forgets the last call
    pub fn set_min_wait(&mut self, min_wait: Duration) {
        self.min_wait = min_wait;
        self.last_call = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rate_limiter_spacing() {
        let mut limiter = RateLimiter::new(true, Duration::from_millis(50));

        let start = Instant::now();

        // Three throttled requests need at least two full waits
        for _ in 0..3 {
            limiter.throttle().await;
            limiter.record_call();
        }

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_first_call_not_delayed() {
        let limiter = RateLimiter::new(true, Duration::from_secs(10));

        let start = Instant::now();
        limiter.throttle().await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_disabled_limiter_never_waits() {
        let mut limiter = RateLimiter::new(false, Duration::from_secs(10));

        let start = Instant::now();
        for _ in 0..3 {
            limiter.throttle().await;
            limiter.record_call();
        }
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_setters_reset_last_call() {
        let mut limiter = RateLimiter::new(true, Duration::from_secs(10));
        limiter.record_call();

        limiter.set_min_wait(Duration::from_secs(20));
        let start = Instant::now();
        limiter.throttle().await;
        assert!(start.elapsed() < Duration::from_secs(1));

        limiter.record_call();
        limiter.set_enabled(true);
        let start = Instant::now();
        limiter.throttle().await;
        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(limiter.min_wait(), Duration::from_secs(20));
    }
}
