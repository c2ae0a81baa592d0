// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Minimum-interval rate limiter for search tools.
//!
//! A call is permitted when at least `interval` has passed since the last
//! permitted call. Denied calls leave the state untouched. The check and
//! the update happen under one lock, so racing callers inside the same
//! interval cannot both be granted.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Result of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RateLimitResult {
    /// Call may proceed
    Allowed,
    /// Call is rate limited
    Limited {
        /// Time until the next call would be permitted
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed)
    }
}

/// Thread-safe rate limiter.
#[derive(Debug)]
pub struct RateLimiter {
    /// Minimum spacing between permitted calls
    interval: Duration,
    /// Last permitted call, `None` until the first one
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given minimum interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_call: Mutex::new(None),
        }
    }

    /// Minimum spacing between permitted calls.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Check the limit and, when permitted, record the call.
    pub async fn check(&self) -> RateLimitResult {
        let mut last_call = self.last_call.lock().await;
        let now = Instant::now();

        if let Some(previous) = *last_call {
            let elapsed = now.saturating_duration_since(previous);
            if elapsed < self.interval {
                let retry_after = self.interval - elapsed;
                debug!(?retry_after, "Rate limit exceeded");
                return RateLimitResult::Limited { retry_after };
            }
        }

        *last_call = Some(now);
        RateLimitResult::Allowed
    }

    /// Boolean form of [`RateLimiter::check`].
    pub async fn try_acquire(&self) -> bool {
        self.check().await.is_allowed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_first_call_allowed_second_limited() {
        let limiter = RateLimiter::new(Duration::from_secs(1));

        assert!(limiter.try_acquire().await);

        match limiter.check().await {
            RateLimitResult::Limited { retry_after } => {
                assert!(retry_after <= Duration::from_secs(1));
                assert!(retry_after > Duration::ZERO);
            }
            RateLimitResult::Allowed => panic!("Should be limited"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_allowed_after_interval() {
        let limiter = RateLimiter::new(Duration::from_secs(1));

        assert!(limiter.try_acquire().await);
        tokio::time::advance(Duration::from_millis(500)).await;
        assert!(!limiter.try_acquire().await);
        tokio::time::advance(Duration::from_millis(500)).await;
        assert!(limiter.try_acquire().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_denied_call_does_not_extend_window() {
        let limiter = RateLimiter::new(Duration::from_secs(10));

        assert!(limiter.try_acquire().await);
        tokio::time::advance(Duration::from_secs(9)).await;
        assert!(!limiter.try_acquire().await);
        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(limiter.try_acquire().await);
    }

    #[tokio::test]
    async fn test_zero_interval_never_limits() {
        let limiter = RateLimiter::new(Duration::ZERO);
        for _ in 0..10 {
            assert!(limiter.try_acquire().await);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_single_grant() {
        let limiter = Arc::new(RateLimiter::new(Duration::from_secs(60)));
        let barrier = Arc::new(tokio::sync::Barrier::new(16));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let limiter = limiter.clone();
                let barrier = barrier.clone();
                tokio::spawn(async move {
                    barrier.wait().await;
                    limiter.try_acquire().await
                })
            })
            .collect();

        let mut granted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                granted += 1;
            }
        }
        assert_eq!(granted, 1);
    }
}
